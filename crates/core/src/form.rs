//! Form state for the product edit screen.
//!
//! [`ProductForm`] owns the current draft, remembers the values it was last
//! reset to (for dirty tracking) and re-runs validation after every edit.
//! Edits are applied synchronously in the order they are made.

use crate::defaults::{build_variant, PartialVariant};
use crate::error::CoreError;
use crate::product::{DigitalAsset, Photo, Price, Product, Variant};
use crate::reorder::{self, Positioned};
use crate::schema::{validate_product, ValidationResult};
use crate::types::new_local_id;

#[derive(Debug, Clone)]
pub struct ProductForm {
    baseline: Product,
    values: Product,
    validation: ValidationResult,
}

impl ProductForm {
    pub fn new(product: Product) -> Self {
        let validation = validate_product(&product);
        Self {
            baseline: product.clone(),
            values: product,
            validation,
        }
    }

    /// Replace both the current values and the dirty-tracking baseline.
    pub fn reset(&mut self, product: Product) {
        *self = Self::new(product);
    }

    pub fn values(&self) -> &Product {
        &self.values
    }

    pub fn into_values(self) -> Product {
        self.values
    }

    pub fn errors(&self) -> &ValidationResult {
        &self.validation
    }

    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }

    pub fn is_dirty(&self) -> bool {
        self.values != self.baseline
    }

    /// Top-level fields whose value differs from the baseline.
    pub fn dirty_fields(&self) -> Vec<&'static str> {
        let (now, then) = (&self.values, &self.baseline);
        let mut dirty = Vec::new();
        if now.title != then.title {
            dirty.push("title");
        }
        if now.description != then.description {
            dirty.push("description");
        }
        if now.tags != then.tags {
            dirty.push("tags");
        }
        if now.active != then.active {
            dirty.push("active");
        }
        if now.featured_image_id != then.featured_image_id {
            dirty.push("featuredImageId");
        }
        if now.variants != then.variants {
            dirty.push("variants");
        }
        dirty
    }

    /// Submitting requires at least one change and no violations.
    pub fn can_submit(&self) -> bool {
        self.is_dirty() && self.is_valid()
    }

    // ---- product fields ----

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.values.title = title.into();
        self.revalidate();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.values.description = description.into();
        self.revalidate();
    }

    pub fn set_active(&mut self, active: bool) {
        self.values.active = active;
        self.revalidate();
    }

    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values.tags = tags.into_iter().map(Into::into).collect();
        self.revalidate();
    }

    /// Returns `false` if the tag was already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let added = self.values.tags.insert(tag.into());
        self.revalidate();
        added
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let removed = self.values.tags.remove(tag);
        self.revalidate();
        removed
    }

    pub fn set_featured_image(&mut self, photo_id: &str) -> Result<(), CoreError> {
        if self.values.find_photo(photo_id).is_none() {
            return Err(not_found("photo", photo_id));
        }
        self.values.featured_image_id = Some(photo_id.to_string());
        self.revalidate();
        Ok(())
    }

    // ---- variants ----

    /// Append an empty variant at the end and return its id.
    pub fn add_variant(&mut self) -> String {
        let mut variant = build_variant(PartialVariant::default());
        variant.sort_order = self.values.variants.len() as u32;
        let id = variant.id.clone();
        self.values.variants.push(variant);
        self.revalidate();
        id
    }

    /// Remove a variant and renumber the rest. The featured image is
    /// cleared when it belonged to the removed variant.
    pub fn remove_variant(&mut self, variant_id: &str) -> Result<Variant, CoreError> {
        let index = self
            .values
            .variants
            .iter()
            .position(|v| v.id == variant_id)
            .ok_or_else(|| not_found("variant", variant_id))?;

        let mut variants = std::mem::take(&mut self.values.variants);
        let removed = variants.remove(index);
        reorder::sort_by_position(&mut variants);
        reorder::reindex(&mut variants);
        self.values.variants = variants;

        let featured_removed = self
            .values
            .featured_image_id
            .as_deref()
            .is_some_and(|id| removed.photo(id).is_some());
        if featured_removed {
            self.values.featured_image_id = None;
        }
        self.revalidate();
        Ok(removed)
    }

    /// Apply an arbitrary change to one variant.
    pub fn edit_variant(
        &mut self,
        variant_id: &str,
        edit: impl FnOnce(&mut Variant),
    ) -> Result<(), CoreError> {
        let variant = self
            .values
            .variant_mut(variant_id)
            .ok_or_else(|| not_found("variant", variant_id))?;
        edit(variant);
        self.revalidate();
        Ok(())
    }

    pub fn set_variant_title(
        &mut self,
        variant_id: &str,
        title: impl Into<String>,
    ) -> Result<(), CoreError> {
        let title = title.into();
        self.edit_variant(variant_id, |v| v.title = title)
    }

    pub fn set_variant_price(
        &mut self,
        variant_id: &str,
        price: impl Into<Price>,
    ) -> Result<(), CoreError> {
        let price = price.into();
        self.edit_variant(variant_id, |v| v.price = price)
    }

    pub fn set_digital_asset(
        &mut self,
        variant_id: &str,
        asset: Option<DigitalAsset>,
    ) -> Result<(), CoreError> {
        self.edit_variant(variant_id, |v| v.digital_asset = asset)
    }

    pub fn reorder_variants(&mut self, from: usize, to: usize) -> Result<(), CoreError> {
        reorder::reorder(&mut self.values.variants, from, to)?;
        self.revalidate();
        Ok(())
    }

    // ---- photos ----

    /// Add a pending photo (usually a `data:` URL) after the existing ones
    /// and return its id.
    pub fn add_photo(&mut self, variant_id: &str, url: impl Into<String>) -> Result<String, CoreError> {
        let id = new_local_id("photo");
        let photo_id = id.clone();
        let url = url.into();
        self.edit_variant(variant_id, move |v| {
            let sort_order = v.photos.len() as u32;
            v.photos.push(Photo {
                id: photo_id,
                url,
                sort_order,
            });
        })?;
        Ok(id)
    }

    /// Remove a photo; photos positioned after it move up by one.
    pub fn remove_photo(&mut self, variant_id: &str, photo_id: &str) -> Result<Photo, CoreError> {
        let variant = self
            .values
            .variant_mut(variant_id)
            .ok_or_else(|| not_found("variant", variant_id))?;
        let index = variant
            .photos
            .iter()
            .position(|p| p.id == photo_id)
            .ok_or_else(|| not_found("photo", photo_id))?;

        let removed = variant.photos.remove(index);
        for photo in &mut variant.photos {
            if photo.position() > removed.position() {
                photo.set_position(photo.position() - 1);
            }
        }

        if self.values.featured_image_id.as_deref() == Some(photo_id) {
            self.values.featured_image_id = None;
        }
        self.revalidate();
        Ok(removed)
    }

    pub fn reorder_photos(
        &mut self,
        variant_id: &str,
        from: usize,
        to: usize,
    ) -> Result<(), CoreError> {
        let variant = self
            .values
            .variant_mut(variant_id)
            .ok_or_else(|| not_found("variant", variant_id))?;
        reorder::reorder(&mut variant.photos, from, to)?;
        self.revalidate();
        Ok(())
    }

    fn revalidate(&mut self) {
        self.validation = validate_product(&self.values);
    }
}

fn not_found(entity: &'static str, id: &str) -> CoreError {
    CoreError::NotFound {
        entity,
        id: id.to_string(),
    }
}
