//! Product form validation.
//!
//! Violations are collected and returned, never raised, so the editor can
//! show every message next to its field at once.

use serde::{Deserialize, Serialize};

use crate::product::{AssetSource, DigitalAsset, FileSource, Product, Variant, VariantOrigin};

/// Largest digital asset accepted for upload (50 MiB).
pub const MAX_ASSET_SIZE: u64 = 1024 * 1024 * 50;

pub const MIN_PRODUCT_TITLE_LEN: usize = 3;
pub const MIN_DESCRIPTION_LEN: usize = 5;
pub const MIN_VARIANT_TITLE_LEN: usize = 5;

/// Aggregated result of validating one product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<FieldViolation>,
}

/// A single field-level rule violation. `field` is a dotted path such as
/// `variants.0.photos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All messages reported for exactly this field path.
    pub fn messages_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |v| v.field == field)
            .map(|v| v.message.as_str())
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.iter().any(|v| v.field == field)
    }

    fn push(&mut self, field: impl Into<String>, rule: &str, message: impl Into<String>) {
        self.errors.push(FieldViolation {
            field: field.into(),
            rule: rule.to_string(),
            message: message.into(),
        });
    }
}

/// Which kinds of digital asset a variant may carry.
///
/// Existing variants may keep the asset already stored by the backend; new
/// variants must bring an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRule {
    StoredOrUpload,
    UploadOnly,
}

impl AssetRule {
    pub fn for_variant(variant: &Variant) -> Self {
        match variant.origin() {
            VariantOrigin::Existing => Self::StoredOrUpload,
            VariantOrigin::New => Self::UploadOnly,
        }
    }

    /// Check an asset against this rule, returning the violation message.
    pub fn check(&self, asset: Option<&DigitalAsset>) -> Option<String> {
        let Some(asset) = asset else {
            return Some("Please upload a digital asset".to_string());
        };
        match (self, asset.source()) {
            (_, Some(AssetSource::Upload(source))) => {
                let size = upload_size(asset, source);
                (size >= MAX_ASSET_SIZE).then(|| {
                    format!("Max file size is {}MB", MAX_ASSET_SIZE / (1024 * 1024))
                })
            }
            (Self::StoredOrUpload, Some(AssetSource::Stored(_))) => None,
            (Self::UploadOnly, Some(AssetSource::Stored(_))) => {
                Some("New variants require an uploaded digital asset".to_string())
            }
            (_, None) => Some("Please upload a digital asset".to_string()),
        }
    }
}

fn upload_size(asset: &DigitalAsset, source: &FileSource) -> u64 {
    match source {
        FileSource::Memory(bytes) => bytes.len() as u64,
        FileSource::Disk(_) => asset.size,
    }
}

/// Validate a product draft.
pub fn validate_product(product: &Product) -> ValidationResult {
    let mut result = ValidationResult::default();

    if char_len(&product.title) < MIN_PRODUCT_TITLE_LEN {
        result.push(
            "title",
            "min_length",
            format!("The product name must be at least {MIN_PRODUCT_TITLE_LEN} characters"),
        );
    }
    if char_len(&product.description) < MIN_DESCRIPTION_LEN {
        result.push(
            "description",
            "min_length",
            format!("The product description must be at least {MIN_DESCRIPTION_LEN} characters"),
        );
    }

    if product.variants.is_empty() {
        result.push("variants", "required", "At least one variant is required");
    }
    for (index, variant) in product.variants.iter().enumerate() {
        validate_variant(&mut result, index, variant);
    }
    validate_positions(
        &mut result,
        "variants",
        product.variants.iter().map(|v| v.sort_order),
    );

    match product.featured_image_id.as_deref() {
        None | Some("") => {
            result.push("featuredImageId", "required", "Please select a featured image");
        }
        Some(id) if product.find_photo(id).is_none() => {
            result.push(
                "featuredImageId",
                "reference",
                "The featured image must be one of the variant photos",
            );
        }
        Some(_) => {}
    }

    result
}

fn validate_variant(result: &mut ValidationResult, index: usize, variant: &Variant) {
    let path = format!("variants.{index}");

    if char_len(&variant.title) < MIN_VARIANT_TITLE_LEN {
        result.push(
            format!("{path}.title"),
            "min_length",
            format!("The variant name must be at least {MIN_VARIANT_TITLE_LEN} characters"),
        );
    }

    match variant.price.coerce() {
        None => result.push(format!("{path}.price"), "type_check", "The price must be a number"),
        Some(price) if price < 0.0 => {
            result.push(format!("{path}.price"), "min_value", "The price must be at least 0")
        }
        Some(_) => {}
    }

    if variant.photos.is_empty() {
        result.push(format!("{path}.photos"), "required", "Please add at least one photo");
    }
    for (photo_index, photo) in variant.photos.iter().enumerate() {
        let photo_path = format!("{path}.photos.{photo_index}");
        if photo.id.is_empty() {
            result.push(format!("{photo_path}.id"), "required", "Please select a photo");
        }
        if photo.url.is_empty() {
            result.push(format!("{photo_path}.url"), "required", "Please select a photo");
        }
    }
    validate_positions(
        result,
        &format!("{path}.photos"),
        variant.photos.iter().map(|p| p.sort_order),
    );

    if let Some(message) = AssetRule::for_variant(variant).check(variant.digital_asset.as_ref()) {
        result.push(format!("{path}.digitalAsset"), "digital_asset", message);
    }
}

/// Sort positions must be exactly `0..n` in some order.
fn validate_positions(
    result: &mut ValidationResult,
    field: &str,
    positions: impl Iterator<Item = u32>,
) {
    let mut positions: Vec<u32> = positions.collect();
    positions.sort_unstable();
    let contiguous = positions
        .iter()
        .enumerate()
        .all(|(index, &position)| position as usize == index);
    if !contiguous {
        result.push(
            field,
            "sort_order",
            "Sort positions must be unique and contiguous starting at 0",
        );
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
