//! Default value builder for product drafts.
//!
//! Fills every field a partial product leaves out, so the editor always
//! starts from a fully populated [`Product`].

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Deserialize;

use crate::product::{DigitalAsset, FileSource, Photo, Price, Product, ProductType, Variant};
use crate::types::new_local_id;

/// A product with every field optional, e.g. parsed from a draft file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialProduct {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<BTreeSet<String>>,
    pub active: Option<bool>,
    pub featured_image_id: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<ProductType>,
    pub variants: Option<Vec<PartialVariant>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialVariant {
    pub id: Option<String>,
    pub title: Option<String>,
    pub price: Option<Price>,
    pub sort_order: Option<u32>,
    pub active: Option<bool>,
    pub photos: Option<Vec<PartialPhoto>>,
    pub digital_asset: Option<PartialDigitalAsset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialPhoto {
    pub id: Option<String>,
    pub url: Option<String>,
    pub sort_order: Option<u32>,
}

/// A digital asset reference. `local_path` marks a file still to be uploaded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialDigitalAsset {
    pub id: Option<String>,
    pub filename: Option<String>,
    pub size: Option<u64>,
    pub mime_type: Option<String>,
    pub url: Option<String>,
    pub local_path: Option<PathBuf>,
}

/// Build a complete product from a partial one.
///
/// A product always comes out with at least one variant.
pub fn build_product(partial: PartialProduct) -> Product {
    let mut variants: Vec<Variant> = partial
        .variants
        .unwrap_or_default()
        .into_iter()
        .map(build_variant)
        .collect();
    if variants.is_empty() {
        variants.push(build_variant(PartialVariant::default()));
    }

    Product {
        id: partial.id.unwrap_or_else(|| new_local_id("product")),
        title: partial.title.unwrap_or_default(),
        description: partial.description.unwrap_or_default(),
        tags: partial.tags.unwrap_or_default(),
        active: partial.active.unwrap_or(true),
        featured_image_id: partial.featured_image_id,
        thumbnail_url: partial.thumbnail_url,
        product_type: partial.product_type,
        variants,
        created_at: None,
        updated_at: None,
    }
}

pub fn build_variant(partial: PartialVariant) -> Variant {
    Variant {
        id: partial.id.unwrap_or_else(|| new_local_id("variant")),
        title: partial.title.unwrap_or_default(),
        price: partial.price.unwrap_or_default(),
        sort_order: partial.sort_order.unwrap_or(0),
        active: partial.active.unwrap_or(true),
        photos: partial
            .photos
            .unwrap_or_default()
            .into_iter()
            .map(build_photo)
            .collect(),
        digital_asset: partial.digital_asset.map(build_digital_asset),
    }
}

pub fn build_photo(partial: PartialPhoto) -> Photo {
    Photo {
        id: partial.id.unwrap_or_else(|| new_local_id("photo")),
        url: partial.url.unwrap_or_default(),
        sort_order: partial.sort_order.unwrap_or(0),
    }
}

/// A `local_path` turns into a pending disk upload. The filename defaults to
/// the path's final component; the size stays as given (0 when omitted).
pub fn build_digital_asset(partial: PartialDigitalAsset) -> DigitalAsset {
    let filename = partial.filename.or_else(|| {
        partial
            .local_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    });

    DigitalAsset {
        id: partial.id,
        filename: filename.unwrap_or_default(),
        size: partial.size.unwrap_or(0),
        mime_type: partial.mime_type.unwrap_or_default(),
        url: partial.url,
        upload: partial.local_path.map(FileSource::Disk),
    }
}
