//! Product payload transformer.
//!
//! Turns an in-memory product draft into the backend's multipart wire
//! format: one JSON descriptor part (`productData`) plus one binary part per
//! newly added photo and per newly attached digital asset.
//!
//! Binary part names are deterministic so the backend can correlate them
//! with descriptor entries:
//!
//! - `variant_photo_{variantId}_{photoId}`
//! - `variant_digital_asset_{variantId}`

use serde::Serialize;

use crate::data_url::{self, DataUrlError};
use crate::product::{AssetSource, FileSource, Product, ProductType, Variant, VariantOrigin};

/// Name of the multipart part carrying the JSON descriptor.
pub const PRODUCT_DATA_FIELD: &str = "productData";

/// Content type used for assets that do not declare one.
pub const FALLBACK_MIME: &str = "application/octet-stream";

pub fn photo_field_name(variant_id: &str, photo_id: &str) -> String {
    format!("variant_photo_{variant_id}_{photo_id}")
}

pub fn asset_field_name(variant_id: &str) -> String {
    format!("variant_digital_asset_{variant_id}")
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Reasons a draft cannot be turned into a request.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("At least one variant is required")]
    NoVariants,

    #[error("At least one photo is required for each variant (variant {variant_id})")]
    NoPhotos { variant_id: String },

    #[error("Missing base64 data for new photo {photo_id} of variant {variant_id}")]
    MissingPhotoData { variant_id: String, photo_id: String },

    #[error("Invalid image data for photo {photo_id} of variant {variant_id}: {source}")]
    InvalidPhotoData {
        variant_id: String,
        photo_id: String,
        #[source]
        source: DataUrlError,
    },

    #[error("Missing digital asset for new variant {variant_id}")]
    MissingDigitalAsset { variant_id: String },

    #[error("Price of variant {variant_id} is not a number")]
    InvalidPrice { variant_id: String },
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// JSON body of the `productData` part.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDescriptor {
    /// Present on update only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Present on create only.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    pub title: String,
    pub description: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image_id: Option<String>,
    pub tags: Vec<String>,
    pub variants: Vec<VariantDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDescriptor {
    pub id: String,
    pub title: String,
    /// The coerced number, sent as is (fractional prices are not truncated).
    pub price: f64,
    pub sort_order: u32,
    pub active: bool,
    pub photos: Vec<PhotoDescriptor>,
    /// Only sent when a new file is attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_asset: Option<AssetDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDescriptor {
    pub id: String,
    pub sort_order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetDescriptor {
    pub filename: String,
    pub size: u64,
}

/// One binary multipart part.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub field_name: String,
    pub filename: String,
    pub mime_type: String,
    pub body: FileSource,
}

/// Descriptor plus attachments, ready to be encoded as multipart form data.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPayload {
    pub descriptor: ProductDescriptor,
    pub attachments: Vec<Attachment>,
}

impl ProductPayload {
    pub fn descriptor_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.descriptor)
    }

    pub fn attachment(&self, field_name: &str) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.field_name == field_name)
    }
}

// ---------------------------------------------------------------------------
// Transformer
// ---------------------------------------------------------------------------

/// Build the wire payload for a product draft.
///
/// `default_type` is sent on create when the draft does not name its own
/// product type.
pub fn build_payload(
    product: &Product,
    default_type: ProductType,
) -> Result<ProductPayload, PayloadError> {
    if product.variants.is_empty() {
        return Err(PayloadError::NoVariants);
    }

    let creating = product.is_new();
    let mut attachments = Vec::new();
    let mut variants = Vec::with_capacity(product.variants.len());

    for variant in &product.variants {
        variants.push(variant_descriptor(variant, creating, &mut attachments)?);
    }

    let descriptor = ProductDescriptor {
        id: (!creating).then(|| product.id.clone()),
        product_type: creating.then(|| product.product_type.unwrap_or(default_type)),
        title: product.title.clone(),
        description: product.description.clone(),
        active: product.active,
        featured_image_id: product.featured_image_id.clone(),
        tags: product.tags.iter().cloned().collect(),
        variants,
    };

    Ok(ProductPayload {
        descriptor,
        attachments,
    })
}

fn variant_descriptor(
    variant: &Variant,
    creating: bool,
    attachments: &mut Vec<Attachment>,
) -> Result<VariantDescriptor, PayloadError> {
    if variant.photos.is_empty() {
        return Err(PayloadError::NoPhotos {
            variant_id: variant.id.clone(),
        });
    }

    for photo in variant.photos.iter().filter(|p| p.is_pending()) {
        if !data_url::is_data_url(&photo.url) {
            return Err(PayloadError::MissingPhotoData {
                variant_id: variant.id.clone(),
                photo_id: photo.id.clone(),
            });
        }
        let decoded =
            data_url::decode(&photo.url).map_err(|source| PayloadError::InvalidPhotoData {
                variant_id: variant.id.clone(),
                photo_id: photo.id.clone(),
                source,
            })?;
        attachments.push(Attachment {
            field_name: photo_field_name(&variant.id, &photo.id),
            filename: format!("photo-{}", photo.id),
            mime_type: decoded.mime_type,
            body: FileSource::Memory(decoded.bytes),
        });
    }

    let upload = variant.digital_asset.as_ref().and_then(|asset| match asset.source() {
        Some(AssetSource::Upload(source)) => Some((asset, source)),
        _ => None,
    });

    let digital_asset = match upload {
        Some((asset, source)) => {
            let mime_type = if asset.mime_type.is_empty() {
                FALLBACK_MIME.to_string()
            } else {
                asset.mime_type.clone()
            };
            attachments.push(Attachment {
                field_name: asset_field_name(&variant.id),
                filename: asset.filename.clone(),
                mime_type,
                body: source.clone(),
            });
            Some(AssetDescriptor {
                filename: asset.filename.clone(),
                size: asset.size,
            })
        }
        None if creating || variant.origin() == VariantOrigin::New => {
            return Err(PayloadError::MissingDigitalAsset {
                variant_id: variant.id.clone(),
            });
        }
        None => None,
    };

    let price = variant
        .price
        .coerce()
        .ok_or_else(|| PayloadError::InvalidPrice {
            variant_id: variant.id.clone(),
        })?;

    Ok(VariantDescriptor {
        id: variant.id.clone(),
        title: variant.title.clone(),
        price,
        sort_order: variant.sort_order,
        active: variant.active,
        photos: variant
            .photos
            .iter()
            .map(|p| PhotoDescriptor {
                id: p.id.clone(),
                sort_order: p.sort_order,
            })
            .collect(),
        digital_asset,
    })
}
