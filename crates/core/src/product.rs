//! Product catalogue entities as exchanged with the storefront backend.
//!
//! The same structs back both the editable draft and the JSON returned by
//! `GET /api/products/:id`. Fields that only exist on the client side (a
//! pending upload held on disk or in memory) are skipped by serde.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{is_pending_id, Timestamp};

// ---------------------------------------------------------------------------
// Product type
// ---------------------------------------------------------------------------

/// Storefront section a product belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    #[default]
    DigitalPrintable,
    WeddingInvitation,
}

impl ProductType {
    /// Wire value used by the backend (`DIGITAL_PRINTABLE`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DigitalPrintable => "DIGITAL_PRINTABLE",
            Self::WeddingInvitation => "WEDDING_INVITATION",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DIGITAL_PRINTABLE" => Ok(Self::DigitalPrintable),
            "WEDDING_INVITATION" => Ok(Self::WeddingInvitation),
            other => Err(CoreError::Validation(format!(
                "Unknown product type '{other}'. Expected DIGITAL_PRINTABLE or WEDDING_INVITATION"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// A catalogue product with its ordered variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Published flag.
    #[serde(default)]
    pub active: bool,
    /// Id of the photo (across all variants) used as the product thumbnail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Product {
    /// True when the product has never been persisted.
    pub fn is_new(&self) -> bool {
        self.id.is_empty() || is_pending_id(&self.id)
    }

    /// Every photo of every variant, in variant order.
    pub fn photos(&self) -> impl Iterator<Item = &Photo> {
        self.variants.iter().flat_map(|v| v.photos.iter())
    }

    pub fn find_photo(&self, photo_id: &str) -> Option<&Photo> {
        self.photos().find(|p| p.id == photo_id)
    }

    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    pub fn variant_mut(&mut self, variant_id: &str) -> Option<&mut Variant> {
        self.variants.iter_mut().find(|v| v.id == variant_id)
    }

    /// URL to show as the product image: the featured photo if it can be
    /// resolved, otherwise the backend-provided thumbnail.
    pub fn featured_image_url(&self) -> Option<&str> {
        self.featured_image_id
            .as_deref()
            .and_then(|id| self.find_photo(id))
            .map(|p| p.url.as_str())
            .filter(|url| !url.is_empty())
            .or(self.thumbnail_url.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// A variant price as typed by an editor: either already numeric or raw text
/// from an input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

impl Price {
    /// Numeric value, if the input can be read as a finite number.
    pub fn coerce(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl From<f64> for Price {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Price {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// Whether a variant already exists on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantOrigin {
    New,
    Existing,
}

/// A purchasable configuration of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub sort_order: u32,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digital_asset: Option<DigitalAsset>,
}

impl Variant {
    pub fn origin(&self) -> VariantOrigin {
        if is_pending_id(&self.id) {
            VariantOrigin::New
        } else {
            VariantOrigin::Existing
        }
    }

    pub fn photo(&self, photo_id: &str) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == photo_id)
    }
}

// ---------------------------------------------------------------------------
// Photo
// ---------------------------------------------------------------------------

/// A variant photo. `url` is either a remote URL or a `data:` URL holding a
/// pending upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub sort_order: u32,
}

impl Photo {
    /// Pending photos are uploaded with the next submit.
    pub fn is_pending(&self) -> bool {
        is_pending_id(&self.id)
    }
}

// ---------------------------------------------------------------------------
// Digital asset
// ---------------------------------------------------------------------------

/// Where the bytes of a pending upload live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Disk(PathBuf),
    Memory(Vec<u8>),
}

/// The downloadable file delivered to a customer after purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalAsset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "name")]
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, alias = "type")]
    pub mime_type: String,
    /// Remote reference of an already stored asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Local file waiting to be uploaded.
    #[serde(skip)]
    pub upload: Option<FileSource>,
}

/// Borrowed view of where a digital asset's content comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssetSource<'a> {
    Upload(&'a FileSource),
    Stored(&'a str),
}

impl DigitalAsset {
    /// An asset backed by a local file that still has to be uploaded.
    pub fn pending(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
        source: FileSource,
    ) -> Self {
        Self {
            id: None,
            filename: filename.into(),
            size,
            mime_type: mime_type.into(),
            url: None,
            upload: Some(source),
        }
    }

    /// An in-memory pending upload; the size is taken from the buffer.
    pub fn from_bytes(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        let size = bytes.len() as u64;
        Self::pending(filename, mime_type, size, FileSource::Memory(bytes))
    }

    /// An asset already stored by the backend.
    pub fn stored(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            filename: filename.into(),
            size,
            mime_type: mime_type.into(),
            url: Some(url.into()),
            upload: None,
        }
    }

    /// A pending upload wins over a stored reference; an empty URL counts as
    /// no reference at all.
    pub fn source(&self) -> Option<AssetSource<'_>> {
        if let Some(upload) = &self.upload {
            return Some(AssetSource::Upload(upload));
        }
        self.url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(AssetSource::Stored)
    }
}

// ---------------------------------------------------------------------------
// API envelopes
// ---------------------------------------------------------------------------

/// Row of the product list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    #[serde(default)]
    pub products: Vec<ProductListItem>,
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub product: Product,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductResponse {
    #[serde(alias = "id")]
    pub product_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: &str, url: &str) -> Photo {
        Photo {
            id: id.to_string(),
            url: url.to_string(),
            sort_order: 0,
        }
    }

    #[test]
    fn price_coerces_numeric_text() {
        assert_eq!(Price::from("12.50").coerce(), Some(12.5));
        assert_eq!(Price::from(" 3 ").coerce(), Some(3.0));
        assert_eq!(Price::from(7.25).coerce(), Some(7.25));
    }

    #[test]
    fn price_rejects_non_numeric_text() {
        assert_eq!(Price::from("").coerce(), None);
        assert_eq!(Price::from("twelve").coerce(), None);
        assert_eq!(Price::Number(f64::NAN).coerce(), None);
    }

    #[test]
    fn price_deserializes_from_number_or_string() {
        let n: Price = serde_json::from_str("12").unwrap();
        let s: Price = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(n, Price::Number(12.0));
        assert_eq!(s, Price::Text("12.50".into()));
    }

    #[test]
    fn product_deserializes_backend_shape() {
        let json = serde_json::json!({
            "id": "p1",
            "title": "Birthday card",
            "description": "Printable card",
            "tags": ["kids", "birthday", "kids"],
            "active": true,
            "featuredImageId": "ph1",
            "type": "DIGITAL_PRINTABLE",
            "variants": [{
                "id": "v1",
                "title": "A4 print",
                "price": 4.5,
                "sortOrder": 0,
                "active": true,
                "photos": [{"id": "ph1", "url": "https://cdn/ph1.jpg", "sortOrder": 0}],
                "digitalAsset": {"id": "a1", "filename": "card.pdf", "size": 1024, "url": "https://cdn/card.pdf"}
            }]
        });

        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.tags.len(), 2);
        assert_eq!(product.product_type, Some(ProductType::DigitalPrintable));
        let asset = product.variants[0].digital_asset.as_ref().unwrap();
        assert_eq!(asset.source(), Some(AssetSource::Stored("https://cdn/card.pdf")));
        assert!(!product.is_new());
    }

    #[test]
    fn pending_upload_takes_precedence_over_url() {
        let mut asset = DigitalAsset::stored("a.pdf", "application/pdf", 10, "https://cdn/a.pdf");
        asset.upload = Some(FileSource::Memory(vec![1, 2, 3]));
        assert!(matches!(asset.source(), Some(AssetSource::Upload(_))));
    }

    #[test]
    fn empty_url_is_no_source() {
        let asset = DigitalAsset::stored("a.pdf", "application/pdf", 10, "");
        assert_eq!(asset.source(), None);
    }

    #[test]
    fn upload_is_not_serialized() {
        let asset = DigitalAsset::from_bytes("a.zip", "application/zip", vec![0; 4]);
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["size"], 4);
        assert!(json.get("upload").is_none());
        assert!(json.get("url").is_none());
    }

    #[test]
    fn featured_image_falls_back_to_thumbnail() {
        let mut product: Product = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "thumbnailUrl": "https://cdn/thumb.jpg",
            "variants": [{"id": "v1", "photos": []}]
        }))
        .unwrap();
        assert_eq!(product.featured_image_url(), Some("https://cdn/thumb.jpg"));

        product.variants[0].photos.push(photo("ph1", "https://cdn/ph1.jpg"));
        product.featured_image_id = Some("ph1".into());
        assert_eq!(product.featured_image_url(), Some("https://cdn/ph1.jpg"));
    }

    #[test]
    fn variant_origin_follows_id_marker() {
        let mut variant: Variant = serde_json::from_value(serde_json::json!({"id": "new-variant-1"})).unwrap();
        assert_eq!(variant.origin(), VariantOrigin::New);
        variant.id = "v1".into();
        assert_eq!(variant.origin(), VariantOrigin::Existing);
    }

    #[test]
    fn product_type_round_trips_through_str() {
        assert_eq!("WEDDING_INVITATION".parse::<ProductType>().unwrap(), ProductType::WeddingInvitation);
        assert!("POSTER".parse::<ProductType>().is_err());
        assert_eq!(ProductType::DigitalPrintable.to_string(), "DIGITAL_PRINTABLE");
    }
}
