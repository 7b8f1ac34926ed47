//! Product draft files.
//!
//! A draft is partial-product JSON. Photo URLs and asset `localPath`s that
//! are neither remote nor `data:` URLs are read from disk, relative to the
//! draft file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use printables_core::data_url;
use printables_core::defaults::{build_product, PartialDigitalAsset, PartialPhoto, PartialProduct};
use printables_core::product::Product;
use printables_core::types::{is_pending_id, new_local_id};

/// Load a draft file into a complete product.
pub fn load(path: &Path) -> anyhow::Result<Product> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft {}", path.display()))?;
    let mut partial: PartialProduct = serde_json::from_str(&text)
        .with_context(|| format!("Draft {} is not valid product JSON", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    resolve(&mut partial, base)?;
    Ok(build_product(partial))
}

/// Inline local photos, measure local assets and number unpositioned items.
fn resolve(partial: &mut PartialProduct, base: &Path) -> anyhow::Result<()> {
    for (v, variant) in partial.variants.iter_mut().flatten().enumerate() {
        variant.sort_order.get_or_insert(v as u32);

        for (p, photo) in variant.photos.iter_mut().flatten().enumerate() {
            photo.sort_order.get_or_insert(p as u32);
            inline_photo(photo, base)?;
        }
        if let Some(asset) = variant.digital_asset.as_mut() {
            resolve_asset(asset, base)?;
        }
    }
    Ok(())
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || data_url::is_data_url(url)
}

fn inline_photo(photo: &mut PartialPhoto, base: &Path) -> anyhow::Result<()> {
    let Some(url) = photo.url.as_deref().filter(|u| !u.is_empty() && !is_remote(u)) else {
        return Ok(());
    };

    let path = base.join(url);
    match photo.id.as_deref() {
        Some(id) if !is_pending_id(id) => {
            bail!("Photo {id} points at local file {url}; local photos must be new")
        }
        Some(_) => {}
        None => photo.id = Some(new_local_id("photo")),
    }

    let bytes = std::fs::read(&path)
        .with_context(|| format!("Failed to read photo {}", path.display()))?;
    let mime = guess_mime(&path).unwrap_or(data_url::DEFAULT_IMAGE_MIME);
    photo.url = Some(data_url::encode(mime, &bytes));
    Ok(())
}

fn resolve_asset(asset: &mut PartialDigitalAsset, base: &Path) -> anyhow::Result<()> {
    let Some(local) = asset.local_path.take() else {
        return Ok(());
    };

    let path: PathBuf = base.join(local);
    let metadata = std::fs::metadata(&path)
        .with_context(|| format!("Failed to read asset {}", path.display()))?;
    if !metadata.is_file() {
        bail!("Asset {} is not a file", path.display());
    }

    // The file on disk is authoritative; a declared size is ignored.
    asset.size = Some(metadata.len());
    if asset.mime_type.is_none() {
        asset.mime_type = guess_mime(&path).map(str::to_string);
    }
    asset.local_path = Some(path);
    Ok(())
}

fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use printables_core::product::{AssetSource, FileSource};
    use printables_core::schema::validate_product;

    use super::*;

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn local_files_become_pending_uploads() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "front.png", b"png-bytes");
        write(dir.path(), "back.jpg", b"jpg-bytes");
        write(dir.path(), "menu.pdf", b"%PDF-1.7 menu");
        let draft = write(
            dir.path(),
            "draft.json",
            br#"{
                "title": "Floral Menu",
                "description": "Printable dinner menu",
                "featuredImageId": "new-photo-front",
                "variants": [{
                    "title": "A5 portrait",
                    "price": "9.99",
                    "photos": [
                        {"id": "new-photo-front", "url": "front.png"},
                        {"url": "back.jpg"}
                    ],
                    "digitalAsset": {"localPath": "menu.pdf"}
                }]
            }"#,
        );

        let product = load(&draft).unwrap();
        let variant = &product.variants[0];

        assert!(variant.photos[0].url.starts_with("data:image/png;base64,"));
        assert!(variant.photos[1].url.starts_with("data:image/jpeg;base64,"));
        assert!(is_pending_id(&variant.photos[1].id));
        assert_eq!(variant.photos[1].sort_order, 1);

        let asset = variant.digital_asset.as_ref().unwrap();
        assert_eq!(asset.filename, "menu.pdf");
        assert_eq!(asset.size, 13);
        assert_eq!(asset.mime_type, "application/pdf");
        assert!(matches!(asset.source(), Some(AssetSource::Upload(FileSource::Disk(_)))));

        let result = validate_product(&product);
        assert!(result.is_valid(), "{:?}", result.errors);
    }

    #[test]
    fn remote_photos_are_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let draft = write(
            dir.path(),
            "draft.json",
            br#"{"id": "p-1", "variants": [{"id": "var-1", "photos": [{"id": "photo-1", "url": "https://cdn.test/a.jpg"}]}]}"#,
        );

        let product = load(&draft).unwrap();
        assert_eq!(product.variants[0].photos[0].url, "https://cdn.test/a.jpg");
    }

    #[test]
    fn stored_photo_cannot_point_at_local_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.png", b"png");
        let draft = write(
            dir.path(),
            "draft.json",
            br#"{"variants": [{"photos": [{"id": "photo-1", "url": "a.png"}]}]}"#,
        );

        assert!(load(&draft).is_err());
    }

    #[test]
    fn missing_asset_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let draft = write(
            dir.path(),
            "draft.json",
            br#"{"variants": [{"digitalAsset": {"localPath": "gone.pdf"}}]}"#,
        );

        let err = load(&draft).unwrap_err();
        assert!(err.to_string().contains("gone.pdf"));
    }

    #[test]
    fn declared_asset_size_is_replaced_by_file_length() {
        let dir = tempfile::tempdir().unwrap();
        let huge = std::fs::File::create(dir.path().join("huge.zip")).unwrap();
        huge.set_len(60 * 1024 * 1024).unwrap();
        write(dir.path(), "a.png", b"png");
        let draft = write(
            dir.path(),
            "draft.json",
            br#"{
                "title": "Bundle",
                "description": "Everything in one zip",
                "featuredImageId": "new-photo-a",
                "variants": [{
                    "title": "Full bundle",
                    "price": 20,
                    "photos": [{"id": "new-photo-a", "url": "a.png"}],
                    "digitalAsset": {"localPath": "huge.zip", "size": 1}
                }]
            }"#,
        );

        let product = load(&draft).unwrap();
        let asset = product.variants[0].digital_asset.as_ref().unwrap();
        assert_eq!(asset.size, 60 * 1024 * 1024);

        let result = validate_product(&product);
        assert!(result.has_error("variants.0.digitalAsset"), "{:?}", result.errors);
    }
}
