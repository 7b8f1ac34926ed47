//! Encoding of a [`ProductPayload`] as `multipart/form-data`.

use printables_core::payload::{ProductPayload, PRODUCT_DATA_FIELD};
use printables_core::product::FileSource;
use printables_core::schema::MAX_ASSET_SIZE;
use reqwest::multipart::{Form, Part};

use crate::error::ClientError;

/// Build the request form: the JSON descriptor first, then one part per
/// attachment. Disk-backed uploads are read here.
pub async fn to_form(payload: ProductPayload) -> Result<Form, ClientError> {
    let descriptor = payload.descriptor_json()?;
    let mut form = Form::new().text(PRODUCT_DATA_FIELD, descriptor);

    for attachment in payload.attachments {
        let bytes = match attachment.body {
            FileSource::Memory(bytes) => bytes,
            FileSource::Disk(path) => {
                let bytes = match tokio::fs::read(&path).await {
                    Ok(bytes) => bytes,
                    Err(source) => return Err(ClientError::Io { path, source }),
                };
                // The file may have grown since validation.
                let size = bytes.len() as u64;
                if size >= MAX_ASSET_SIZE {
                    return Err(ClientError::TooLarge {
                        path,
                        size,
                        limit: MAX_ASSET_SIZE,
                    });
                }
                bytes
            }
        };
        tracing::debug!(
            field = %attachment.field_name,
            size = bytes.len(),
            "Attaching upload"
        );
        let part = Part::bytes(bytes)
            .file_name(attachment.filename)
            .mime_str(&attachment.mime_type)?;
        form = form.part(attachment.field_name, part);
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use printables_core::payload::{Attachment, ProductDescriptor};

    use super::*;

    fn payload_with(body: FileSource) -> ProductPayload {
        ProductPayload {
            descriptor: ProductDescriptor {
                id: Some("p1".into()),
                product_type: None,
                title: "Floral menu".into(),
                description: "A printable menu".into(),
                active: true,
                featured_image_id: None,
                tags: vec![],
                variants: vec![],
            },
            attachments: vec![Attachment {
                field_name: "variant_digital_asset_v1".into(),
                filename: "menu.pdf".into(),
                mime_type: "application/pdf".into(),
                body,
            }],
        }
    }

    #[tokio::test]
    async fn missing_disk_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.pdf");

        let err = to_form(payload_with(FileSource::Disk(path.clone())))
            .await
            .unwrap_err();
        assert_matches!(err, ClientError::Io { path: p, .. } if p == path);
    }

    #[tokio::test]
    async fn disk_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        assert!(to_form(payload_with(FileSource::Disk(path))).await.is_ok());
    }

    #[tokio::test]
    async fn oversized_disk_file_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.zip");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_ASSET_SIZE).unwrap();

        let err = to_form(payload_with(FileSource::Disk(path))).await.unwrap_err();
        assert_matches!(err, ClientError::TooLarge { size, .. } if size == MAX_ASSET_SIZE);
    }
}
