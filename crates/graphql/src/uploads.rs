//! Multipart file arguments, read eagerly so mutation bodies own their bytes.

use std::io::Read as _;

use {
    agora_media::{content_type_for, upload_path},
    agora_service_traits::{ObjectStorage, StoredObject},
    async_graphql::{Context, Upload},
    bytes::Bytes,
    tracing::debug,
};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl FileUpload {
    pub fn read(ctx: &Context<'_>, upload: &Upload) -> ApiResult<Self> {
        let value = upload
            .value(ctx)
            .map_err(|e| ApiError::bad_input(format!("Invalid upload: {e}")))?;
        let filename = value.filename.clone();
        let content_type = value
            .content_type
            .clone()
            .unwrap_or_else(|| content_type_for(&filename).to_string());
        let mut bytes = Vec::new();
        value
            .into_read()
            .read_to_end(&mut bytes)
            .map_err(|e| ApiError::bad_input(format!("Failed to read {filename}: {e}")))?;
        Ok(Self {
            filename,
            content_type,
            bytes: Bytes::from(bytes),
        })
    }

    /// Read every present upload, keeping argument order.
    pub fn read_all<'a>(
        ctx: &Context<'_>,
        uploads: impl IntoIterator<Item = &'a Option<Upload>>,
    ) -> ApiResult<Vec<Self>> {
        uploads
            .into_iter()
            .flatten()
            .map(|upload| Self::read(ctx, upload))
            .collect()
    }

    /// Store under `{folder}/{folder}_{id}/{filename}` and return the public URL.
    pub async fn store(self, storage: &dyn ObjectStorage, folder: &str, id: i64) -> ApiResult<String> {
        let path = upload_path(folder, id, &self.filename);
        debug!(%path, size = self.bytes.len(), "uploading file");
        Ok(storage
            .upload(StoredObject {
                path,
                content_type: self.content_type,
                bytes: self.bytes,
            })
            .await?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use std::io::{Seek, SeekFrom, Write};

    use {
        async_graphql::{
            EmptySubscription, Object, Request, Schema, UploadValue, Variables, value,
        },
        serde_json::json,
    };

    use super::*;

    struct Query;

    #[Object]
    impl Query {
        async fn ready(&self) -> bool {
            true
        }
    }

    struct Mutation;

    #[Object]
    impl Mutation {
        async fn describe(&self, ctx: &Context<'_>, file: Upload) -> async_graphql::Result<String> {
            let upload = FileUpload::read(ctx, &file)
                .map_err(|e| async_graphql::Error::new(e.to_string()))?;
            Ok(format!(
                "{} {} {}",
                upload.filename,
                upload.content_type,
                String::from_utf8_lossy(&upload.bytes)
            ))
        }
    }

    fn attached(filename: &str, content_type: Option<&str>, body: &[u8]) -> Request {
        let mut content = tempfile::tempfile().unwrap();
        content.write_all(body).unwrap();
        content.seek(SeekFrom::Start(0)).unwrap();

        let mut request = Request::new("mutation($file: Upload!) { describe(file: $file) }")
            .variables(Variables::from_json(json!({ "file": null })));
        request.set_upload("variables.file", UploadValue {
            filename: filename.into(),
            content_type: content_type.map(str::to_string),
            content,
        });
        request
    }

    #[tokio::test]
    async fn upload_bytes_are_read_in_full() {
        let schema = Schema::new(Query, Mutation, EmptySubscription);

        let response = schema
            .execute(attached("front.PNG", None, b"not really a png"))
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(
            response.data,
            value!({ "describe": "front.PNG image/png not really a png" })
        );
    }

    #[tokio::test]
    async fn declared_content_type_wins_over_extension() {
        let schema = Schema::new(Query, Mutation, EmptySubscription);

        let response = schema
            .execute(attached("notes.png", Some("text/plain"), b"hi"))
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(response.data, value!({ "describe": "notes.png text/plain hi" }));
    }
}
