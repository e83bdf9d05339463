use {
    agora_service_traits::{ObjectStorage, ServiceResult, StoredObject},
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    tracing::debug,
};

use crate::{Error, Result};

/// Firebase (Google Cloud) Storage through its REST upload endpoint.
pub struct FirebaseStorage {
    api_base: String,
    bucket: String,
    token: Option<Secret<String>>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    name: String,
    #[serde(rename = "downloadTokens")]
    download_tokens: Option<String>,
}

impl FirebaseStorage {
    pub fn new(
        api_base: impl Into<String>,
        bucket: impl Into<String>,
        token: Option<Secret<String>>,
    ) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            token,
            client: reqwest::Client::new(),
        }
    }

    fn object_url(&self, encoded_name: &str) -> String {
        format!("{}/v0/b/{}/o/{encoded_name}", self.api_base, self.bucket)
    }

    pub async fn put(&self, object: &StoredObject) -> Result<String> {
        let url = format!(
            "{}/v0/b/{}/o?name={}",
            self.api_base,
            self.bucket,
            urlencoding::encode(&object.path)
        );
        let mut request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, &object.content_type)
            .body(object.bytes.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| Error::external("firebase upload request", e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Message(format!(
                "firebase upload failed ({status}): {body}"
            )));
        }
        let uploaded: UploadResponse = resp
            .json()
            .await
            .map_err(|e| Error::external("firebase upload response", e))?;
        debug!(name = %uploaded.name, bucket = %self.bucket, "uploaded object");

        let encoded = urlencoding::encode(&uploaded.name);
        let mut download = format!("{}?alt=media", self.object_url(&encoded));
        if let Some(token) = uploaded.download_tokens.as_deref().and_then(|t| t.split(',').next()) {
            download.push_str("&token=");
            download.push_str(token);
        }
        Ok(download)
    }
}

#[async_trait]
impl ObjectStorage for FirebaseStorage {
    async fn upload(&self, object: StoredObject) -> ServiceResult<String> {
        Ok(self.put(&object).await?)
    }
}
