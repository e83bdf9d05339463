//! Upload storage: local directory or Firebase, selected by configuration.

pub mod error;
pub mod firebase;
pub mod local;
pub mod mime;

use std::sync::Arc;

use {
    agora_config::{StorageBackend, StorageConfig},
    agora_service_traits::ObjectStorage,
};

pub use {
    error::{Context, Error, Result},
    firebase::FirebaseStorage,
    local::LocalObjectStorage,
    mime::content_type_for,
};

/// Storage path for an upload owned by a record: `{folder}/{folder}_{id}/{name}`.
///
/// Only the final component of `filename` is kept.
pub fn upload_path(folder: &str, id: impl std::fmt::Display, filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
        .unwrap_or("upload");
    format!("{folder}/{folder}_{id}/{name}")
}

pub fn build_storage(config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>> {
    match config.backend {
        StorageBackend::Local => Ok(Arc::new(LocalObjectStorage::new(
            &config.directory,
            &config.public_base_url,
        ))),
        StorageBackend::Firebase => {
            let bucket = config
                .firebase_bucket
                .clone()
                .filter(|b| !b.is_empty())
                .ok_or_else(|| Error::invalid_input("storage.firebase_bucket is not set"))?;
            Ok(Arc::new(FirebaseStorage::new(
                &config.firebase_api_base,
                bucket,
                config.firebase_api_key.clone(),
            )))
        },
    }
}
