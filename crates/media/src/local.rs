use std::path::{Component, Path, PathBuf};

use {
    agora_service_traits::{ObjectStorage, ServiceResult, StoredObject},
    async_trait::async_trait,
    tracing::debug,
};

use crate::{Context, Error, Result};

/// Writes uploads below a directory that the HTTP server exposes statically.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let relative = Path::new(relative);
        let clean = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !clean || relative.as_os_str().is_empty() {
            return Err(Error::invalid_input(format!(
                "refusing to store outside the upload directory: {}",
                relative.display()
            )));
        }
        Ok(self.root.join(relative))
    }

    pub async fn write(&self, object: &StoredObject) -> Result<String> {
        let target = self.resolve(&object.path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        tokio::fs::write(&target, &object.bytes)
            .await
            .with_context(|| format!("writing {}", target.display()))?;
        debug!(path = %target.display(), size = object.bytes.len(), "stored upload");
        Ok(format!("{}/{}", self.public_base_url, object.path))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(&self, object: StoredObject) -> ServiceResult<String> {
        Ok(self.write(&object).await?)
    }
}
