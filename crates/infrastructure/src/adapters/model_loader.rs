//! Anomaly model loader dependency
//!
//! A check reads the model artifact's metadata. Without a configured path
//! the loader is in-process and always reachable.

use std::path::PathBuf;

use application::{ApplicationError, DependencyPort};
use async_trait::async_trait;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ModelLoaderAdapter {
    model_path: Option<PathBuf>,
}

impl ModelLoaderAdapter {
    pub fn new(model_path: Option<PathBuf>) -> Self {
        Self { model_path }
    }

    pub fn model_path(&self) -> Option<&std::path::Path> {
        self.model_path.as_deref()
    }
}

#[async_trait]
impl DependencyPort for ModelLoaderAdapter {
    fn name(&self) -> &'static str {
        "model_loader"
    }

    async fn check(&self) -> Result<(), ApplicationError> {
        let Some(path) = &self.model_path else {
            return Ok(());
        };
        let meta = tokio::fs::metadata(path).await.map_err(|e| {
            ApplicationError::Transport(format!("model artifact {}: {e}", path.display()))
        })?;
        if !meta.is_file() || meta.len() == 0 {
            return Err(ApplicationError::Transport(format!(
                "model artifact {} is empty or not a file",
                path.display()
            )));
        }
        debug!(path = %path.display(), bytes = meta.len(), "Model artifact readable");
        Ok(())
    }
}
