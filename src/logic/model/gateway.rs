//! Model Gateway - Lazy, load-once model access
//!
//! Owned by the composition root and passed to whoever needs the model.
//! The first `get` loads the artifact; concurrent first calls block on the
//! same load, so the file is read at most once. A failed load is returned
//! to the caller and nothing is cached.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use once_cell::sync::OnceCell;

use crate::logic::error::PipelineResult;
use super::inference::ModelHandle;

#[derive(Debug)]
pub struct ModelGateway {
    path: PathBuf,
    handle: OnceCell<Arc<ModelHandle>>,
}

impl ModelGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            handle: OnceCell::new(),
        }
    }

    /// Gateway around an already-built handle (stub models, tests)
    pub fn preloaded(handle: ModelHandle) -> Self {
        let path = PathBuf::from(&handle.metadata().model_path);
        Self {
            path,
            handle: OnceCell::with_value(Arc::new(handle)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loaded handle, loading it on first use
    pub fn get(&self) -> PipelineResult<Arc<ModelHandle>> {
        self.handle
            .get_or_try_init(|| ModelHandle::load(&self.path).map(Arc::new))
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.get().is_some()
    }
}
