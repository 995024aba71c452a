use std::path::{Path, PathBuf};

use tracing::debug;

use super::classifier::CategoryModel;
use crate::error::Result;

/// Where a trained classifier lives between runs.
pub trait ModelStore {
    /// `Ok(None)` means nothing has been trained yet.
    fn load(&self) -> Result<Option<CategoryModel>>;
    fn save(&self, model: &CategoryModel) -> Result<()>;
}

/// JSON artifact at a fixed path.
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl ModelStore for FileModelStore {
    fn load(&self) -> Result<Option<CategoryModel>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let model = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), "loaded classifier");
        Ok(Some(model))
    }

    fn save(&self, model: &CategoryModel) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(model)?;
        std::fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "saved classifier");
        Ok(())
    }
}

/// Store that never touches disk.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryModelStore {
    slot: std::cell::RefCell<Option<CategoryModel>>,
}

#[cfg(test)]
impl MemoryModelStore {
    pub fn is_empty(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

#[cfg(test)]
impl ModelStore for MemoryModelStore {
    fn load(&self) -> Result<Option<CategoryModel>> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, model: &CategoryModel) -> Result<()> {
        *self.slot.borrow_mut() = Some(model.clone());
        Ok(())
    }
}
