use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Raw text storage behind config and high-score files.
pub trait ContentProvider {
    /// `Ok(None)` means nothing has been stored yet.
    fn read_content(&self) -> Result<Option<String>, String>;
    fn write_content(&self, content: &str) -> Result<(), String>;
}

#[derive(Debug, Clone)]
pub struct FileContentProvider {
    path: PathBuf,
}

impl FileContentProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentProvider for FileContentProvider {
    fn read_content(&self) -> Result<Option<String>, String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(format!("Failed to read {}: {}", self.path.display(), err)),
        }
    }

    fn write_content(&self, content: &str) -> Result<(), String> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        std::fs::write(&self.path, content)
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))
    }
}

/// Keeps content in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentProvider {
    content: Arc<Mutex<Option<String>>>,
}

impl MemoryContentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: &str) -> Self {
        Self {
            content: Arc::new(Mutex::new(Some(content.to_string()))),
        }
    }
}

impl ContentProvider for MemoryContentProvider {
    fn read_content(&self) -> Result<Option<String>, String> {
        let guard = self
            .content
            .lock()
            .map_err(|_| "Memory content lock poisoned".to_string())?;
        Ok(guard.clone())
    }

    fn write_content(&self, content: &str) -> Result<(), String> {
        let mut guard = self
            .content
            .lock()
            .map_err(|_| "Memory content lock poisoned".to_string())?;
        *guard = Some(content.to_string());
        Ok(())
    }
}
