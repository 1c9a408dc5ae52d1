use async_trait::async_trait;
use ft_core::{ArticleStorage, Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn get_error_message() -> &'static str;
    async fn new() -> Result<Self> where Self: Sized;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    Memory,
    #[default]
    SQLite,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::SQLite),
            other => Err(Error::Storage(format!("Unknown storage backend: {}", other))),
        }
    }
}

impl StorageKind {
    /// What the backend expects to find when it is opened.
    pub fn error_hint(&self) -> &'static str {
        match self {
            Self::Memory => <InMemoryStorage as StorageBackend>::get_error_message(),
            #[cfg(feature = "sqlite")]
            Self::SQLite => <SQLiteStorage as StorageBackend>::get_error_message(),
            #[cfg(not(feature = "sqlite"))]
            Self::SQLite => "SQLite support was not compiled in",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::SQLite => f.write_str("sqlite"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BackendConfig {
    pub kind: StorageKind,
    /// Database file, only used by the SQLite backend.
    pub path: Option<PathBuf>,
}

pub async fn create_storage(config: &BackendConfig) -> Result<Arc<dyn ArticleStorage>> {
    match config.kind {
        StorageKind::Memory => Ok(Arc::new(InMemoryStorage::new())),
        #[cfg(feature = "sqlite")]
        StorageKind::SQLite => {
            let storage = match &config.path {
                Some(path) => SQLiteStorage::new_with_path(path).await?,
                None => <SQLiteStorage as StorageBackend>::new().await?,
            };
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageKind::SQLite => Err(Error::Storage(
            "SQLite support was not compiled in".to_string(),
        )),
    }
}

pub mod prelude {
    pub use super::{create_storage, BackendConfig, StorageKind};
    pub use super::backends::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kind_from_str() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!("SQLite".parse::<StorageKind>().unwrap(), StorageKind::SQLite);
        assert!("qdrant".parse::<StorageKind>().is_err());
    }

    #[test]
    fn test_error_hint_names_backend() {
        assert_eq!(StorageKind::Memory.error_hint(), "Memory storage should be available");
        assert!(StorageKind::SQLite.error_hint().contains("SQLite"));
    }

    #[tokio::test]
    async fn test_create_memory_storage() {
        let config = BackendConfig {
            kind: StorageKind::Memory,
            path: None,
        };
        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.name(), "memory");
    }
}
