//! Stable per-machine identity used to register with the remote listener.

use crate::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Reads the terminal id from a file, creating it on first use.
#[derive(Debug, Clone)]
pub struct TerminalIdStore {
    path: PathBuf,
}

impl TerminalIdStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored id, verbatim. A missing or empty file gets a fresh id written to it.
    pub async fn get_or_create(&self) -> Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(id) if !id.is_empty() => return Ok(id),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::Terminal(format!(
                    "cannot read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        }

        let id = Uuid::new_v4().to_string();
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, &id).await?;
        info!("Created terminal id in {}", self.path.display());
        Ok(id)
    }
}

/// Deterministic IDE id for a connection.
pub fn ide_id(conn_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, conn_id.as_bytes())
        .simple()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_created_once_then_reused() {
        let dir = tempfile::tempdir().unwrap();
        let store = TerminalIdStore::new(dir.path().join("nested/terminalId"));

        let first = store.get_or_create().await.unwrap();
        let second = store.get_or_create().await.unwrap();

        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[tokio::test]
    async fn test_existing_value_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terminalId");
        std::fs::write(&path, "71F4E0B1C2D3").unwrap();

        let id = TerminalIdStore::new(&path).get_or_create().await.unwrap();
        assert_eq!(id, "71F4E0B1C2D3");
    }

    #[test]
    fn test_ide_id_is_stable() {
        assert_eq!(ide_id("A4H"), ide_id("A4H"));
        assert_ne!(ide_id("A4H"), ide_id("NPL"));
        assert_eq!(ide_id("A4H").len(), 32);
    }
}
