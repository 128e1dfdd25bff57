//! JSON directory record store
//!
//! One `<Entity>.json` file per table, each an array of flat objects.
//! Cells may be strings or any JSON scalar; they read back as text. A
//! missing file reads as an empty table. Writes rewrite the whole file.

use crate::errors::{FinanceError, Result};
use crate::store::{flatten_row, upsert, Entity, Record, RecordStore};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Record store backed by a directory of JSON files
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Use `dir`, creating it if needed
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Storage directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn table_path(&self, entity: Entity) -> PathBuf {
        self.dir.join(format!("{}.json", entity.as_str()))
    }

    async fn load(&self, entity: Entity) -> Result<Vec<Record>> {
        let path = self.table_path(entity);
        if !fs::try_exists(&path).await? {
            return Ok(Vec::new());
        }

        let json = fs::read_to_string(&path).await?;
        let rows: Vec<Map<String, Value>> =
            serde_json::from_str(&json).map_err(|e| FinanceError::StoreRead {
                entity: entity.to_string(),
                reason: format!("{}: {}", path.display(), e),
            })?;
        Ok(rows.into_iter().map(flatten_row).collect())
    }
}

#[async_trait]
impl RecordStore for JsonDirStore {
    async fn read_all(&self, entity: Entity) -> Result<Vec<Record>> {
        self.load(entity).await
    }

    async fn write_record(&self, entity: Entity, id: &str, fields: Record) -> Result<()> {
        let mut rows = self.load(entity).await?;
        upsert(&mut rows, id, fields);

        let json = serde_json::to_string_pretty(&rows)?;
        fs::write(self.table_path(entity), json)
            .await
            .map_err(|e| FinanceError::StoreWrite {
                entity: entity.to_string(),
                id: id.to_string(),
                reason: e.to_string(),
            })
    }
}
