//! Legacy data sources.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::errors::{MigrationError, Result};

/// What a mapping reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceTarget {
    Table(String),
    Query(String),
}

impl SourceTarget {
    pub fn name(&self) -> &str {
        match self {
            SourceTarget::Table(name) | SourceTarget::Query(name) => name,
        }
    }
}

/// Offset/limit reader over legacy rows.
///
/// Rows are JSON objects keyed by column name. `fetch` past the end
/// returns an empty batch.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn row_count(&self, target: &SourceTarget) -> Result<usize>;

    async fn fetch(&self, target: &SourceTarget, offset: usize, limit: usize)
        -> Result<Vec<Value>>;
}

fn page(rows: &[Value], offset: usize, limit: usize) -> Vec<Value> {
    rows.iter().skip(offset).take(limit).cloned().collect()
}

fn unsupported_query(source: &str, target: &SourceTarget) -> MigrationError {
    MigrationError::Source(format!(
        "{} does not support queries: {}",
        source,
        target.name()
    ))
}

/// In-process tables
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    tables: BTreeMap<String, Vec<Value>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, rows: Vec<Value>) -> Self {
        self.insert_table(name, rows);
        self
    }

    pub fn insert_table(&mut self, name: &str, rows: Vec<Value>) {
        self.tables.insert(name.to_string(), rows);
    }

    fn table(&self, target: &SourceTarget) -> Result<&[Value]> {
        match target {
            SourceTarget::Table(name) => self
                .tables
                .get(name)
                .map(Vec::as_slice)
                .ok_or_else(|| MigrationError::Source(format!("unknown table {}", name))),
            SourceTarget::Query(_) => Err(unsupported_query("memory source", target)),
        }
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn row_count(&self, target: &SourceTarget) -> Result<usize> {
        Ok(self.table(target)?.len())
    }

    async fn fetch(
        &self,
        target: &SourceTarget,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Value>> {
        Ok(page(self.table(target)?, offset, limit))
    }
}

/// A directory of `<table>.json` files, each holding an array of rows.
///
/// Files are read once and cached. A missing file is an empty table.
pub struct JsonFileSource {
    dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<Vec<Value>>>>,
}

impl JsonFileSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}.json", table))
    }

    async fn load(&self, target: &SourceTarget) -> Result<Arc<Vec<Value>>> {
        let table = match target {
            SourceTarget::Table(name) => name,
            SourceTarget::Query(_) => return Err(unsupported_query("json file source", target)),
        };

        let mut cache = self.cache.lock().await;
        if let Some(rows) = cache.get(table) {
            return Ok(Arc::clone(rows));
        }

        let path = self.table_path(table);
        let rows = match tokio::fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<Value>(&content)? {
                Value::Array(rows) => rows,
                _ => {
                    return Err(MigrationError::Source(format!(
                        "{} must contain a JSON array",
                        path.display()
                    )))
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("No source file for table {}: {}", table, path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        debug!("Loaded {} rows from {}", rows.len(), path.display());

        let rows = Arc::new(rows);
        cache.insert(table.clone(), Arc::clone(&rows));
        Ok(rows)
    }
}

#[async_trait]
impl DataSource for JsonFileSource {
    async fn row_count(&self, target: &SourceTarget) -> Result<usize> {
        Ok(self.load(target).await?.len())
    }

    async fn fetch(
        &self,
        target: &SourceTarget,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Value>> {
        Ok(page(&self.load(target).await?, offset, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(n: usize) -> Vec<Value> {
        (0..n).map(|i| json!({"id": i})).collect()
    }

    #[tokio::test]
    async fn test_memory_source_paging() {
        let source = MemorySource::new().with_table("users", rows(5));
        let users = SourceTarget::Table("users".into());

        assert_eq!(source.row_count(&users).await.unwrap(), 5);
        let batch = source.fetch(&users, 2, 2).await.unwrap();
        assert_eq!(batch, vec![json!({"id": 2}), json!({"id": 3})]);
        assert!(source.fetch(&users, 10, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_source_unknown_table_and_query() {
        let source = MemorySource::new();
        assert!(matches!(
            source.row_count(&SourceTarget::Table("nope".into())).await,
            Err(MigrationError::Source(_))
        ));
        assert!(source
            .fetch(&SourceTarget::Query("SELECT 1".into()), 0, 1)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_json_file_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("circles.json"),
            serde_json::to_string(&rows(3)).unwrap(),
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.json"), r#"{"id": 1}"#).unwrap();

        let source = JsonFileSource::new(dir.path());
        let circles = SourceTarget::Table("circles".into());
        assert_eq!(source.row_count(&circles).await.unwrap(), 3);
        assert_eq!(source.fetch(&circles, 1, 5).await.unwrap().len(), 2);

        let missing = SourceTarget::Table("stories".into());
        assert_eq!(source.row_count(&missing).await.unwrap(), 0);

        let broken = SourceTarget::Table("broken".into());
        assert!(matches!(
            source.row_count(&broken).await,
            Err(MigrationError::Source(_))
        ));
    }
}
