use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::Tool;

/// Bumped whenever `StoredResult` changes shape; older files are refused.
pub const STORE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store directory missing or not writable: {0}")]
    Dir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid stored result: {0}")]
    Format(#[from] serde_json::Error),
    #[error("stored result has schema version {found}, expected {expected}")]
    SchemaMismatch { found: u32, expected: u32 },
    #[error("stored result belongs to tool {found}, expected {expected}")]
    ToolMismatch { found: String, expected: String },
}

/// Last completed result of a tool, handed from one run to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult<O> {
    pub schema_version: u32,
    pub tool: String,
    pub job_id: Option<String>,
    pub saved_utc: String,
    pub output: O,
}

#[derive(Deserialize)]
struct StoredHeader {
    schema_version: u32,
    tool: String,
}

/// One JSON file per tool under a directory, replaced atomically.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for<T: Tool>(&self) -> PathBuf {
        self.dir.join(format!("{}.json", T::NAME))
    }

    pub fn save<T: Tool>(
        &self,
        job_id: Option<&str>,
        saved_utc: &str,
        output: &T::Output,
    ) -> Result<PathBuf, StoreError> {
        let record = StoredResult {
            schema_version: STORE_SCHEMA_VERSION,
            tool: T::NAME.to_string(),
            job_id: job_id.map(ToOwned::to_owned),
            saved_utc: saved_utc.to_string(),
            output,
        };
        let content = serde_json::to_string_pretty(&record)?;
        self.write_atomic(&self.path_for::<T>(), content.as_bytes())
    }

    /// Loads the stored result; a missing file is `Ok(None)`.
    pub fn load<T: Tool>(&self) -> Result<Option<StoredResult<T::Output>>, StoreError> {
        let content = match fs::read_to_string(self.path_for::<T>()) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        // Check the header first so a stale layout reports a version error, not a parse error.
        let header: StoredHeader = serde_json::from_str(&content)?;
        if header.schema_version != STORE_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                found: header.schema_version,
                expected: STORE_SCHEMA_VERSION,
            });
        }
        if header.tool != T::NAME {
            return Err(StoreError::ToolMismatch {
                found: header.tool,
                expected: T::NAME.to_string(),
            });
        }

        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Removes the stored result; returns whether one existed.
    pub fn clear<T: Tool>(&self) -> Result<bool, StoreError> {
        match fs::remove_file(self.path_for::<T>()) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        if self.dir.exists() {
            let meta = fs::metadata(&self.dir).map_err(|e| StoreError::Dir(e.to_string()))?;
            if !meta.is_dir() {
                return Err(StoreError::Dir("path is not a directory".into()));
            }
            Ok(())
        } else {
            fs::create_dir_all(&self.dir).map_err(|e| StoreError::Dir(e.to_string()))
        }
    }

    fn write_atomic(&self, target: &Path, content: &[u8]) -> Result<PathBuf, StoreError> {
        self.ensure_dir()?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(target).map_err(|e| StoreError::Io(e.error))?;
        Ok(target.to_path_buf())
    }
}
