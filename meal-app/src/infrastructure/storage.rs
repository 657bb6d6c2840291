use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::StorageError;

/// 文字列キー -> 文字列値 の同期ストレージ (localStorage 相当)
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

// =====================
// メモリ上 (テスト用)
// =====================

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =====================
// JSON ファイル
// =====================

/// 1つの JSON オブジェクトファイルに全キーを保存する
///
/// 書き込みのたびにファイル全体を書き直す。
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// ファイルが無ければ空で始める。壊れていても空で始める (warn)
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let items = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(items) => items,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "storage file is corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        Ok(Self { path, items })
    }

    /// 同じディレクトリの一時ファイルに書いてから置き換える
    fn flush(&self) -> Result<(), StorageError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };
        let io_error = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        fs::create_dir_all(&dir).map_err(io_error)?;

        let text = serde_json::to_string_pretty(&self.items)?;
        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_error)?;
        tmp.write_all(text.as_bytes()).map_err(io_error)?;
        tmp.as_file().sync_all().map_err(io_error)?;
        tmp.persist(&self.path).map_err(|e| io_error(e.error))?;

        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        self.flush()
    }
}
