use std::path::PathBuf;

use meal_core::offline_policy::LifecycleError;
use thiserror::Error;

/// ローカルストレージ (お気に入りの保存先) のエラー
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode stored value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// 取得 (ネットワーク相当) のエラー
///
/// 404 などはエラーではなくレスポンスとして返す。
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request path is not allowed: {0}")]
    InvalidPath(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("network unavailable for {0}")]
    Unavailable(String),

    #[error("unexpected status {status} for {path}")]
    Status { path: String, status: u16 },
}

/// キャッシュ DB のエラー
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cache migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("worker lifecycle: {0}")]
    Lifecycle(#[from] LifecycleError),
}
