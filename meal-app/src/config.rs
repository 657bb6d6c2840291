//! アプリ設定 (JSON)
//!
//! ```json
//! {
//!   "dataDir": "./public",
//!   "cacheName": "mep-v1",
//!   "precache": ["./index.html", "./manifest.json"],
//!   "skipWaitingOnInstall": true
//! }
//! ```
//!
//! 書かれていない項目はすべて既定値になります。

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use meal_core::offline_policy::CachePolicy;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;

/// 読み込むデータファイル名 (dataDir からの相対パス)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataFiles {
    pub week_config: String,
    pub menu_nido: String,
    pub menu_infanzia: String,
    pub activities: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            week_config: String::from("week-config.txt"),
            menu_nido: String::from("menu-nido.txt"),
            menu_infanzia: String::from("menu-infanzia.txt"),
            activities: String::from("activities.txt"),
        }
    }
}

impl DataFiles {
    pub fn names(&self) -> [&str; 4] {
        [
            self.week_config.as_str(),
            self.menu_nido.as_str(),
            self.menu_infanzia.as_str(),
            self.activities.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// 静的ファイルのルート
    pub data_dir: PathBuf,
    pub files: DataFiles,
    /// キャッシュ名 = ワーカーのバージョン
    pub cache_name: String,
    /// install 時に取っておくファイル
    pub precache: Vec<String>,
    /// データファイル以外で常にネットワークから取るパターン
    pub network_only: Vec<String>,
    /// お気に入りを保存する JSON ファイル
    pub favorites_path: PathBuf,
    pub cache_database_url: String,
    pub skip_waiting_on_install: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            files: DataFiles::default(),
            cache_name: String::from("mep-v1"),
            precache: vec![
                String::from("./index.html"),
                String::from("./manifest.json"),
                String::from("./icon-192.png"),
                String::from("./icon-512.png"),
            ],
            network_only: Vec::new(),
            favorites_path: PathBuf::from("local-storage.json"),
            cache_database_url: String::from("sqlite://meal-cache.db"),
            skip_waiting_on_install: true,
        }
    }
}

impl AppConfig {
    /// ファイルが無ければ既定値
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "config not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(AppError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&text).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// データファイル + 追加パターン
    pub fn cache_policy(&self) -> CachePolicy {
        let data_files = self.files.names().into_iter().map(String::from);
        CachePolicy::new(data_files.chain(self.network_only.iter().cloned()))
    }
}
