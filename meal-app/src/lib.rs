//! 献立・活動アプリのアプリケーション層
//!
//! データの読み込み、お気に入りの保存、オフライン用キャッシュワーカーをまとめます。

pub mod application;
pub mod config;
pub mod error;
pub mod infrastructure;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use application::app_state::AppState;
use application::data_loader::load_all;
use application::offline_worker::{InstallReport, OfflineWorker};
use config::AppConfig;
use error::AppError;
use infrastructure::cache_repo::CacheRepository;
use infrastructure::favorites_repo::FavoritesRepository;
use infrastructure::network::Fetcher;
use infrastructure::storage::KeyValueStore;

// 全てのサービスを保持するコンテナ
pub struct AppServices<N: Fetcher, S: KeyValueStore> {
    pub worker: OfflineWorker<N>,
    pub state: AppState<S>,
    /// install に失敗したときは None (ワーカーは Redundant)
    pub install_report: Option<InstallReport>,
}

impl<N: Fetcher, S: KeyValueStore> AppServices<N, S> {
    /// ワーカーの install -> データ読み込み -> お気に入り復元
    ///
    /// データはワーカー経由で読むので、ワーカーが有効ならキャッシュ方針が効く。
    /// キャッシュ DB が使えなくてもアプリは起動し、ネットワークから直接読む。
    pub async fn start(
        config: &AppConfig,
        network: N,
        caches: CacheRepository,
        store: S,
        now: NaiveDateTime,
    ) -> Result<Self, AppError> {
        let mut worker = OfflineWorker::new(network, caches, config);
        let install_report = match worker.install().await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(
                    error = %e,
                    state = ?worker.lifecycle().state(),
                    "offline worker unavailable, loading directly from network"
                );
                None
            }
        };

        let data = match install_report {
            Some(_) => load_all(&worker, &config.files, now.date()).await,
            None => load_all(worker.network(), &config.files, now.date()).await,
        };
        let favorites = FavoritesRepository::load(store);

        info!(
            anchor = %data.anchor,
            favorites = favorites.list().len(),
            "app started"
        );

        Ok(Self {
            worker,
            state: AppState::new(data, favorites),
            install_report,
        })
    }
}
