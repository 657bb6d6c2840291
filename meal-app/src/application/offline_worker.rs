//! オフライン用キャッシュワーカー
//!
//! install で事前キャッシュ、activate で古いキャッシュの削除、
//! 以降のリクエストはキャッシュ優先 (データファイルとエントリ文書は常にネットワーク)。

use async_trait::async_trait;
use meal_core::offline_policy::{
    should_store, stale_caches, CachePolicy, ResourceClass, WorkerLifecycle, WorkerMessage,
    WorkerState,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, FetchError};
use crate::infrastructure::cache_repo::CacheRepository;
use crate::infrastructure::network::{Fetcher, Request, Response};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallReport {
    pub cached: Vec<String>,
    pub skipped: Vec<String>,
}

pub struct OfflineWorker<N: Fetcher> {
    network: N,
    caches: CacheRepository,
    policy: CachePolicy,
    lifecycle: WorkerLifecycle,
    precache: Vec<String>,
    skip_waiting_on_install: bool,
}

impl<N: Fetcher> OfflineWorker<N> {
    pub fn new(network: N, caches: CacheRepository, config: &AppConfig) -> Self {
        Self {
            network,
            caches,
            policy: config.cache_policy(),
            lifecycle: WorkerLifecycle::new(config.cache_name.clone()),
            precache: config.precache.clone(),
            skip_waiting_on_install: config.skip_waiting_on_install,
        }
    }

    pub fn lifecycle(&self) -> &WorkerLifecycle {
        &self.lifecycle
    }

    pub fn caches(&self) -> &CacheRepository {
        &self.caches
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    fn version(&self) -> &str {
        self.lifecycle.version()
    }

    // =====================
    // install
    // =====================

    /// 事前キャッシュ。個々の取得失敗は飛ばして続ける
    ///
    /// キャッシュ DB に書けなければ Redundant になって失敗する。
    pub async fn install(&mut self) -> Result<InstallReport, AppError> {
        self.lifecycle.transition(WorkerState::Installing)?;
        info!(version = self.version(), "worker installing");

        let report = match self.precache_assets().await {
            Ok(report) => report,
            Err(e) => {
                self.lifecycle.transition(WorkerState::Redundant)?;
                return Err(e);
            }
        };

        self.lifecycle.transition(WorkerState::Waiting)?;
        info!(
            version = self.version(),
            cached = report.cached.len(),
            skipped = report.skipped.len(),
            "worker installed"
        );

        if self.skip_waiting_on_install {
            self.activate().await?;
        }

        Ok(report)
    }

    async fn precache_assets(&self) -> Result<InstallReport, AppError> {
        let version = self.version().to_string();
        self.caches.open(&version).await?;

        let mut report = InstallReport::default();
        for url in &self.precache {
            let request = Request::get(url.as_str());

            match self.network.fetch(&request).await {
                Ok(response) if response.is_ok() => {
                    self.caches.put(&version, &request.cache_key(), &response).await?;
                    report.cached.push(url.clone());
                }
                Ok(response) => {
                    warn!(url = %url, status = response.status, "precache skipped");
                    report.skipped.push(url.clone());
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "precache skipped");
                    report.skipped.push(url.clone());
                }
            }
        }

        Ok(report)
    }

    // =====================
    // activate
    // =====================

    /// 待機中のワーカーを有効化する。消したキャッシュ名を返す
    pub async fn activate(&mut self) -> Result<Vec<String>, AppError> {
        self.lifecycle.skip_waiting()?;
        info!(version = self.version(), "worker activating");

        let deleted = match self.delete_stale_caches().await {
            Ok(deleted) => deleted,
            Err(e) => {
                self.lifecycle.transition(WorkerState::Redundant)?;
                return Err(e);
            }
        };

        self.lifecycle.transition(WorkerState::Active)?;
        self.lifecycle.claim()?;
        info!(version = self.version(), deleted = deleted.len(), "worker active");

        Ok(deleted)
    }

    async fn delete_stale_caches(&self) -> Result<Vec<String>, AppError> {
        let names = self.caches.cache_names().await?;

        let mut deleted = Vec::new();
        for name in stale_caches(&names, self.version()) {
            info!(cache = name, "deleting old cache");
            if self.caches.delete_cache(name).await? {
                deleted.push(name.to_string());
            }
        }
        Ok(deleted)
    }

    // =====================
    // message
    // =====================

    /// `{"type":"SKIP_WAITING"}` で待機中のワーカーを有効化する
    ///
    /// 知らないメッセージや待機中でないときは何もせず false。
    pub async fn handle_message(&mut self, json: &str) -> Result<bool, AppError> {
        match WorkerMessage::parse(json) {
            Some(WorkerMessage::SkipWaiting) if self.lifecycle.state() == WorkerState::Waiting => {
                self.activate().await?;
                Ok(true)
            }
            Some(WorkerMessage::SkipWaiting) => {
                debug!(state = ?self.lifecycle.state(), "skip waiting ignored");
                Ok(false)
            }
            None => {
                debug!(message = json, "unknown worker message");
                Ok(false)
            }
        }
    }

    // =====================
    // fetch
    // =====================

    /// 制御中でなければそのままネットワークへ
    pub async fn handle_fetch(&self, request: &Request) -> Result<Response, FetchError> {
        if !self.lifecycle.is_controlling() {
            return self.network.fetch(request).await;
        }

        match self.policy.classify(&request.url) {
            ResourceClass::AlwaysNetwork => self.network.fetch(request).await,
            ResourceClass::CacheFirst => self.cache_first(request).await,
        }
    }

    async fn cache_first(&self, request: &Request) -> Result<Response, FetchError> {
        let key = request.cache_key();

        match self.caches.match_any(&key).await {
            Ok(Some(cached)) => {
                debug!(key = %key, "cache hit");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "cache lookup failed"),
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if should_store(response.status, response.kind) {
                    if let Err(e) = self.caches.put(self.version(), &key, &response).await {
                        warn!(key = %key, error = %e, "failed to cache response");
                    }
                }
                Ok(response)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "network failed, trying entry document");
                let fallback = Request::get(self.policy.fallback_document()).cache_key();
                match self.caches.match_any(&fallback).await {
                    Ok(Some(document)) => Ok(document),
                    _ => Err(e),
                }
            }
        }
    }
}

/// ワーカー経由の取得 (ブラウザでの fetch と同じ経路)
#[async_trait]
impl<N: Fetcher> Fetcher for OfflineWorker<N> {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.handle_fetch(request).await
    }
}
