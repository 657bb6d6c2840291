//! オフラインキャッシュの方針
//!
//! リクエストの分類 (常にネットワーク / キャッシュ優先) と、
//! キャッシュワーカーの状態遷移をまとめています。
//! 実際のキャッシュ読み書きは呼び出し側が行います。

use std::fmt;

use serde::{Deserialize, Serialize};

// =====================
// ワーカーの状態遷移
// =====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// 登録直後
    #[default]
    Parsed,
    /// install 中 (事前キャッシュ)
    Installing,
    /// install 完了、有効化待ち
    Waiting,
    /// activate 中 (古いキャッシュの削除)
    Activating,
    /// 有効
    Active,
    /// 失敗 or 置き換え済み
    Redundant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    InvalidStateTransition { from: WorkerState, to: WorkerState },
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::InvalidStateTransition { from, to } => {
                write!(f, "invalid worker state transition: {:?} -> {:?}", from, to)
            }
        }
    }
}

impl std::error::Error for LifecycleError {}

fn is_valid_transition(from: WorkerState, to: WorkerState) -> bool {
    use WorkerState::*;

    matches!(
        (from, to),
        (Parsed, Installing)
            | (Installing, Waiting)
            | (Installing, Redundant)
            | (Waiting, Activating)
            | (Activating, Active)
            | (Activating, Redundant)
            | (Active, Redundant)
    )
}

/// ワーカー1つ分の状態
#[derive(Debug, Clone)]
pub struct WorkerLifecycle {
    version: String,
    state: WorkerState,
    controlling: bool,
}

impl WorkerLifecycle {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            state: WorkerState::Parsed,
            controlling: false,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// clients.claim() 済みか
    pub fn is_controlling(&self) -> bool {
        self.controlling
    }

    pub fn transition(&mut self, to: WorkerState) -> Result<(), LifecycleError> {
        if !is_valid_transition(self.state, to) {
            return Err(LifecycleError::InvalidStateTransition {
                from: self.state,
                to,
            });
        }

        self.state = to;
        if to == WorkerState::Redundant {
            self.controlling = false;
        }
        Ok(())
    }

    /// 待機中のワーカーをすぐに有効化へ進める
    pub fn skip_waiting(&mut self) -> Result<(), LifecycleError> {
        self.transition(WorkerState::Activating)
    }

    /// 開いているページの制御を取る。Active でのみ可能
    pub fn claim(&mut self) -> Result<(), LifecycleError> {
        if self.state != WorkerState::Active {
            return Err(LifecycleError::InvalidStateTransition {
                from: self.state,
                to: WorkerState::Active,
            });
        }

        self.controlling = true;
        Ok(())
    }
}

/// アプリ側からワーカーへのメッセージ
///
/// `{"type":"SKIP_WAITING"}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    SkipWaiting,
}

impl WorkerMessage {
    /// 知らないメッセージは None
    pub fn parse(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }
}

// =====================
// リクエストの分類
// =====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    /// キャッシュを一切使わない (データファイル・エントリ文書)
    AlwaysNetwork,
    /// キャッシュにあればそれを返し、無ければ取得して保存
    CacheFirst,
}

/// レスポンスの種類 (同一オリジンのみ保存する)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    #[default]
    Basic,
    Cors,
    Opaque,
    Error,
}

pub const ENTRY_DOCUMENT: &str = "./index.html";

#[derive(Debug, Clone)]
pub struct CachePolicy {
    network_only: Vec<String>,
}

impl CachePolicy {
    /// `network_only` のいずれかを含むパスは常にネットワークから取る
    pub fn new<I, S>(network_only: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            network_only: network_only.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classify(&self, url: &str) -> ResourceClass {
        let path = request_path(url);

        if path.ends_with('/')
            || path.ends_with("index.html")
            || self.network_only.iter().any(|p| path.contains(p.as_str()))
        {
            ResourceClass::AlwaysNetwork
        } else {
            ResourceClass::CacheFirst
        }
    }

    /// ネットワーク失敗時の代替文書
    pub fn fallback_document(&self) -> &'static str {
        ENTRY_DOCUMENT
    }
}

/// 保存してよいレスポンスか (200 かつ同一オリジン)
pub fn should_store(status: u16, kind: ResponseKind) -> bool {
    status == 200 && kind == ResponseKind::Basic
}

/// 現在のバージョン以外のキャッシュ名
pub fn stale_caches<'a>(cache_names: &'a [String], current: &str) -> Vec<&'a str> {
    cache_names
        .iter()
        .map(String::as_str)
        .filter(|name| *name != current)
        .collect()
}

/// URL からパス部分だけを取り出す (クエリ・フラグメントは除く)
pub fn request_path(url: &str) -> &str {
    let without_origin = match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            rest.find('/').map(|i| &rest[i..]).unwrap_or("/")
        }
        None => url,
    };

    let end = without_origin
        .find(|c: char| c == '?' || c == '#')
        .unwrap_or(without_origin.len());
    &without_origin[..end]
}

#[cfg(test)]
mod offline_policy_tests {
    use super::*;

    fn policy() -> CachePolicy {
        CachePolicy::new([
            "week-config.txt",
            "menu-nido.txt",
            "menu-infanzia.txt",
            "activities.txt",
        ])
    }

    #[test]
    fn test_classify() {
        let policy = policy();

        assert_eq!(policy.classify("/menu-nido.txt"), ResourceClass::AlwaysNetwork);
        assert_eq!(
            policy.classify("https://example.org/app/activities.txt?v=3"),
            ResourceClass::AlwaysNetwork
        );
        assert_eq!(policy.classify("/"), ResourceClass::AlwaysNetwork);
        assert_eq!(policy.classify("https://example.org"), ResourceClass::AlwaysNetwork);
        assert_eq!(policy.classify("./index.html"), ResourceClass::AlwaysNetwork);

        assert_eq!(policy.classify("/style.css"), ResourceClass::CacheFirst);
        assert_eq!(policy.classify("/icon-192.png"), ResourceClass::CacheFirst);
        assert_eq!(policy.classify("/app.js#top"), ResourceClass::CacheFirst);
    }

    #[test]
    fn test_request_path() {
        assert_eq!(request_path("https://example.org/a/b.js?x=1"), "/a/b.js");
        assert_eq!(request_path("/menu-nido.txt#frag"), "/menu-nido.txt");
        assert_eq!(request_path("http://localhost:8080"), "/");
    }

    #[test]
    fn test_should_store() {
        assert!(should_store(200, ResponseKind::Basic));
        assert!(!should_store(200, ResponseKind::Opaque));
        assert!(!should_store(404, ResponseKind::Basic));
    }

    #[test]
    fn test_stale_caches() {
        let names = vec![
            String::from("mep-v0"),
            String::from("mep-v1"),
            String::from("meal-and-play-v1"),
        ];
        assert_eq!(stale_caches(&names, "mep-v1"), vec!["mep-v0", "meal-and-play-v1"]);
    }

    #[test]
    fn test_full_lifecycle() {
        let mut worker = WorkerLifecycle::new("mep-v1");
        worker.transition(WorkerState::Installing).unwrap();
        worker.transition(WorkerState::Waiting).unwrap();
        worker.skip_waiting().unwrap();
        assert_eq!(worker.state(), WorkerState::Activating);
        worker.transition(WorkerState::Active).unwrap();
        worker.claim().unwrap();
        assert!(worker.is_controlling());

        worker.transition(WorkerState::Redundant).unwrap();
        assert!(!worker.is_controlling());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut worker = WorkerLifecycle::new("mep-v1");
        assert_eq!(
            worker.transition(WorkerState::Active),
            Err(LifecycleError::InvalidStateTransition {
                from: WorkerState::Parsed,
                to: WorkerState::Active,
            })
        );

        // install 前の skip waiting / claim はできない
        assert!(worker.skip_waiting().is_err());
        assert!(worker.claim().is_err());

        worker.transition(WorkerState::Installing).unwrap();
        assert!(worker.transition(WorkerState::Activating).is_err());
        assert_eq!(worker.state(), WorkerState::Installing);
    }

    #[test]
    fn test_worker_message() {
        assert_eq!(
            WorkerMessage::parse(r#"{"type":"SKIP_WAITING"}"#),
            Some(WorkerMessage::SkipWaiting)
        );
        assert_eq!(WorkerMessage::parse(r#"{"type":"RELOAD"}"#), None);
        assert_eq!(WorkerMessage::parse("SKIP_WAITING"), None);
    }
}
