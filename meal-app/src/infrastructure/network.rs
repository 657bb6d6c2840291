// =====================
// 取得 (ネットワーク相当)
// =====================

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use meal_core::offline_policy::{request_path, ResponseKind};
use tracing::debug;

use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// キャッシュのキー。`./a.png` と `/a.png` は同じキーになる
    pub fn cache_key(&self) -> String {
        let path = request_path(&self.url);
        let path = path.strip_prefix("./").unwrap_or(path);
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub kind: ResponseKind,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            kind: ResponseKind::Basic,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            kind: ResponseKind::Basic,
            content_type: String::from("text/plain; charset=utf-8"),
            body: b"Not Found".to_vec(),
        }
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// 静的ファイルのディレクトリを配信する
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// ルートの外を指すパス (`..`) は拒否する
    fn resolve(&self, key: &str) -> Result<PathBuf, FetchError> {
        let relative = key.trim_start_matches('/');
        let relative = if relative.is_empty() || relative.ends_with('/') {
            format!("{}index.html", relative)
        } else {
            relative.to_string()
        };

        let relative = Path::new(&relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(FetchError::InvalidPath(key.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Fetcher for FsFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let key = request.cache_key();
        let path = self.resolve(&key)?;

        match tokio::fs::read(&path).await {
            Ok(body) => {
                debug!(path = %key, bytes = body.len(), "served from disk");
                Ok(Response::ok(content_type_for(&path), body))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Response::not_found()),
            Err(source) => Err(FetchError::Io { path: key, source }),
        }
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("json") => "application/json",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
