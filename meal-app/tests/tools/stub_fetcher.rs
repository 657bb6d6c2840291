use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use meal_app_lib::{
    error::FetchError,
    infrastructure::network::{Fetcher, Request, Response},
};

/// テスト用のネットワーク
///
/// 登録したパスだけ 200、それ以外は 404。`go_offline` 以降はすべて失敗する。
#[derive(Default)]
pub struct StubFetcher {
    files: Mutex<HashMap<String, Response>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, key: &str, body: &str) -> Self {
        self.serve(key, Response::ok("text/plain; charset=utf-8", body.as_bytes().to_vec()));
        self
    }

    pub fn serve(&self, key: &str, response: Response) {
        self.files.lock().unwrap().insert(key.to_string(), response);
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Unavailable(request.url.clone()));
        }

        let files = self.files.lock().unwrap();
        Ok(files
            .get(&request.cache_key())
            .cloned()
            .unwrap_or_else(Response::not_found))
    }
}
