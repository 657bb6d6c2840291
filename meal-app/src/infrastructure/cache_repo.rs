use std::str::FromStr;

use chrono::Utc;
use meal_core::offline_policy::ResponseKind;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, SqlitePool,
};
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::infrastructure::network::Response;

/// バージョン名ごとのレスポンスキャッシュ (Cache Storage 相当)
pub struct CacheRepository {
    pool: SqlitePool,
}

// =====================
// DB読み込み用ヘルパー構造体
// =====================

#[derive(FromRow)]
struct CachedResponseRow {
    status: i64,
    kind: String,
    content_type: String,
    body: Vec<u8>,
}

impl CachedResponseRow {
    fn into_response(self) -> Response {
        let kind = match self.kind.as_str() {
            "basic" => ResponseKind::Basic,
            "cors" => ResponseKind::Cors,
            "opaque" => ResponseKind::Opaque,
            _ => ResponseKind::Error,
        };

        Response {
            status: u16::try_from(self.status).unwrap_or(500),
            kind,
            content_type: self.content_type,
            body: self.body,
        }
    }
}

fn kind_name(kind: ResponseKind) -> &'static str {
    match kind {
        ResponseKind::Basic => "basic",
        ResponseKind::Cors => "cors",
        ResponseKind::Opaque => "opaque",
        ResponseKind::Error => "error",
    }
}

impl CacheRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 接続してマイグレーションまで済ませる
    ///
    /// `sqlite::memory:` は接続ごとに別の DB になるので接続を1本に固定する。
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self::new(pool))
    }

    /// `connect` できなければメモリ上の DB で代用する
    ///
    /// それも駄目なら未初期化の DB を返す。その場合ワーカーの install が失敗し、
    /// アプリはキャッシュなしで動く。
    pub async fn connect_or_fallback(url: &str) -> Self {
        match Self::connect(url).await {
            Ok(repo) => return repo,
            Err(e) => warn!(url, error = %e, "cache database unavailable, using in-memory cache"),
        }

        match Self::connect("sqlite::memory:").await {
            Ok(repo) => repo,
            Err(e) => {
                warn!(error = %e, "in-memory cache unavailable, running without cache");
                Self::new(SqlitePoolOptions::new().connect_lazy_with(SqliteConnectOptions::new()))
            }
        }
    }

    /// キャッシュを作る (既にあれば何もしない)
    pub async fn open(&self, cache_name: &str) -> Result<(), CacheError> {
        sqlx::query("INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)")
            .bind(cache_name)
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn has_cache(&self, cache_name: &str) -> Result<bool, CacheError> {
        let found: Option<(String,)> = sqlx::query_as("SELECT name FROM caches WHERE name = ?1")
            .bind(cache_name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// 作成順
    pub async fn cache_names(&self) -> Result<Vec<String>, CacheError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM caches ORDER BY created_at ASC, name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// 同じキーがあれば上書き
    pub async fn put(
        &self,
        cache_name: &str,
        request_key: &str,
        response: &Response,
    ) -> Result<(), CacheError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)")
            .bind(cache_name)
            .bind(Utc::now().timestamp_millis())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO cache_entries (
                cache_name,
                request_key,
                status,
                kind,
                content_type,
                body,
                cached_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (cache_name, request_key) DO UPDATE SET
                status = excluded.status,
                kind = excluded.kind,
                content_type = excluded.content_type,
                body = excluded.body,
                cached_at = excluded.cached_at",
        )
        .bind(cache_name)
        .bind(request_key)
        .bind(i64::from(response.status))
        .bind(kind_name(response.kind))
        .bind(&response.content_type)
        .bind(&response.body)
        .bind(Utc::now().timestamp_millis())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(cache = cache_name, key = request_key, "response cached");
        Ok(())
    }

    /// 指定キャッシュ内を探す
    pub async fn match_in(
        &self,
        cache_name: &str,
        request_key: &str,
    ) -> Result<Option<Response>, CacheError> {
        let row = sqlx::query_as::<sqlx::Sqlite, CachedResponseRow>(
            "SELECT status, kind, content_type, body FROM cache_entries
             WHERE cache_name = ?1 AND request_key = ?2",
        )
        .bind(cache_name)
        .bind(request_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CachedResponseRow::into_response))
    }

    /// すべてのキャッシュから探す (古いキャッシュが優先)
    pub async fn match_any(&self, request_key: &str) -> Result<Option<Response>, CacheError> {
        let row = sqlx::query_as::<sqlx::Sqlite, CachedResponseRow>(
            "SELECT e.status, e.kind, e.content_type, e.body
             FROM cache_entries e
             JOIN caches c ON c.name = e.cache_name
             WHERE e.request_key = ?1
             ORDER BY c.created_at ASC, c.name ASC
             LIMIT 1",
        )
        .bind(request_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CachedResponseRow::into_response))
    }

    pub async fn entry_count(&self, cache_name: &str) -> Result<i64, CacheError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM cache_entries WHERE cache_name = ?1")
                .bind(cache_name)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// キャッシュと中身を消す。存在しなければ false
    pub async fn delete_cache(&self, cache_name: &str) -> Result<bool, CacheError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cache_entries WHERE cache_name = ?1")
            .bind(cache_name)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM caches WHERE name = ?1")
            .bind(cache_name)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok(deleted > 0)
    }
}
