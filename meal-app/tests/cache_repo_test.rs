#[cfg(test)]
mod cache_repo_tests {
    use meal_app_lib::infrastructure::{cache_repo::CacheRepository, network::Response};
    use meal_core::offline_policy::ResponseKind;

    // ========================================================================
    // 1. テスト用セットアップ
    // ========================================================================

    async fn setup_test_cache() -> CacheRepository {
        CacheRepository::connect("sqlite::memory:")
            .await
            .expect("Failed to create memory cache")
    }

    fn png(bytes: &[u8]) -> Response {
        Response::ok("image/png", bytes.to_vec())
    }

    // ========================================================================
    // 2. テストケース
    // ========================================================================

    #[tokio::test]
    async fn test_put_and_match() {
        let repo = setup_test_cache().await;

        repo.put("mep-v1", "/icon-192.png", &png(&[1, 2, 3])).await.unwrap();

        let hit = repo.match_in("mep-v1", "/icon-192.png").await.unwrap().unwrap();
        assert_eq!(hit.status, 200);
        assert_eq!(hit.kind, ResponseKind::Basic);
        assert_eq!(hit.content_type, "image/png");
        assert_eq!(hit.body, vec![1, 2, 3]);

        assert!(repo.match_in("mep-v1", "/missing.png").await.unwrap().is_none());
        assert!(repo.match_in("mep-v0", "/icon-192.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let repo = setup_test_cache().await;

        repo.put("mep-v1", "/app.js", &png(b"old")).await.unwrap();
        repo.put("mep-v1", "/app.js", &png(b"new")).await.unwrap();

        assert_eq!(repo.entry_count("mep-v1").await.unwrap(), 1);
        let hit = repo.match_any("/app.js").await.unwrap().unwrap();
        assert_eq!(hit.body, b"new".to_vec());
    }

    #[tokio::test]
    async fn test_cache_names_and_delete() {
        let repo = setup_test_cache().await;

        repo.open("mep-v0").await.unwrap();
        repo.put("mep-v0", "/style.css", &png(b"css")).await.unwrap();
        repo.open("mep-v1").await.unwrap();

        let names = repo.cache_names().await.unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&String::from("mep-v0")));
        assert!(repo.has_cache("mep-v1").await.unwrap());

        assert!(repo.delete_cache("mep-v0").await.unwrap());
        assert!(!repo.delete_cache("mep-v0").await.unwrap());

        assert_eq!(repo.cache_names().await.unwrap(), vec![String::from("mep-v1")]);
        assert_eq!(repo.entry_count("mep-v0").await.unwrap(), 0);
        assert!(repo.match_any("/style.css").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let repo = setup_test_cache().await;

        repo.open("mep-v1").await.unwrap();
        repo.open("mep-v1").await.unwrap();

        assert_eq!(repo.cache_names().await.unwrap(), vec![String::from("mep-v1")]);
        assert_eq!(repo.entry_count("mep-v1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_database_falls_back_to_memory() {
        let dir = tempfile::TempDir::new().unwrap();
        // 親ディレクトリが無いので開けない
        let url = format!(
            "sqlite://{}",
            dir.path().join("missing").join("cache.db").display()
        );
        assert!(CacheRepository::connect(&url).await.is_err());

        let repo = CacheRepository::connect_or_fallback(&url).await;
        repo.put("mep-v1", "/index.html", &png(b"html")).await.unwrap();
        assert_eq!(repo.cache_names().await.unwrap(), vec![String::from("mep-v1")]);
    }

    #[tokio::test]
    async fn test_fallback_keeps_working_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let url = format!("sqlite://{}", dir.path().join("cache.db").display());

        let repo = CacheRepository::connect_or_fallback(&url).await;
        repo.open("mep-v1").await.unwrap();
        drop(repo);

        // 同じファイルを開き直せば中身が残っている
        let reopened = CacheRepository::connect_or_fallback(&url).await;
        assert!(reopened.has_cache("mep-v1").await.unwrap());
    }
}
