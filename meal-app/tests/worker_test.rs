mod tools;

#[cfg(test)]
mod worker_tests {
    use meal_app_lib::{
        application::offline_worker::OfflineWorker,
        config::AppConfig,
        error::{AppError, FetchError},
        infrastructure::{
            cache_repo::CacheRepository,
            network::{Fetcher, Request, Response},
        },
    };
    use meal_core::offline_policy::{ResponseKind, WorkerState};

    use crate::tools::stub_fetcher::StubFetcher;

    // ========================================================================
    // 1. テスト用セットアップ
    // ========================================================================

    fn config(skip_waiting_on_install: bool) -> AppConfig {
        AppConfig {
            cache_name: String::from("mep-v1"),
            precache: vec![
                String::from("./index.html"),
                String::from("./manifest.json"),
                String::from("./icon-192.png"),
            ],
            skip_waiting_on_install,
            ..AppConfig::default()
        }
    }

    fn network() -> StubFetcher {
        StubFetcher::new()
            .with_text("/index.html", "<html>home</html>")
            .with_text("/manifest.json", "{}")
            .with_text("/style.css", "body {}")
            .with_text("/menu-nido.txt", "1|1|Pasta|Pollo|Mela")
    }

    async fn setup_worker(skip_waiting_on_install: bool) -> OfflineWorker<StubFetcher> {
        let caches = CacheRepository::connect("sqlite::memory:")
            .await
            .expect("Failed to create memory cache");
        OfflineWorker::new(network(), caches, &config(skip_waiting_on_install))
    }

    // ========================================================================
    // 2. install / activate
    // ========================================================================

    #[tokio::test]
    async fn test_install_skips_unavailable_assets() {
        let mut worker = setup_worker(true).await;

        let report = worker.install().await.unwrap();

        assert_eq!(report.cached, vec!["./index.html", "./manifest.json"]);
        assert_eq!(report.skipped, vec!["./icon-192.png"]);
        assert_eq!(worker.lifecycle().state(), WorkerState::Active);
        assert!(worker.lifecycle().is_controlling());
        assert_eq!(worker.caches().entry_count("mep-v1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_activate_deletes_old_versions() {
        let mut worker = setup_worker(true).await;
        worker
            .caches()
            .put("mep-v0", "/style.css", &Response::ok("text/css", "old"))
            .await
            .unwrap();

        worker.install().await.unwrap();

        assert_eq!(
            worker.caches().cache_names().await.unwrap(),
            vec![String::from("mep-v1")]
        );
    }

    #[tokio::test]
    async fn test_waiting_worker_activates_on_message() {
        let mut worker = setup_worker(false).await;
        worker.install().await.unwrap();
        assert_eq!(worker.lifecycle().state(), WorkerState::Waiting);
        assert!(!worker.lifecycle().is_controlling());

        // 知らないメッセージは無視
        assert!(!worker.handle_message(r#"{"type":"RELOAD"}"#).await.unwrap());
        assert_eq!(worker.lifecycle().state(), WorkerState::Waiting);

        assert!(worker.handle_message(r#"{"type":"SKIP_WAITING"}"#).await.unwrap());
        assert_eq!(worker.lifecycle().state(), WorkerState::Active);
        assert!(worker.lifecycle().is_controlling());

        // 有効化済みなら何もしない
        assert!(!worker.handle_message(r#"{"type":"SKIP_WAITING"}"#).await.unwrap());
    }

    #[tokio::test]
    async fn test_install_twice_is_rejected() {
        let mut worker = setup_worker(true).await;
        worker.install().await.unwrap();

        assert!(matches!(worker.install().await, Err(AppError::Lifecycle(_))));
        assert_eq!(worker.lifecycle().state(), WorkerState::Active);
    }

    // ========================================================================
    // 3. fetch
    // ========================================================================

    #[tokio::test]
    async fn test_not_controlling_goes_straight_to_network() {
        let mut worker = setup_worker(false).await;
        worker.install().await.unwrap();

        let response = worker.fetch(&Request::get("/style.css")).await.unwrap();
        assert_eq!(response.text(), "body {}");
        assert!(worker.caches().match_any("/style.css").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_first_serves_stored_copy_offline() {
        let mut worker = setup_worker(true).await;
        worker.install().await.unwrap();

        let first = worker.fetch(&Request::get("/style.css")).await.unwrap();
        assert_eq!(first.text(), "body {}");

        worker.network().go_offline();
        let calls = worker.network().calls();

        let second = worker.fetch(&Request::get("https://example.org/style.css?v=2")).await.unwrap();
        assert_eq!(second.text(), "body {}");
        assert_eq!(worker.network().calls(), calls);
    }

    #[tokio::test]
    async fn test_data_files_are_never_cached() {
        let mut worker = setup_worker(true).await;
        worker.install().await.unwrap();
        let before = worker.caches().entry_count("mep-v1").await.unwrap();

        let response = worker.fetch(&Request::get("/menu-nido.txt")).await.unwrap();
        assert_eq!(response.text(), "1|1|Pasta|Pollo|Mela");
        assert_eq!(worker.caches().entry_count("mep-v1").await.unwrap(), before);

        // 変更はすぐに反映される
        worker
            .network()
            .serve("/menu-nido.txt", Response::ok("text/plain", "1|1|Riso|Uova|Pera"));
        let response = worker.fetch(&Request::get("/menu-nido.txt")).await.unwrap();
        assert_eq!(response.text(), "1|1|Riso|Uova|Pera");

        // オフラインでも代替文書にはならない
        worker.network().go_offline();
        assert!(matches!(
            worker.fetch(&Request::get("/menu-nido.txt")).await,
            Err(FetchError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_entry_document_is_always_fetched() {
        let mut worker = setup_worker(true).await;
        worker.install().await.unwrap();

        worker
            .network()
            .serve("/index.html", Response::ok("text/html", "<html>v2</html>"));
        let response = worker.fetch(&Request::get("./index.html")).await.unwrap();
        assert_eq!(response.text(), "<html>v2</html>");
    }

    #[tokio::test]
    async fn test_offline_miss_falls_back_to_entry_document() {
        let mut worker = setup_worker(true).await;
        worker.install().await.unwrap();
        worker.network().go_offline();

        let response = worker.fetch(&Request::get("/app.js")).await.unwrap();
        assert_eq!(response.text(), "<html>home</html>");
    }

    #[tokio::test]
    async fn test_offline_miss_without_entry_document_fails() {
        let caches = CacheRepository::connect("sqlite::memory:").await.unwrap();
        let mut config = config(true);
        config.precache.clear();
        let mut worker = OfflineWorker::new(network(), caches, &config);
        worker.install().await.unwrap();
        worker.network().go_offline();

        assert!(worker.fetch(&Request::get("/app.js")).await.is_err());
    }

    #[tokio::test]
    async fn test_only_basic_200_responses_are_stored() {
        let mut worker = setup_worker(true).await;
        worker.install().await.unwrap();

        let mut opaque = Response::ok("image/png", vec![0u8; 4]);
        opaque.kind = ResponseKind::Opaque;
        worker.network().serve("/cdn/logo.png", opaque);

        let response = worker.fetch(&Request::get("/cdn/logo.png")).await.unwrap();
        assert_eq!(response.kind, ResponseKind::Opaque);
        assert!(worker.caches().match_any("/cdn/logo.png").await.unwrap().is_none());

        let missing = worker.fetch(&Request::get("/nope.js")).await.unwrap();
        assert_eq!(missing.status, 404);
        assert!(worker.caches().match_any("/nope.js").await.unwrap().is_none());
    }
}
