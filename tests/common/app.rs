use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use learning_insights::config::{Config, InsightsEnvConfig, WorkerConfig};
use learning_insights::constants::DEFAULT_CACHE_TTL_SECS;
use learning_insights::routes::build_router;
use learning_insights::state::AppState;
use learning_insights::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn store(&self) -> &Store {
        self.state.store()
    }
}

async fn spawn_with_topic_samples(min_topic_samples: usize) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("insights-test.sled");

    // 直接构造 Config，避免 set_var 造成多线程测试环境变量竞态
    let config = Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path: sled_path.to_string_lossy().to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        worker: WorkerConfig {
            is_leader: false,
            enable_insights_refresh: false,
        },
        insights: InsightsEnvConfig {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            min_topic_samples,
        },
    };

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(store, &config, shutdown_tx);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_with_topic_samples(1).await
}

pub async fn spawn_test_app_with_topic_samples(min_topic_samples: usize) -> TestApp {
    spawn_with_topic_samples(min_topic_samples).await
}
