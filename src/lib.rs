pub mod accounts;
pub mod analytics;
pub mod api;
pub mod articles;
pub mod bootstrap;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod session;
pub mod state;
pub mod storage;
pub mod uploads;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use config::Config;
use error::Result;
use state::AppState;

/// 启动服务
///
/// 初始化日志，连接数据库并建表，写入默认管理员和示例文章，最后启动 HTTP 服务。
pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("NEWSDESK_LOG"))
        .init();

    let config = Config::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let db = storage::new_db_pool(&config.database_url).await?;
    storage::migrate(&db).await?;

    bootstrap::ensure_default_admin(&db).await?;
    bootstrap::seed_articles(&db).await?;

    let app = AppState::from_config(db, &config);
    app.images().ensure_dir().await?;

    api::run_server(app, &config.bind_addr).await
}
