use std::sync::Arc;
use std::time::Duration;
use store_ledger::{
    api, create_pool, AppConfig, BusinessClock, LedgerStore, MemoryLedgerStore, PgLedgerStore,
};
use tracing::{info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!(
        "Starting server on {}:{} (business utc offset {} min)",
        config.server.host, config.server.port, config.business.utc_offset_minutes
    );

    // 创建存储
    let store: Arc<dyn LedgerStore> = if config.database.is_memory() {
        warn!("Using in-memory store, data is lost on restart");
        Arc::new(MemoryLedgerStore::new())
    } else {
        let pool = create_pool(&config.database).await?;
        info!("Database pool created");
        let store = PgLedgerStore::new(pool);
        store.migrate().await?;
        info!("Database migrations applied");
        Arc::new(store)
    };

    let state = api::AppState::new(
        store,
        BusinessClock::new(config.business.utc_offset_minutes),
        config.auth.bcrypt_cost,
    )
    .with_request_timeout(Duration::from_secs(config.server.request_timeout_secs));
    let app = api::router(state);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/users/daily-summary            - roll forward today's summary (first write wins)");
    info!("  POST /api/users/daily-summary/recompute  - recompute and overwrite a day's summary");
    info!("  GET  /api/users/summary/:user_id         - list summaries");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
