pub mod dto;
pub mod extract;
pub mod handlers;

pub use handlers::*;

use crate::db::LedgerStore;
use crate::error::LedgerError;
use crate::service::{AccountService, BusinessClock, LedgerService, SummaryService};
use axum::{
    error_handling::HandleErrorLayer,
    routing::{get, post},
    BoxError, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub ledger: Arc<LedgerService>,
    pub summaries: Arc<SummaryService>,
    pub clock: BusinessClock,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>, clock: BusinessClock, bcrypt_cost: u32) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(store.clone(), bcrypt_cost)),
            ledger: Arc::new(LedgerService::new(store.clone())),
            summaries: Arc::new(SummaryService::new(store)),
            clock,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    let user_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/revenue", post(record_revenue))
        .route("/daily-summary", post(daily_summary))
        .route("/daily-summary/recompute", post(recompute_daily_summary))
        .route("/stock", post(record_stock))
        .route("/damages", post(record_damage))
        .route("/summary/:user_id", get(list_summaries))
        .route("/summary/:user_id/export", get(export_summaries))
        .route("/saveNotifications", post(save_notification))
        .route("/getNotifications/:user_id", get(list_notifications))
        .route("/getUserInfo/:user_id", get(user_info))
        .route("/profileUrl/:user_id", post(update_profile_url));

    let request_timeout = state.request_timeout;
    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api/users", user_routes);

    with_middleware(app, request_timeout).with_state(state)
}

/// 请求超时，超时转成 408 JSON 响应
fn with_middleware<S>(router: Router<S>, request_timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .timeout(request_timeout),
    )
}

async fn handle_middleware_error(err: BoxError) -> LedgerError {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("Request timed out");
        LedgerError::Timeout
    } else {
        LedgerError::Storage(format!("unhandled middleware error: {}", err))
    }
}
