use super::dto::{
    DailySummaryRequest, DailySummaryResponse, DamageRequest, LoginRequest, LoginResponse,
    NotificationRequest, ProfileUrlRequest, RegisterRequest, RegisterResponse, RevenueRequest,
    SavedResponse, StockRequest,
};
use super::extract::{AppJson, AppPath};
use super::AppState;
use crate::error::{LedgerError, LedgerResult};
use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 注册
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> LedgerResult<Response> {
    let (Some(name), Some(surname), Some(username), Some(password)) =
        (req.name, req.surname, req.username, req.password)
    else {
        return Err(LedgerError::validation("Missing required fields"));
    };

    let user = state
        .accounts
        .register(&name, &surname, &username, &password)
        .await?;

    let response = RegisterResponse {
        message: "User registered".to_string(),
        user_id: user.user_id,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// 登录
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> LedgerResult<Json<LoginResponse>> {
    let (Some(username), Some(password)) = (req.username, req.password) else {
        return Err(LedgerError::InvalidCredentials);
    };

    let user = state.accounts.login(&username, &password).await?;
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user_id: user.user_id,
        username: user.username,
    }))
}

/// 保存营业额
pub async fn record_revenue(
    State(state): State<AppState>,
    AppJson(req): AppJson<RevenueRequest>,
) -> LedgerResult<Response> {
    let input = req.validate()?;
    let date = state.clock.resolve(input.date);
    let entry = state
        .ledger
        .record_revenue(input.user_id, input.till, input.expenditure, input.net_cash, date)
        .await?;

    let response = SavedResponse {
        message: "Revenue saved".to_string(),
        data: entry,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// 生成当日汇总 (已存在则保持不变)
pub async fn daily_summary(
    State(state): State<AppState>,
    AppJson(req): AppJson<DailySummaryRequest>,
) -> Response {
    let (user_id, net_cash, date) = match req.validate() {
        Ok(v) => v,
        Err(e) => return e.into_response(),
    };
    let date = state.clock.resolve(date);

    match state
        .summaries
        .compute_and_store_summary(user_id, date, net_cash)
        .await
    {
        Ok(outcome) => {
            let created = outcome.is_created();
            let message = if created {
                "Daily summary saved successfully."
            } else {
                "Daily summary already recorded for this date."
            };
            let response = DailySummaryResponse {
                message: message.to_string(),
                created: Some(created),
                summary: outcome.into_summary(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::warn!("Daily summary for user {} on {} failed: {}", user_id, date, e);
            e.into_response()
        }
    }
}

/// 重新计算并覆盖当日汇总
pub async fn recompute_daily_summary(
    State(state): State<AppState>,
    AppJson(req): AppJson<DailySummaryRequest>,
) -> LedgerResult<Response> {
    let (user_id, net_cash, date) = req.validate()?;
    let date = state.clock.resolve(date);
    let summary = state
        .summaries
        .recompute_summary(user_id, date, net_cash)
        .await?;

    let response = DailySummaryResponse {
        message: "Daily summary recomputed.".to_string(),
        created: None,
        summary,
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// 保存进货
pub async fn record_stock(
    State(state): State<AppState>,
    AppJson(req): AppJson<StockRequest>,
) -> LedgerResult<Response> {
    let (user_id, category, total_stock, date) = req.validate()?;
    let date = state.clock.resolve(date);
    let entry = state
        .ledger
        .record_stock(user_id, category, total_stock, date)
        .await?;

    let response = SavedResponse {
        message: "Stock saved successfully".to_string(),
        data: entry,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// 保存损耗
pub async fn record_damage(
    State(state): State<AppState>,
    AppJson(req): AppJson<DamageRequest>,
) -> LedgerResult<Response> {
    let (user_id, total_damages, date) = req.validate()?;
    let date = state.clock.resolve(date);
    let entry = state
        .ledger
        .record_damage(user_id, total_damages, date)
        .await?;

    let response = SavedResponse {
        message: "Damage recorded".to_string(),
        data: entry,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// 查询用户的每日汇总
pub async fn list_summaries(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i64>,
) -> LedgerResult<Response> {
    let summaries = state.ledger.list_summaries(user_id).await?;
    Ok(Json(summaries).into_response())
}

/// 导出每日汇总 CSV
pub async fn export_summaries(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i64>,
) -> LedgerResult<Response> {
    let body = state.ledger.export_summaries_csv(user_id).await?;
    let disposition = format!("attachment; filename=\"daily_summary_{}.csv\"", user_id);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// 保存通知
pub async fn save_notification(
    State(state): State<AppState>,
    AppJson(req): AppJson<NotificationRequest>,
) -> LedgerResult<Response> {
    let (Some(user_id), Some(message)) = (req.user_id, req.message) else {
        return Err(LedgerError::validation("Missing userId or message"));
    };
    let notification = state.ledger.save_notification(user_id, &message).await?;
    Ok((StatusCode::CREATED, Json(notification)).into_response())
}

/// 查询通知
pub async fn list_notifications(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i64>,
) -> LedgerResult<Response> {
    let notifications = state.ledger.list_notifications(user_id).await?;
    Ok(Json(notifications).into_response())
}

/// 用户资料
pub async fn user_info(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i64>,
) -> LedgerResult<Response> {
    let user = state.ledger.user_profile(user_id).await?;
    Ok(Json(user).into_response())
}

/// 更新头像地址
pub async fn update_profile_url(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<i64>,
    AppJson(req): AppJson<ProfileUrlRequest>,
) -> LedgerResult<Response> {
    let Some(profile_url) = req.profile_url else {
        return Err(LedgerError::validation("Missing profileUrl"));
    };
    let user = state.ledger.update_profile_url(user_id, &profile_url).await?;
    Ok(Json(user).into_response())
}
