use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 用户表 (users)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub surname: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub profile_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 待写入的新用户 (密码已哈希)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub username: String,
    pub password_hash: String,
}
