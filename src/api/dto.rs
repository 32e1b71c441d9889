use crate::error::{LedgerError, LedgerResult};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// 客户端把 userId 存在本地存储里，可能以字符串形式发送
fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Num(i64),
        Str(String),
    }

    match Option::<IdRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IdRepr::Num(n)) => Ok(Some(n)),
        Some(IdRepr::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(IdRepr::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid userId '{}'", s))),
    }
}

fn required<T>(value: Option<T>, field: &str) -> LedgerResult<T> {
    value.ok_or_else(|| LedgerError::validation(format!("Missing {}", field)))
}

/// 注册
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
}

/// 登录
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// 登录响应 (客户端按 `userID` 字段读取)
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub username: String,
}

/// 每日汇总请求体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummaryRequest {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub net_cash: Option<BigDecimal>,
    /// 营业日期，缺省为今天
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl DailySummaryRequest {
    /// 校验必填字段，返回 (user_id, net_cash, date)
    pub fn validate(self) -> LedgerResult<(i64, BigDecimal, Option<NaiveDate>)> {
        match (self.user_id, self.net_cash) {
            (Some(user_id), Some(net_cash)) => Ok((user_id, net_cash, self.date)),
            _ => Err(LedgerError::validation("Missing userId or netCash")),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DailySummaryResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    pub summary: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueRequest {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub till: Option<BigDecimal>,
    #[serde(default)]
    pub expenditure: Option<BigDecimal>,
    #[serde(default)]
    pub net_cash: Option<BigDecimal>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

pub struct RevenueInput {
    pub user_id: i64,
    pub till: BigDecimal,
    pub expenditure: BigDecimal,
    pub net_cash: Option<BigDecimal>,
    pub date: Option<NaiveDate>,
}

impl RevenueRequest {
    pub fn validate(self) -> LedgerResult<RevenueInput> {
        Ok(RevenueInput {
            user_id: required(self.user_id, "userId")?,
            till: required(self.till, "till")?,
            expenditure: required(self.expenditure, "expenditure")?,
            net_cash: self.net_cash,
            date: self.date,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRequest {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub total_stock: Option<BigDecimal>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl StockRequest {
    pub fn validate(self) -> LedgerResult<(i64, String, BigDecimal, Option<NaiveDate>)> {
        Ok((
            required(self.user_id, "userId")?,
            required(self.category, "category")?,
            required(self.total_stock, "totalStock")?,
            self.date,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageRequest {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub total_damages: Option<BigDecimal>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl DamageRequest {
    pub fn validate(self) -> LedgerResult<(i64, BigDecimal, Option<NaiveDate>)> {
        Ok((
            required(self.user_id, "userId")?,
            required(self.total_damages, "totalDamages")?,
            self.date,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUrlRequest {
    #[serde(default)]
    pub profile_url: Option<String>,
}

/// 通用的 `{message, data}` 响应
#[derive(Debug, Serialize)]
pub struct SavedResponse<T> {
    pub message: String,
    pub data: T,
}
