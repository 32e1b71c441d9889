use crate::db::LedgerStore;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{NewUser, User};
use std::sync::Arc;

/// 注册与登录
pub struct AccountService {
    store: Arc<dyn LedgerStore>,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(store: Arc<dyn LedgerStore>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    pub async fn register(
        &self,
        name: &str,
        surname: &str,
        username: &str,
        password: &str,
    ) -> LedgerResult<User> {
        for (field, value) in [
            ("name", name),
            ("surname", surname),
            ("username", username),
            ("password", password),
        ] {
            if value.trim().is_empty() {
                return Err(LedgerError::validation(format!("{} is required", field)));
            }
        }

        let password_hash = hash_password(password.to_string(), self.bcrypt_cost).await?;
        let user = self
            .store
            .create_user(NewUser {
                name: name.trim().to_string(),
                surname: surname.trim().to_string(),
                username: username.trim().to_string(),
                password_hash,
            })
            .await?;

        tracing::info!("User registered: {} (id {})", user.username, user.user_id);
        Ok(user)
    }

    /// 用户不存在与密码错误返回同一个错误
    pub async fn login(&self, username: &str, password: &str) -> LedgerResult<User> {
        let Some(user) = self.store.find_user_by_username(username.trim()).await? else {
            tracing::info!("Login rejected: no user '{}'", username);
            return Err(LedgerError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            tracing::info!("Login rejected: wrong password for '{}'", username);
            return Err(LedgerError::InvalidCredentials);
        }

        tracing::info!("Login successful: {} (id {})", user.username, user.user_id);
        Ok(user)
    }
}

// bcrypt 是 CPU 密集型，放到阻塞线程池
async fn hash_password(password: String, cost: u32) -> LedgerResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| LedgerError::Hashing(e.to_string()))?
        .map_err(|e| LedgerError::Hashing(e.to_string()))
}

async fn verify_password(password: String, hash: String) -> LedgerResult<bool> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| LedgerError::Hashing(e.to_string()))?;
    // 库中哈希格式损坏按校验失败处理
    Ok(verified.unwrap_or(false))
}
