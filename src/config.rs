use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub business: BusinessConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 单个请求的处理时限 (秒)，超时返回 408
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://...`，或 `memory` 使用内存存储
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessConfig {
    /// 营业日所在时区相对 UTC 的偏移 (分钟)
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url == "memory"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                request_timeout_secs: 30,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/store_ledger".to_string(),
                max_connections: 20,
                acquire_timeout_secs: 10,
            },
            business: BusinessConfig {
                utc_offset_minutes: 0,
            },
            auth: AuthConfig {
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 优先级 (低 -> 高): 内置默认值, `config/default.toml`, `APP_CONFIG` 指向的文件,
    /// `APP__SECTION__KEY` 环境变量, 以及 `DATABASE_URL` / `SERVER_HOST` / `SERVER_PORT`。
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::defaults_builder()?
            .add_source(File::with_name("config/default").required(false));

        if let Ok(path) = std::env::var("APP_CONFIG") {
            builder = builder.add_source(File::with_name(&path).required(true));
        }

        builder
            .add_source(Environment::with_prefix("APP").separator("__").try_parsing(true))
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option(
                "server.port",
                std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<i64>().ok()),
            )?
            .build()?
            .try_deserialize()
    }

    fn defaults_builder(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let d = Self::default();
        Config::builder()
            .set_default("server.host", d.server.host)?
            .set_default("server.port", i64::from(d.server.port))?
            .set_default("server.request_timeout_secs", d.server.request_timeout_secs as i64)?
            .set_default("database.url", d.database.url)?
            .set_default("database.max_connections", i64::from(d.database.max_connections))?
            .set_default("database.acquire_timeout_secs", d.database.acquire_timeout_secs as i64)?
            .set_default("business.utc_offset_minutes", i64::from(d.business.utc_offset_minutes))?
            .set_default("auth.bcrypt_cost", i64::from(d.auth.bcrypt_cost))
    }
}
