use std::{fmt, path::PathBuf, str::FromStr};

use serde::Deserialize;

use crate::error::{Error, Result};

/// 默认上传大小上限 16 MiB
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 16 * 1024 * 1024;
const DEFAULT_UPLOAD_DIR: &str = "static/uploads";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const MIN_SECRET_LEN: usize = 16;

/// 配置文件内容，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    database_url: Option<String>,
    secret_key: Option<String>,
    upload_dir: Option<PathBuf>,
    max_upload_size: Option<usize>,
    bind_addr: Option<String>,
    session_ttl_hours: Option<i64>,
}

/// 运行配置
///
/// 加载顺序：默认值 → `NEWSDESK_CONFIG` 指向的 TOML 文件 → 环境变量。
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub secret_key: String,
    pub upload_dir: PathBuf,
    pub max_upload_size: usize,
    pub bind_addr: String,
    pub session_ttl_hours: i64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("secret_key", &"<redacted>")
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_size", &self.max_upload_size)
            .field("bind_addr", &self.bind_addr)
            .field("session_ttl_hours", &self.session_ttl_hours)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// 从环境变量（以及可选的配置文件）加载
    pub fn from_env() -> Result<Config> {
        let file = match std::env::var("NEWSDESK_CONFIG") {
            Ok(path) => Some(std::fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("failed to read config file {path}: {e}"))
            })?),
            Err(_) => None,
        };
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// 由配置文件内容和环境变量查询函数组装配置
    pub fn from_sources(
        file: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Config> {
        let file: FileConfig = match file {
            Some(content) => toml::from_str(content)
                .map_err(|e| Error::Config(format!("invalid config file: {}", e.message())))?,
            None => FileConfig::default(),
        };

        let database_url = env("DATABASE_URL")
            .or(file.database_url)
            .ok_or_else(|| Error::Config("`DATABASE_URL` not set".to_string()))?;

        let secret_key = env("SECRET_KEY")
            .or(file.secret_key)
            .ok_or_else(|| Error::Config("`SECRET_KEY` not set".to_string()))?;
        if secret_key.len() < MIN_SECRET_LEN {
            return Err(Error::Config(format!(
                "`SECRET_KEY` must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        let upload_dir = env("UPLOAD_DIR")
            .map(PathBuf::from)
            .or(file.upload_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));

        let max_upload_size = parse_env(&env, "MAX_UPLOAD_SIZE")?
            .or(file.max_upload_size)
            .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE);

        let bind_addr = env("BIND_ADDR")
            .or(file.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let session_ttl_hours = parse_env(&env, "SESSION_TTL_HOURS")?
            .or(file.session_ttl_hours)
            .unwrap_or(DEFAULT_SESSION_TTL_HOURS);
        if session_ttl_hours <= 0 {
            return Err(Error::Config("`SESSION_TTL_HOURS` must be positive".to_string()));
        }

        Ok(Config {
            database_url,
            secret_key,
            upload_dir,
            max_upload_size,
            bind_addr,
            session_ttl_hours,
        })
    }
}

fn parse_env<T: FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    env(key)
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| Error::Config(format!("`{key}` is not a valid number: {v}")))
        })
        .transpose()
}
