use chrono::{DateTime, Utc};
use serde::Deserialize;

/// 访客留言，只写入不读取
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(skip)]
    pub date_created: DateTime<Utc>,
}
