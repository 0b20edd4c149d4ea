use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 后台管理员
///
/// `password_hash` 只保存加盐哈希，不参与序列化，`Debug` 输出中也会被隐藏。
#[derive(Clone)]
pub struct AdminUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub date_created: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl fmt::Debug for AdminUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("date_created", &self.date_created)
            .field("last_login", &self.last_login)
            .field("is_active", &self.is_active)
            .finish()
    }
}

/// 待写入的管理员
#[derive(Clone)]
pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_hash() {
        let admin = AdminUser {
            id: Uuid::new_v4(),
            username: "admin".into(),
            email: "admin@newsportal.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            date_created: Utc::now(),
            last_login: None,
            is_active: true,
        };
        let out = format!("{:?}", admin);
        assert!(!out.contains("argon2id"));
        assert!(out.contains("<redacted>"));
    }
}
