use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    content::{AdminUser, Article},
    error::Error,
};

/// `news` 表的行
///
/// 分类以文本保存，转换为 [`Article`] 时校验。
#[derive(Debug, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    pub views: i64,
    pub author: String,
}

impl TryFrom<ArticleRow> for Article {
    type Error = Error;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse()
            .map_err(|_| Error::Corrupt(format!("news {} has category {:?}", row.id, row.category)))?;

        Ok(Article {
            id: row.id,
            title: row.title,
            content: row.content,
            category,
            image: row.image,
            date_created: row.date_created,
            date_updated: row.date_updated,
            views: row.views,
            author: row.author,
        })
    }
}

/// `admin_users` 表的行
#[derive(sqlx::FromRow)]
pub struct AdminRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub date_created: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl From<AdminRow> for AdminUser {
    fn from(row: AdminRow) -> Self {
        AdminUser {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password,
            date_created: row.date_created,
            last_login: row.last_login,
            is_active: row.is_active,
        }
    }
}
