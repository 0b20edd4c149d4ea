use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// 文章分类
///
/// 分类集合在应用层固定，存储层只保存文本。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Sports,
    Political,
    Programming,
}

impl Category {
    /// 所有可选分类，顺序即后台表单和首页的展示顺序
    pub const ALL: [Category; 4] = [
        Category::Technology,
        Category::Sports,
        Category::Political,
        Category::Programming,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Sports => "Sports",
            Category::Political => "Political",
            Category::Programming => "Programming",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| Error::validation(format!("Unknown category: {}", s)))
    }
}

/// 新闻文章
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Category,
    /// 上传图片的文件名
    pub image: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    pub views: i64,
    pub author: String,
}

/// 待写入的新文章，`id` 由存储层生成
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub image: Option<String>,
    pub author: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

impl NewArticle {
    /// 构造一篇新文章，创建时间与更新时间相同，浏览量为 0
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: Category,
        author: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category,
            image: None,
            author: author.into(),
            views: 0,
            created_at,
        }
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    pub fn with_views(mut self, views: i64) -> Self {
        self.views = views.max(0);
        self
    }
}

/// 编辑文章时的变更集
///
/// `image` 为 `None` 表示保留原图。
#[derive(Debug, Clone)]
pub struct ArticleChanges {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub image: Option<String>,
    pub updated_at: DateTime<Utc>,
}
