use chrono::Utc;

use crate::{
    accounts::{AccountState, AdminAccounts},
    content::{Category, NewArticle},
    error::Result,
    storage::{AdminStore, NewsStore},
};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@newsportal.com";

/// 示例文章：标题、正文、分类、浏览量
const SAMPLE_ARTICLES: [(&str, &str, Category, i64); 4] = [
    (
        "New Breakthrough in Artificial Intelligence",
        "Researchers have developed a new AI model that can understand and generate human-like text with unprecedented accuracy. This breakthrough could revolutionize how we interact with technology.",
        Category::Technology,
        150,
    ),
    (
        "Local Team Wins Championship",
        "In an exciting final match, our local team secured the championship title with a stunning last-minute goal. Thousands of fans celebrated throughout the city.",
        Category::Sports,
        89,
    ),
    (
        "New Programming Language Released",
        "A team of developers has released a new programming language designed for web development. Early adopters report significant productivity improvements.",
        Category::Programming,
        203,
    ),
    (
        "Political Summit Addresses Climate Change",
        "World leaders gathered at the global political summit to discuss urgent climate change measures and international cooperation strategies.",
        Category::Political,
        120,
    ),
];

/// 没有管理员时创建默认管理员，返回是否新建
pub async fn ensure_default_admin<S: AdminStore>(store: &S) -> Result<bool> {
    let accounts = AdminAccounts::new(store);
    if accounts.state().await? == AccountState::AdminExists {
        return Ok(false);
    }

    let created = accounts
        .register(
            DEFAULT_ADMIN_USERNAME,
            DEFAULT_ADMIN_EMAIL,
            DEFAULT_ADMIN_PASSWORD.to_string(),
        )
        .await?
        .is_some();

    if created {
        tracing::warn!(
            username = DEFAULT_ADMIN_USERNAME,
            password = DEFAULT_ADMIN_PASSWORD,
            "default admin user created, change the password"
        );
    }
    Ok(created)
}

/// 没有文章时写入示例文章，返回写入数量
pub async fn seed_articles<S: NewsStore>(store: &S) -> Result<usize> {
    if store.count_articles(&Default::default()).await? > 0 {
        return Ok(0);
    }

    let now = Utc::now();
    for (title, content, category, views) in SAMPLE_ARTICLES {
        store
            .insert_article(NewArticle::new(title, content, category, "Admin", now).with_views(views))
            .await?;
    }

    tracing::info!(count = SAMPLE_ARTICLES.len(), "sample news articles created");
    Ok(SAMPLE_ARTICLES.len())
}
