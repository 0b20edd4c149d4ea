use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{AdminStore, ContactStore, NewsStore};
use crate::{
    content::{
        AdminUser, Article, ArticleChanges, ArticleFilter, ArticleQuery, CategoryStat,
        ContactMessage, NewAdmin, NewArticle, SortKey,
    },
    error::Result,
};

#[derive(Default)]
struct Collections {
    news: Vec<Article>,
    admin_users: Vec<AdminUser>,
    contacts: Vec<ContactMessage>,
}

/// 进程内存储
///
/// 与 PostgreSQL 实现语义一致，用于测试和本地运行。克隆后共享同一份数据。
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        // 持锁期间不会 panic，被毒化的锁中数据仍然一致
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 已写入的留言
    pub fn contacts(&self) -> Vec<ContactMessage> {
        self.lock().contacts.clone()
    }
}

fn sort_articles(articles: &mut [Article], sort: SortKey) {
    // 稳定排序，相同键保持插入顺序
    match sort {
        SortKey::Created => articles.sort_by(|a, b| b.date_created.cmp(&a.date_created)),
        SortKey::Updated => articles.sort_by(|a, b| b.date_updated.cmp(&a.date_updated)),
        SortKey::Views => articles.sort_by(|a, b| b.views.cmp(&a.views)),
    }
}

impl NewsStore for MemoryStore {
    async fn insert_article(&self, article: NewArticle) -> Result<Article> {
        let article = Article {
            id: Uuid::new_v4(),
            title: article.title,
            content: article.content,
            category: article.category,
            image: article.image,
            date_created: article.created_at,
            date_updated: article.created_at,
            views: article.views,
            author: article.author,
        };
        self.lock().news.push(article.clone());
        Ok(article)
    }

    async fn find_article(&self, id: Uuid) -> Result<Option<Article>> {
        Ok(self.lock().news.iter().find(|a| a.id == id).cloned())
    }

    async fn update_article(&self, id: Uuid, changes: &ArticleChanges) -> Result<Option<Article>> {
        let mut guard = self.lock();
        let Some(article) = guard.news.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };

        article.title = changes.title.clone();
        article.content = changes.content.clone();
        article.category = changes.category;
        article.date_updated = changes.updated_at.max(article.date_created);
        if let Some(image) = &changes.image {
            article.image = Some(image.clone());
        }
        Ok(Some(article.clone()))
    }

    async fn delete_article(&self, id: Uuid) -> Result<Option<Article>> {
        let mut guard = self.lock();
        let position = guard.news.iter().position(|a| a.id == id);
        Ok(position.map(|pos| guard.news.remove(pos)))
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<Article>> {
        let mut guard = self.lock();
        Ok(guard.news.iter_mut().find(|a| a.id == id).map(|a| {
            a.views += 1;
            a.clone()
        }))
    }

    async fn query_articles(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let mut articles: Vec<Article> = self
            .lock()
            .news
            .iter()
            .filter(|a| query.filter.matches(a))
            .cloned()
            .collect();
        sort_articles(&mut articles, query.sort);

        let skip = usize::try_from(query.skip).unwrap_or(0);
        let limit = query
            .limit
            .map(|l| usize::try_from(l).unwrap_or(0))
            .unwrap_or(usize::MAX);
        Ok(articles.into_iter().skip(skip).take(limit).collect())
    }

    async fn count_articles(&self, filter: &ArticleFilter) -> Result<i64> {
        let count = self.lock().news.iter().filter(|a| filter.matches(a)).count();
        Ok(count as i64)
    }

    async fn sum_views(&self, filter: &ArticleFilter) -> Result<i64> {
        Ok(self
            .lock()
            .news
            .iter()
            .filter(|a| filter.matches(a))
            .map(|a| a.views)
            .sum())
    }

    async fn category_stats(&self) -> Result<Vec<CategoryStat>> {
        let mut stats: Vec<CategoryStat> = Vec::new();
        for article in self.lock().news.iter() {
            match stats
                .iter_mut()
                .find(|s| s.category == article.category.as_str())
            {
                Some(stat) => {
                    stat.count += 1;
                    stat.total_views += article.views;
                }
                None => stats.push(CategoryStat {
                    category: article.category.to_string(),
                    count: 1,
                    total_views: article.views,
                }),
            }
        }
        stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
        Ok(stats)
    }

    async fn distinct_categories(&self) -> Result<Vec<String>> {
        let mut categories: Vec<String> = self
            .lock()
            .news
            .iter()
            .map(|a| a.category.to_string())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }
}

impl AdminStore for MemoryStore {
    async fn count_admins(&self) -> Result<i64> {
        Ok(self.lock().admin_users.len() as i64)
    }

    async fn insert_first_admin(&self, admin: NewAdmin) -> Result<Option<AdminUser>> {
        let mut guard = self.lock();
        if !guard.admin_users.is_empty() {
            return Ok(None);
        }
        let user = AdminUser {
            id: Uuid::new_v4(),
            username: admin.username,
            email: admin.email,
            password_hash: admin.password_hash,
            date_created: admin.created_at,
            last_login: None,
            is_active: true,
        };
        guard.admin_users.push(user.clone());
        Ok(Some(user))
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        Ok(self
            .lock()
            .admin_users
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_admin(&self, id: Uuid) -> Result<Option<AdminUser>> {
        Ok(self.lock().admin_users.iter().find(|a| a.id == id).cloned())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        if let Some(admin) = self.lock().admin_users.iter_mut().find(|a| a.id == id) {
            admin.last_login = Some(at);
        }
        Ok(())
    }
}

impl ContactStore for MemoryStore {
    async fn insert_contact(&self, message: &ContactMessage) -> Result<()> {
        self.lock().contacts.push(message.clone());
        Ok(())
    }
}
