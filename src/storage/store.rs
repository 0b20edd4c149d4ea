use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    content::{
        AdminUser, Article, ArticleChanges, ArticleFilter, ArticleQuery, CategoryStat,
        ContactMessage, NewAdmin, NewArticle,
    },
    error::Result,
};

/// `news` 集合的读写接口
///
/// 查询、分页与聚合都交给存储层完成，调用方只描述条件。
pub trait NewsStore: Send + Sync {
    /// 插入文章，返回带有存储层生成 `id` 的 [`Article`]
    fn insert_article(&self, article: NewArticle) -> impl Future<Output = Result<Article>> + Send;

    /// 按 id 查询文章
    fn find_article(&self, id: Uuid) -> impl Future<Output = Result<Option<Article>>> + Send;

    /// 更新文章的文本字段与更新时间
    ///
    /// `changes.image` 为 `Some` 时才替换图片。文章不存在时返回 `None`。
    fn update_article(
        &self,
        id: Uuid,
        changes: &ArticleChanges,
    ) -> impl Future<Output = Result<Option<Article>>> + Send;

    /// 删除文章，返回被删除的文章
    fn delete_article(&self, id: Uuid) -> impl Future<Output = Result<Option<Article>>> + Send;

    /// 原子地将浏览量加一，返回加一之后的文章
    fn increment_views(&self, id: Uuid) -> impl Future<Output = Result<Option<Article>>> + Send;

    /// 按 [`ArticleQuery`] 查询文章列表
    fn query_articles(
        &self,
        query: &ArticleQuery,
    ) -> impl Future<Output = Result<Vec<Article>>> + Send;

    /// 统计满足条件的文章数量
    fn count_articles(&self, filter: &ArticleFilter) -> impl Future<Output = Result<i64>> + Send;

    /// 对满足条件的文章求浏览量之和，没有文章时为 0
    fn sum_views(&self, filter: &ArticleFilter) -> impl Future<Output = Result<i64>> + Send;

    /// 按分类分组统计数量与浏览量，按数量降序
    fn category_stats(&self) -> impl Future<Output = Result<Vec<CategoryStat>>> + Send;

    /// 当前存在的分类值，升序
    fn distinct_categories(&self) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// `admin_users` 集合的读写接口
pub trait AdminStore: Send + Sync {
    /// 管理员数量
    fn count_admins(&self) -> impl Future<Output = Result<i64>> + Send;

    /// 仅当集合为空时插入管理员
    ///
    /// 检查与插入是一个原子操作，已存在管理员时返回 `None`。
    fn insert_first_admin(
        &self,
        admin: NewAdmin,
    ) -> impl Future<Output = Result<Option<AdminUser>>> + Send;

    /// 按用户名查询
    fn find_admin_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<AdminUser>>> + Send;

    /// 按 id 查询
    fn find_admin(&self, id: Uuid) -> impl Future<Output = Result<Option<AdminUser>>> + Send;

    /// 记录最近登录时间
    fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> impl Future<Output = Result<()>> + Send;
}

/// `contacts` 集合的写接口
pub trait ContactStore: Send + Sync {
    fn insert_contact(&self, message: &ContactMessage) -> impl Future<Output = Result<()>> + Send;
}

/// 完整的存储后端
pub trait Store: NewsStore + AdminStore + ContactStore + Clone + 'static {}

impl<T> Store for T where T: NewsStore + AdminStore + ContactStore + Clone + 'static {}
