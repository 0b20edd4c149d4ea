use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{
    content::{Article, ArticleFilter, ArticleQuery, CategoryStat, SortKey},
    error::Result,
    storage::NewsStore,
};

/// 仪表盘列表长度
const DASHBOARD_LIST_LIMIT: i64 = 5;

/// 后台仪表盘指标
///
/// 每次请求重新计算，不做缓存。
#[derive(Debug, Default, Serialize)]
pub struct Dashboard {
    pub total_articles: i64,
    pub total_views: i64,
    pub recent_articles: Vec<Article>,
    /// 浏览量最高的文章，浏览量相同的文章之间顺序不确定
    pub popular_articles: Vec<Article>,
    pub category_stats: Vec<CategoryStat>,
    /// 最近 24 小时内 *创建* 的文章的浏览量之和
    pub today_views: i64,
    pub articles_with_images: i64,
    /// 平均浏览量，保留一位小数
    pub average_views: f64,
}

impl Dashboard {
    /// 计算所有指标
    pub async fn compute<S: NewsStore>(store: &S, now: DateTime<Utc>) -> Result<Dashboard> {
        let all = ArticleFilter::default();
        let last_day = ArticleFilter::default().created_since(now - Duration::hours(24));
        let with_images = ArticleFilter::default().with_image();
        let recent = ArticleQuery::newest().limit(DASHBOARD_LIST_LIMIT);
        let popular = ArticleQuery::sorted_by(SortKey::Views).limit(DASHBOARD_LIST_LIMIT);

        let (
            total_articles,
            total_views,
            recent_articles,
            popular_articles,
            category_stats,
            today_views,
            articles_with_images,
        ) = tokio::try_join!(
            store.count_articles(&all),
            store.sum_views(&all),
            store.query_articles(&recent),
            store.query_articles(&popular),
            store.category_stats(),
            store.sum_views(&last_day),
            store.count_articles(&with_images),
        )?;

        Ok(Dashboard {
            total_articles,
            total_views,
            recent_articles,
            popular_articles,
            category_stats,
            today_views,
            articles_with_images,
            average_views: average_views(total_views, total_articles),
        })
    }

    /// 计算指标，失败时记录日志并返回全零的仪表盘
    pub async fn load<S: NewsStore>(store: &S) -> Dashboard {
        match Self::compute(store, Utc::now()).await {
            Ok(dashboard) => dashboard,
            Err(e) => {
                tracing::error!(%e, "dashboard analytics failed");
                Dashboard::default()
            }
        }
    }
}

/// 平均浏览量，没有文章时为 0，保留一位小数
pub fn average_views(total_views: i64, total_articles: i64) -> f64 {
    if total_articles <= 0 {
        return 0.0;
    }
    let avg = total_views as f64 / total_articles as f64;
    (avg * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{
        content::{ArticleChanges, Category, NewArticle},
        error::Error,
        storage::MemoryStore,
    };

    #[test]
    fn test_average_views() {
        assert_eq!(average_views(0, 0), 0.0);
        assert_eq!(average_views(562, 4), 140.5);
        assert_eq!(average_views(10, 3), 3.3);
    }

    async fn seeded(now: DateTime<Utc>) -> MemoryStore {
        let store = MemoryStore::new();
        let samples = [
            ("AI", Category::Technology, 150, now - Duration::hours(1), None),
            ("Team", Category::Sports, 89, now - Duration::hours(48), Some("x.png")),
            ("Lang", Category::Programming, 203, now - Duration::hours(30), None),
            ("Summit", Category::Political, 120, now - Duration::hours(2), None),
            ("Chip", Category::Technology, 0, now - Duration::hours(72), None),
        ];
        for (title, category, views, at, image) in samples {
            store
                .insert_article(
                    NewArticle::new(title, "c", category, "Admin", at)
                        .with_views(views)
                        .with_image(image.map(Into::into)),
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_dashboard_metrics() {
        let now = Utc::now();
        let store = seeded(now).await;
        let d = Dashboard::compute(&store, now).await.unwrap();

        assert_eq!(d.total_articles, 5);
        assert_eq!(d.total_views, 562);
        assert_eq!(d.average_views, 112.4);
        assert_eq!(d.articles_with_images, 1);
        // 只统计最近 24 小时内创建的文章
        assert_eq!(d.today_views, 150 + 120);

        let popular: Vec<_> = d.popular_articles.iter().map(|a| a.views).collect();
        assert_eq!(popular, vec![203, 150, 120, 89, 0]);

        assert_eq!(d.recent_articles[0].title, "AI");
        assert_eq!(d.recent_articles.len(), 5);

        assert_eq!(d.category_stats[0].category, "Technology");
        assert_eq!(d.category_stats[0].count, 2);
        assert_eq!(d.category_stats[0].total_views, 150);
    }

    #[tokio::test]
    async fn test_dashboard_empty() {
        let d = Dashboard::compute(&MemoryStore::new(), Utc::now()).await.unwrap();
        assert_eq!(d.total_articles, 0);
        assert_eq!(d.total_views, 0);
        assert_eq!(d.average_views, 0.0);
        assert!(d.category_stats.is_empty());
    }

    /// 所有操作都失败的存储
    struct BrokenStore;

    impl NewsStore for BrokenStore {
        async fn insert_article(&self, _: NewArticle) -> Result<Article> {
            Err(Error::Corrupt("broken".into()))
        }
        async fn find_article(&self, _: Uuid) -> Result<Option<Article>> {
            Err(Error::Corrupt("broken".into()))
        }
        async fn update_article(&self, _: Uuid, _: &ArticleChanges) -> Result<Option<Article>> {
            Err(Error::Corrupt("broken".into()))
        }
        async fn delete_article(&self, _: Uuid) -> Result<Option<Article>> {
            Err(Error::Corrupt("broken".into()))
        }
        async fn increment_views(&self, _: Uuid) -> Result<Option<Article>> {
            Err(Error::Corrupt("broken".into()))
        }
        async fn query_articles(&self, _: &ArticleQuery) -> Result<Vec<Article>> {
            Err(Error::Corrupt("broken".into()))
        }
        async fn count_articles(&self, _: &ArticleFilter) -> Result<i64> {
            Ok(7)
        }
        async fn sum_views(&self, _: &ArticleFilter) -> Result<i64> {
            Ok(70)
        }
        async fn category_stats(&self) -> Result<Vec<CategoryStat>> {
            Err(Error::Corrupt("broken".into()))
        }
        async fn distinct_categories(&self) -> Result<Vec<String>> {
            Err(Error::Corrupt("broken".into()))
        }
    }

    #[tokio::test]
    async fn test_dashboard_degrades_to_zero() {
        let d = Dashboard::load(&BrokenStore).await;
        assert_eq!(d.total_articles, 0);
        assert_eq!(d.total_views, 0);
        assert_eq!(d.average_views, 0.0);
        assert!(d.recent_articles.is_empty());
        assert!(d.popular_articles.is_empty());
    }
}
