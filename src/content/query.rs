use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::Article;

/// 文章过滤条件，各条件之间为 AND 关系
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    /// 按分类精确匹配
    pub category: Option<String>,
    /// 排除指定文章
    pub exclude: Option<Uuid>,
    /// 标题或正文包含该文本（忽略大小写）
    pub text: Option<String>,
    /// 只保留带图片的文章
    pub with_image: bool,
    /// 只保留在此时间之后（含）创建的文章
    pub created_since: Option<DateTime<Utc>>,
}

impl ArticleFilter {
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn exclude(mut self, id: Uuid) -> Self {
        self.exclude = Some(id);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_image(mut self) -> Self {
        self.with_image = true;
        self
    }

    pub fn created_since(mut self, since: DateTime<Utc>) -> Self {
        self.created_since = Some(since);
        self
    }

    /// 在内存中判断文章是否满足条件
    ///
    /// 与 SQL 实现保持相同语义。
    pub fn matches(&self, article: &Article) -> bool {
        if let Some(category) = &self.category {
            if article.category.as_str() != category {
                return false;
            }
        }
        if self.exclude == Some(article.id) {
            return false;
        }
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            if !article.title.to_lowercase().contains(&needle)
                && !article.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if self.with_image && article.image.is_none() {
            return false;
        }
        if let Some(since) = self.created_since {
            if article.date_created < since {
                return false;
            }
        }
        true
    }
}

/// 排序字段，均为降序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Created,
    Updated,
    Views,
}

/// 文章查询：过滤、排序、跳过与截断
#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
    pub filter: ArticleFilter,
    pub sort: SortKey,
    pub skip: i64,
    pub limit: Option<i64>,
}

impl ArticleQuery {
    pub fn newest() -> Self {
        Self::default()
    }

    pub fn sorted_by(sort: SortKey) -> Self {
        Self {
            sort,
            ..Default::default()
        }
    }

    pub fn filter(mut self, filter: ArticleFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn skip(mut self, skip: i64) -> Self {
        self.skip = skip.max(0);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit.max(0));
        self
    }
}

/// 分类统计
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CategoryStat {
    pub category: String,
    pub count: i64,
    pub total_views: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Category;

    fn article(title: &str, content: &str, image: Option<&str>) -> Article {
        let now = Utc::now();
        Article {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            category: Category::Technology,
            image: image.map(Into::into),
            date_created: now,
            date_updated: now,
            views: 0,
            author: "Admin".into(),
        }
    }

    #[test]
    fn test_text_filter_is_case_insensitive() {
        let a = article("New Breakthrough in Artificial Intelligence", "a new AI model", None);
        assert!(ArticleFilter::default().text("ai").matches(&a));
        assert!(ArticleFilter::default().text("ARTIFICIAL").matches(&a));
        assert!(!ArticleFilter::default().text("football").matches(&a));
    }

    #[test]
    fn test_filter_combination() {
        let a = article("t", "c", Some("x.png"));
        assert!(ArticleFilter::default().with_image().matches(&a));
        assert!(!ArticleFilter::default().exclude(a.id).matches(&a));
        assert!(!ArticleFilter::default().category("Sports").matches(&a));
        assert!(
            ArticleFilter::default()
                .category("Technology")
                .with_image()
                .matches(&a)
        );
    }
}
