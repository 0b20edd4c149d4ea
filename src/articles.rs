use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    content::{Article, ArticleChanges, ArticleFilter, ArticleQuery, Category, NewArticle, SortKey},
    error::{Error, Result},
    storage::NewsStore,
    uploads::{ImageStore, Upload},
};

/// 列表页每页文章数
pub const PAGE_SIZE: i64 = 6;
/// 详情页相关文章数
pub const RELATED_LIMIT: i64 = 3;
/// 搜索结果上限
pub const SEARCH_LIMIT: i64 = 10;

/// 解析路径中的文章 id，无法解析时视为文章不存在
pub fn parse_id(id: &str) -> Result<Uuid> {
    id.trim().parse().map_err(|_| Error::NotFound)
}

/// 后台表单提交的文章内容
#[derive(Debug, Clone, Default)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    pub image: Option<Upload>,
}

impl ArticleDraft {
    /// 校验必填字段与分类
    fn validate(&self) -> Result<(String, String, Category)> {
        let title = self.title.trim();
        let content = self.content.trim();
        if title.is_empty() || content.is_empty() || self.category.trim().is_empty() {
            return Err(Error::validation("Title, content and category are required"));
        }
        let category = self.category.parse()?;
        Ok((title.to_string(), content.to_string(), category))
    }

    /// 可接受的上传图片
    ///
    /// 未选择文件时为空；扩展名不在允许列表中的文件被忽略。
    fn accepted_image(&self) -> Option<&Upload> {
        let upload = self.image.as_ref()?;
        if upload.file_name.is_empty() {
            return None;
        }
        if !upload.is_allowed() {
            tracing::warn!(file_name = %upload.file_name, "ignoring upload with disallowed extension");
            return None;
        }
        Some(upload)
    }
}

/// 分页结果
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    fn new(items: Vec<T>, page: i64, per_page: i64, total: i64) -> Self {
        let total_pages = if per_page > 0 {
            total / per_page + i64::from(total % per_page != 0)
        } else {
            0
        };
        Self {
            items,
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// 文章仓储
///
/// 封装 `news` 集合上的增删改查，以及图片文件与文档之间的先后顺序：
/// 先写新图片，再更新文档，最后删除旧图片。
pub struct ArticleRepository<'a, S> {
    store: &'a S,
    images: &'a ImageStore,
}

impl<'a, S: NewsStore> ArticleRepository<'a, S> {
    pub fn new(store: &'a S, images: &'a ImageStore) -> Self {
        Self { store, images }
    }

    /// 创建文章
    pub async fn create(&self, draft: &ArticleDraft, author: &str) -> Result<Article> {
        let (title, content, category) = draft.validate()?;

        let image = match draft.accepted_image() {
            Some(upload) => Some(self.images.save(upload).await?),
            None => None,
        };

        let article = NewArticle::new(title, content, category, author, Utc::now())
            .with_image(image.clone());

        match self.store.insert_article(article).await {
            Ok(article) => {
                tracing::info!(id = %article.id, title = %article.title, "article created");
                Ok(article)
            }
            Err(e) => {
                if let Some(name) = image {
                    self.images.release_quietly(&name).await;
                }
                Err(e)
            }
        }
    }

    /// 编辑文章
    ///
    /// 只有提交了新图片才替换，旧图片在文档更新成功后删除。
    pub async fn update(&self, id: Uuid, draft: &ArticleDraft) -> Result<Article> {
        let existing = self.get_by_id(id).await?;
        let (title, content, category) = draft.validate()?;

        let new_image = match draft.accepted_image() {
            Some(upload) => Some(self.images.save(upload).await?),
            None => None,
        };

        let changes = ArticleChanges {
            title,
            content,
            category,
            image: new_image.clone(),
            updated_at: Utc::now(),
        };

        let updated = match self.store.update_article(id, &changes).await {
            Ok(Some(article)) => article,
            other => {
                if let Some(name) = &new_image {
                    self.images.release_quietly(name).await;
                }
                return Err(other.err().unwrap_or(Error::NotFound));
            }
        };

        if let (Some(_), Some(old)) = (&new_image, &existing.image) {
            self.images.release_quietly(old).await;
        }

        tracing::info!(%id, "article updated");
        Ok(updated)
    }

    /// 删除文章及其图片
    pub async fn delete(&self, id: Uuid) -> Result<Article> {
        let removed = self.store.delete_article(id).await?.ok_or(Error::NotFound)?;
        if let Some(image) = &removed.image {
            self.images.release_quietly(image).await;
        }
        tracing::info!(%id, "article deleted");
        Ok(removed)
    }

    /// 按 id 获取文章，不影响浏览量
    pub async fn get_by_id(&self, id: Uuid) -> Result<Article> {
        self.store.find_article(id).await?.ok_or(Error::NotFound)
    }

    /// 前台阅读文章，每次调用浏览量加一
    pub async fn view(&self, id: Uuid) -> Result<Article> {
        self.store.increment_views(id).await?.ok_or(Error::NotFound)
    }

    /// 最新创建的文章
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Article>> {
        self.store
            .query_articles(&ArticleQuery::newest().limit(limit))
            .await
    }

    /// 最近更新的文章
    pub async fn list_recently_updated(&self, limit: i64) -> Result<Vec<Article>> {
        self.store
            .query_articles(&ArticleQuery::sorted_by(SortKey::Updated).limit(limit))
            .await
    }

    /// 指定分类下最新的文章
    pub async fn list_by_category(&self, category: Category, limit: i64) -> Result<Vec<Article>> {
        self.store
            .query_articles(
                &ArticleQuery::newest()
                    .filter(ArticleFilter::default().category(category.as_str()))
                    .limit(limit),
            )
            .await
    }

    /// 所有文章，最新的在前
    pub async fn list_all(&self) -> Result<Vec<Article>> {
        self.store.query_articles(&ArticleQuery::newest()).await
    }

    /// 按 [`PAGE_SIZE`] 分页
    pub async fn list_paged(&self, category: Option<&str>, page: i64) -> Result<Page<Article>> {
        self.list_paged_with(category, page, PAGE_SIZE).await
    }

    /// 分页查询，页码从 1 开始，小于 1 按 1 处理
    pub async fn list_paged_with(
        &self,
        category: Option<&str>,
        page: i64,
        per_page: i64,
    ) -> Result<Page<Article>> {
        let page = page.max(1);
        let per_page = per_page.max(1);

        let mut filter = ArticleFilter::default();
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            filter = filter.category(category);
        }

        // 页码过大时偏移量溢出，按越过末页处理
        let Some(skip) = (page - 1).checked_mul(per_page) else {
            let total = self.store.count_articles(&filter).await?;
            return Ok(Page::new(Vec::new(), page, per_page, total));
        };

        let query = ArticleQuery::newest()
            .filter(filter.clone())
            .skip(skip)
            .limit(per_page);

        let (items, total) = tokio::try_join!(
            self.store.query_articles(&query),
            self.store.count_articles(&filter)
        )?;

        Ok(Page::new(items, page, per_page, total))
    }

    /// 同分类的其他文章
    pub async fn list_related(
        &self,
        exclude: Uuid,
        category: Category,
        limit: i64,
    ) -> Result<Vec<Article>> {
        self.store
            .query_articles(
                &ArticleQuery::newest()
                    .filter(
                        ArticleFilter::default()
                            .category(category.as_str())
                            .exclude(exclude),
                    )
                    .limit(limit),
            )
            .await
    }

    /// 在标题和正文中搜索（忽略大小写），空查询返回空结果
    pub async fn search(&self, query: &str) -> Result<Vec<Article>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.store
            .query_articles(
                &ArticleQuery::newest()
                    .filter(ArticleFilter::default().text(query))
                    .limit(SEARCH_LIMIT),
            )
            .await
    }

    /// 当前实际存在的分类
    pub async fn distinct_categories(&self) -> Result<Vec<String>> {
        self.store.distinct_categories().await
    }
}
