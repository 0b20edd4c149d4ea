use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    AdminStore, ContactStore, DBPool, NewsStore,
    models::{AdminRow, ArticleRow},
};
use crate::{
    content::{
        AdminUser, Article, ArticleChanges, ArticleFilter, ArticleQuery, CategoryStat,
        ContactMessage, NewAdmin, NewArticle, SortKey,
    },
    error::Result,
};

const NEWS_COLUMNS: &str =
    "id, title, content, category, image, date_created, date_updated, views, author";

const ADMIN_COLUMNS: &str = "id, username, email, password, date_created, last_login, is_active";

/// 将 [`ArticleFilter`] 追加为 WHERE 子句
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ArticleFilter) {
    builder.push(" WHERE TRUE");
    if let Some(category) = &filter.category {
        builder.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(id) = filter.exclude {
        builder.push(" AND id <> ").push_bind(id);
    }
    if let Some(text) = &filter.text {
        // strpos 做子串匹配，不会把用户输入当作模式解释
        builder
            .push(" AND (strpos(lower(title), lower(")
            .push_bind(text.clone())
            .push(")) > 0 OR strpos(lower(content), lower(")
            .push_bind(text.clone())
            .push(")) > 0)");
    }
    if filter.with_image {
        builder.push(" AND image IS NOT NULL");
    }
    if let Some(since) = filter.created_since {
        builder.push(" AND date_created >= ").push_bind(since);
    }
}

fn order_by(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Created => " ORDER BY date_created DESC, id DESC",
        SortKey::Updated => " ORDER BY date_updated DESC, id DESC",
        SortKey::Views => " ORDER BY views DESC, id DESC",
    }
}

fn into_articles(rows: Vec<ArticleRow>) -> Result<Vec<Article>> {
    rows.into_iter().map(Article::try_from).collect()
}

impl NewsStore for DBPool {
    async fn insert_article(&self, article: NewArticle) -> Result<Article> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "
            INSERT INTO news
                (title, content, category, image, date_created, date_updated, views, author)
            VALUES ($1, $2, $3, $4, $5, $5, $6, $7)
            RETURNING {NEWS_COLUMNS}
            "
        ))
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.category.as_str())
        .bind(&article.image)
        .bind(article.created_at)
        .bind(article.views)
        .bind(&article.author)
        .fetch_one(self)
        .await?;

        row.try_into()
    }

    async fn find_article(&self, id: Uuid) -> Result<Option<Article>> {
        sqlx::query_as::<_, ArticleRow>(&format!("SELECT {NEWS_COLUMNS} FROM news WHERE id = $1"))
            .bind(id)
            .fetch_optional(self)
            .await?
            .map(Article::try_from)
            .transpose()
    }

    async fn update_article(&self, id: Uuid, changes: &ArticleChanges) -> Result<Option<Article>> {
        sqlx::query_as::<_, ArticleRow>(&format!(
            "
            UPDATE news
            SET
                title = $2,
                content = $3,
                category = $4,
                date_updated = GREATEST($5, date_created),
                image = COALESCE($6, image)
            WHERE id = $1
            RETURNING {NEWS_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(changes.category.as_str())
        .bind(changes.updated_at)
        .bind(&changes.image)
        .fetch_optional(self)
        .await?
        .map(Article::try_from)
        .transpose()
    }

    async fn delete_article(&self, id: Uuid) -> Result<Option<Article>> {
        sqlx::query_as::<_, ArticleRow>(&format!(
            "DELETE FROM news WHERE id = $1 RETURNING {NEWS_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self)
        .await?
        .map(Article::try_from)
        .transpose()
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<Article>> {
        sqlx::query_as::<_, ArticleRow>(&format!(
            "UPDATE news SET views = views + 1 WHERE id = $1 RETURNING {NEWS_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self)
        .await?
        .map(Article::try_from)
        .transpose()
    }

    async fn query_articles(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {NEWS_COLUMNS} FROM news"));
        push_filter(&mut builder, &query.filter);
        builder.push(order_by(query.sort));
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }
        builder.push(" OFFSET ").push_bind(query.skip);

        let rows = builder
            .build_query_as::<ArticleRow>()
            .fetch_all(self)
            .await?;
        into_articles(rows)
    }

    async fn count_articles(&self, filter: &ArticleFilter) -> Result<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM news");
        push_filter(&mut builder, filter);
        Ok(builder.build_query_scalar::<i64>().fetch_one(self).await?)
    }

    async fn sum_views(&self, filter: &ArticleFilter) -> Result<i64> {
        // SUM(BIGINT) 的结果是 NUMERIC，需要转换回 BIGINT
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COALESCE(SUM(views), 0)::BIGINT FROM news");
        push_filter(&mut builder, filter);
        Ok(builder.build_query_scalar::<i64>().fetch_one(self).await?)
    }

    async fn category_stats(&self) -> Result<Vec<CategoryStat>> {
        Ok(sqlx::query_as::<_, CategoryStat>(
            r#"
            SELECT
                category,
                COUNT(*) AS count,
                COALESCE(SUM(views), 0)::BIGINT AS total_views
            FROM news
            GROUP BY category
            ORDER BY count DESC, category
            "#,
        )
        .fetch_all(self)
        .await?)
    }

    async fn distinct_categories(&self) -> Result<Vec<String>> {
        Ok(
            sqlx::query_scalar("SELECT DISTINCT category FROM news ORDER BY category")
                .fetch_all(self)
                .await?,
        )
    }
}

impl AdminStore for DBPool {
    async fn count_admins(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM admin_users")
            .fetch_one(self)
            .await?)
    }

    async fn insert_first_admin(&self, admin: NewAdmin) -> Result<Option<AdminUser>> {
        let mut tx = self.begin().await?;

        // 锁表后再检查，避免两个并发注册都看到空表
        sqlx::query("LOCK TABLE admin_users IN SHARE ROW EXCLUSIVE MODE")
            .execute(tx.as_mut())
            .await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM admin_users)")
            .fetch_one(tx.as_mut())
            .await?;
        if exists {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = sqlx::query_as::<_, AdminRow>(&format!(
            "
            INSERT INTO admin_users (username, email, password, date_created, last_login, is_active)
            VALUES ($1, $2, $3, $4, NULL, TRUE)
            RETURNING {ADMIN_COLUMNS}
            "
        ))
        .bind(&admin.username)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(admin.created_at)
        .fetch_one(tx.as_mut())
        .await?;

        tx.commit().await?;
        Ok(Some(row.into()))
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        Ok(sqlx::query_as::<_, AdminRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admin_users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self)
        .await?
        .map(Into::into))
    }

    async fn find_admin(&self, id: Uuid) -> Result<Option<AdminUser>> {
        Ok(sqlx::query_as::<_, AdminRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admin_users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self)
        .await?
        .map(Into::into))
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE admin_users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(self)
            .await?;
        Ok(())
    }
}

impl ContactStore for DBPool {
    async fn insert_contact(&self, message: &ContactMessage) -> Result<()> {
        sqlx::query(
            "
            INSERT INTO contacts (name, email, subject, message, date_created)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.subject)
        .bind(&message.message)
        .bind(message.date_created)
        .execute(self)
        .await?;
        Ok(())
    }
}
