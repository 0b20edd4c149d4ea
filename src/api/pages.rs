use axum::{
    Form, Router,
    extract::{Path, State, rejection::FormRejection},
    response::Response,
    routing::get,
};
use axum_extra::extract::{CookieJar, Query};
use serde::{Deserialize, Serialize};

use super::view::{article_notice, form_error, notice_for, redirect, render, render_failure};
use crate::{
    articles::{Page, RELATED_LIMIT},
    contact,
    content::{Article, Category, ContactMessage},
    error::Result,
    session::Notice,
    state::AppState,
    storage::Store,
};

/// 首页各列表长度
const HOME_RECENT_LIMIT: i64 = 3;
const HOME_UPDATED_LIMIT: i64 = 4;
const HOME_CATEGORY_LIMIT: i64 = 4;

/// 配置前台页面路由。
///
/// 路由包括：
/// - `GET /`：首页
/// - `GET /all-news`：分页列表
/// - `GET /news/{id}`：文章详情，浏览量加一
/// - `GET|POST /contact`：联系表单
pub fn setup_route<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(home::<S>))
        .route("/all-news", get(all_news::<S>))
        .route("/news/{id}", get(news_detail::<S>))
        .route("/contact", get(contact_form).post(contact_submit::<S>))
}

/// 某个分类下的最新文章
#[derive(Debug, Serialize)]
pub struct CategorySection {
    category: Category,
    articles: Vec<Article>,
}

/// 首页数据
#[derive(Debug, Default, Serialize)]
pub struct HomeView {
    recent_news: Vec<Article>,
    updated_news: Vec<Article>,
    categorized_news: Vec<CategorySection>,
}

async fn load_home<S: Store>(state: &AppState<S>) -> Result<HomeView> {
    let articles = state.articles();
    let (recent_news, updated_news) = tokio::try_join!(
        articles.list_recent(HOME_RECENT_LIMIT),
        articles.list_recently_updated(HOME_UPDATED_LIMIT)
    )?;

    let mut categorized_news = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        categorized_news.push(CategorySection {
            category,
            articles: articles
                .list_by_category(category, HOME_CATEGORY_LIMIT)
                .await?,
        });
    }

    Ok(HomeView {
        recent_news,
        updated_news,
        categorized_news,
    })
}

async fn home<S: Store>(State(state): State<AppState<S>>, jar: CookieJar) -> Response {
    match load_home(&state).await {
        Ok(view) => render(jar, view),
        Err(e) => render_failure::<HomeView>(jar, &e),
    }
}

/// 列表页查询参数
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AllNewsParams {
    /// 非数字时按第 1 页处理
    page: String,
    category: String,
}

impl Default for AllNewsParams {
    fn default() -> Self {
        Self {
            page: "1".to_string(),
            category: String::new(),
        }
    }
}

/// 列表页数据
#[derive(Debug, Default, Serialize)]
pub struct AllNewsView {
    news_list: Vec<Article>,
    page: i64,
    per_page: i64,
    total: i64,
    total_pages: i64,
    category: String,
    categories: Vec<String>,
}

async fn all_news<S: Store>(
    Query(params): Query<AllNewsParams>,
    State(state): State<AppState<S>>,
    jar: CookieJar,
) -> Response {
    let page = params.page.trim().parse().unwrap_or(1);
    let articles = state.articles();

    let loaded = tokio::try_join!(
        articles.list_paged(Some(&params.category), page),
        articles.distinct_categories()
    );

    match loaded {
        Ok((
            Page {
                items,
                page,
                per_page,
                total,
                total_pages,
            },
            categories,
        )) => render(
            jar,
            AllNewsView {
                news_list: items,
                page,
                per_page,
                total,
                total_pages,
                category: params.category,
                categories,
            },
        ),
        Err(e) => render_failure::<AllNewsView>(jar, &e),
    }
}

/// 详情页数据
#[derive(Debug, Serialize)]
pub struct NewsDetailView {
    news: Article,
    related_news: Vec<Article>,
}

async fn load_detail<S: Store>(state: &AppState<S>, id: &str) -> Result<NewsDetailView> {
    let articles = state.articles();
    let id = crate::articles::parse_id(id)?;
    let news = articles.view(id).await?;
    let related_news = articles
        .list_related(news.id, news.category, RELATED_LIMIT)
        .await?;
    Ok(NewsDetailView { news, related_news })
}

async fn news_detail<S: Store>(
    Path(id): Path<String>,
    State(state): State<AppState<S>>,
    jar: CookieJar,
) -> Response {
    match load_detail(&state, &id).await {
        Ok(view) => render(jar, view),
        Err(e) => redirect(jar, "/", article_notice(&e)),
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ContactView {}

async fn contact_form(jar: CookieJar) -> Response {
    render(jar, ContactView::default())
}

async fn contact_submit<S: Store>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    message: std::result::Result<Form<ContactMessage>, FormRejection>,
) -> Response {
    let message = match message {
        Ok(Form(message)) => message,
        Err(e) => return redirect(jar, "/contact", notice_for(&form_error(e))),
    };

    match contact::submit(state.store(), message).await {
        Ok(()) => redirect(
            jar,
            "/contact",
            Notice::success("Your message has been sent successfully!"),
        ),
        Err(e) => redirect(jar, "/contact", notice_for(&e)),
    }
}
