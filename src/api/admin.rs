use axum::{
    Form, Router,
    extract::{
        Multipart, Path, State, multipart::MultipartRejection, rejection::FormRejection,
    },
    response::Response,
    routing::get,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use super::{
    guard::AdminSession,
    view::{article_notice, form_error, notice_for, redirect, render, render_failure},
};
use crate::{
    accounts::{AccountState, LoginForm, SignupForm},
    analytics::Dashboard,
    articles::{ArticleDraft, parse_id},
    content::{Article, Category},
    error::{Error, Result},
    session::{Notice, clear_session},
    state::AppState,
    storage::Store,
    uploads::Upload,
};

/// 配置后台路由，挂载在 `/admin` 下。
///
/// 除注册、登录和退出外，所有路由都需要 [`AdminSession`]。
pub fn setup_route<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/signup", get(signup_form::<S>).post(signup::<S>))
        .route("/login", get(login_form::<S>).post(login::<S>))
        .route("/logout", get(logout))
        .route("/dashboard", get(dashboard::<S>))
        .route("/news", get(news_list::<S>))
        .route("/news/add", get(add_form::<S>).post(add::<S>))
        .route("/news/edit/{id}", get(edit_form::<S>).post(edit::<S>))
        .route("/news/delete/{id}", get(delete::<S>))
}

#[derive(Debug, Default, Serialize)]
pub struct EmptyView {}

/// 已存在管理员时注册页跳转到登录页
fn signup_closed(jar: CookieJar) -> Response {
    redirect(
        jar,
        "/admin/login",
        Notice::info("Admin user already exists. Please log in instead."),
    )
}

/// 没有管理员时登录页跳转到注册页
fn login_unavailable(jar: CookieJar) -> Response {
    redirect(
        jar,
        "/admin/signup",
        Notice::info("No admin account found. Please create an admin account first."),
    )
}

async fn signup_form<S: Store>(State(state): State<AppState<S>>, jar: CookieJar) -> Response {
    match state.accounts().state().await {
        Ok(AccountState::NoAdmin) => render(jar, EmptyView::default()),
        Ok(AccountState::AdminExists) => signup_closed(jar),
        Err(e) => render_failure::<EmptyView>(jar, &e),
    }
}

async fn signup<S: Store>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    form: std::result::Result<Form<SignupForm>, FormRejection>,
) -> Response {
    let accounts = state.accounts();
    match accounts.state().await {
        Ok(AccountState::NoAdmin) => {}
        Ok(AccountState::AdminExists) => return signup_closed(jar),
        Err(e) => return redirect(jar, "/admin/signup", notice_for(&e)),
    }

    let form = match form {
        Ok(Form(form)) => form,
        Err(e) => return redirect(jar, "/admin/signup", notice_for(&form_error(e))),
    };

    match accounts.signup(&form).await {
        Ok(_) => redirect(
            jar,
            "/admin/login",
            Notice::success("Admin account created successfully! Please log in."),
        ),
        Err(e) => redirect(jar, "/admin/signup", notice_for(&e)),
    }
}

async fn login_form<S: Store>(State(state): State<AppState<S>>, jar: CookieJar) -> Response {
    match state.accounts().state().await {
        Ok(AccountState::AdminExists) => render(jar, EmptyView::default()),
        Ok(AccountState::NoAdmin) => login_unavailable(jar),
        Err(e) => render_failure::<EmptyView>(jar, &e),
    }
}

async fn login<S: Store>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    form: std::result::Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let accounts = state.accounts();
    match accounts.state().await {
        Ok(AccountState::AdminExists) => {}
        Ok(AccountState::NoAdmin) => return login_unavailable(jar),
        Err(e) => return redirect(jar, "/admin/login", notice_for(&e)),
    }

    let form = match form {
        Ok(Form(form)) => form,
        Err(e) => return redirect(jar, "/admin/login", notice_for(&form_error(e))),
    };

    let session = accounts.login(&form).await.and_then(|claims| {
        let cookie = state.sessions().session_cookie(&claims)?;
        Ok((claims, cookie))
    });

    match session {
        Ok((claims, cookie)) => redirect(
            jar.add(cookie),
            "/admin/dashboard",
            Notice::success(format!("Welcome back, {}!", claims.username)),
        ),
        Err(e) => redirect(jar, "/admin/login", notice_for(&e)),
    }
}

async fn logout(jar: CookieJar) -> Response {
    redirect(
        clear_session(jar),
        "/admin/login",
        Notice::success("You have been logged out successfully"),
    )
}

/// 后台页面共有的登录信息
#[derive(Debug, Default, Serialize)]
pub struct AdminInfo {
    username: String,
    last_login: Option<String>,
}

impl From<&AdminSession> for AdminInfo {
    fn from(session: &AdminSession) -> Self {
        Self {
            username: session.admin.username.clone(),
            last_login: Some(
                session
                    .claims
                    .last_login
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            ),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    admin: AdminInfo,
    #[serde(flatten)]
    dashboard: Dashboard,
}

async fn dashboard<S: Store>(
    session: AdminSession,
    State(state): State<AppState<S>>,
    jar: CookieJar,
) -> Response {
    let dashboard = Dashboard::load(state.store()).await;
    render(
        jar,
        DashboardView {
            admin: AdminInfo::from(&session),
            dashboard,
        },
    )
}

#[derive(Debug, Default, Serialize)]
pub struct NewsListView {
    admin: AdminInfo,
    news_list: Vec<Article>,
}

async fn news_list<S: Store>(
    session: AdminSession,
    State(state): State<AppState<S>>,
    jar: CookieJar,
) -> Response {
    match state.articles().list_all().await {
        Ok(news_list) => render(
            jar,
            NewsListView {
                admin: AdminInfo::from(&session),
                news_list,
            },
        ),
        Err(e) => redirect(jar, "/admin/dashboard", notice_for(&e)),
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleFormView {
    admin: AdminInfo,
    news: Option<Article>,
    categories: [Category; 4],
}

async fn add_form<S: Store>(session: AdminSession, jar: CookieJar) -> Response {
    render(
        jar,
        ArticleFormView {
            admin: AdminInfo::from(&session),
            news: None,
            categories: Category::ALL,
        },
    )
}

/// 读取后台文章表单（multipart）
async fn read_draft(multipart: std::result::Result<Multipart, MultipartRejection>) -> Result<ArticleDraft> {
    fn invalid(e: axum::extract::multipart::MultipartError) -> Error {
        Error::validation(e.body_text())
    }

    let mut multipart = multipart.map_err(|e| Error::validation(e.body_text()))?;

    let mut draft = ArticleDraft::default();
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        match field.name().unwrap_or_default() {
            "title" => draft.title = field.text().await.map_err(invalid)?,
            "content" => draft.content = field.text().await.map_err(invalid)?,
            "category" => draft.category = field.text().await.map_err(invalid)?,
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(invalid)?;
                if !file_name.is_empty() {
                    draft.image = Some(Upload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }
    Ok(draft)
}

async fn add<S: Store>(
    session: AdminSession,
    State(state): State<AppState<S>>,
    jar: CookieJar,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let created = match read_draft(multipart).await {
        Ok(draft) => state.articles().create(&draft, &session.admin.username).await,
        Err(e) => Err(e),
    };

    match created {
        Ok(_) => redirect(
            jar,
            "/admin/news",
            Notice::success("News article added successfully!"),
        ),
        Err(e) => redirect(jar, "/admin/news/add", notice_for(&e)),
    }
}

async fn edit_form<S: Store>(
    session: AdminSession,
    Path(id): Path<String>,
    State(state): State<AppState<S>>,
    jar: CookieJar,
) -> Response {
    let articles = state.articles();
    let found = match parse_id(&id) {
        Ok(id) => articles.get_by_id(id).await,
        Err(e) => Err(e),
    };

    match found {
        Ok(news) => render(
            jar,
            ArticleFormView {
                admin: AdminInfo::from(&session),
                news: Some(news),
                categories: Category::ALL,
            },
        ),
        Err(e) => redirect(jar, "/admin/news", article_notice(&e)),
    }
}

async fn edit<S: Store>(
    _session: AdminSession,
    Path(id): Path<String>,
    State(state): State<AppState<S>>,
    jar: CookieJar,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(e) => return redirect(jar, "/admin/news", article_notice(&e)),
    };

    let updated = match read_draft(multipart).await {
        Ok(draft) => state.articles().update(id, &draft).await,
        Err(e) => Err(e),
    };

    match updated {
        Ok(_) => redirect(
            jar,
            "/admin/news",
            Notice::success("News article updated successfully!"),
        ),
        Err(Error::NotFound) => redirect(jar, "/admin/news", article_notice(&Error::NotFound)),
        Err(e) => redirect(jar, &format!("/admin/news/edit/{id}"), notice_for(&e)),
    }
}

async fn delete<S: Store>(
    _session: AdminSession,
    Path(id): Path<String>,
    State(state): State<AppState<S>>,
    jar: CookieJar,
) -> Response {
    let deleted = match parse_id(&id) {
        Ok(id) => state.articles().delete(id).await,
        Err(e) => Err(e),
    };

    match deleted {
        Ok(_) => redirect(
            jar,
            "/admin/news",
            Notice::success("News article deleted successfully!"),
        ),
        Err(e) => redirect(jar, "/admin/news", article_notice(&e)),
    }
}
