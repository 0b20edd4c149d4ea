mod admin;
mod guard;
mod pages;
mod search;
mod view;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::instrument;

use crate::{error::Result, state::AppState, storage::Store};

pub use guard::AdminSession;

/// 设置应用的路由。
///
/// 前台页面挂在根路径，后台页面挂在 `/admin`，搜索接口挂在 `/api`，
/// 上传的图片由 `/uploads` 提供静态访问。
pub fn setup_route<S: Store>(app: AppState<S>) -> Router {
    let uploads = ServeDir::new(app.images().dir());
    let body_limit = app.max_upload_size();

    Router::new()
        .merge(pages::setup_route())
        .nest("/admin", admin::setup_route())
        .nest("/api", search::setup_route())
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(app)
}

/// 启动 HTTP 服务，并使用给定的路由处理请求。
#[instrument(name = "http server", skip(router))]
pub async fn run_server_with_router(router: Router, bind_addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}

/// 启动 HTTP 服务，自动设置路由和中间件。
///
/// 1. 生成路由
/// 2. 添加日志和追踪中间件
/// 3. 启动服务器
pub async fn run_server<S: Store>(app: AppState<S>, bind_addr: &str) -> Result<()> {
    let router = setup_route(app);
    let router = add_middlewares(router);
    run_server_with_router(router, bind_addr).await
}

/// 为路由添加中间件，包括请求追踪和失败日志记录。
fn add_middlewares(router: Router) -> Router {
    fn log_failure(
        err: tower_http::classify::ServerErrorsFailureClass,
        _latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        tracing::error!(error = %err, "request failed");
    }

    router.layer(
        TraceLayer::new_for_http()
            .on_failure(log_failure)
            .on_request(|_req: &_, _span: &tracing::Span| {
                // 关闭请求日志
            }),
    )
}
