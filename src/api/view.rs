use axum::{
    Json,
    extract::rejection::FormRejection,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::{error::Error, session::Notice};

/// 页面视图模型
///
/// 模板渲染不在本服务内，页面以 JSON 形式返回模板所需的数据，并附带一次性提示。
#[derive(Serialize)]
pub struct PageView<T> {
    notice: Option<Notice>,
    #[serde(flatten)]
    data: T,
}

/// 返回页面数据，同时消费提示 cookie
pub fn render<T: Serialize>(jar: CookieJar, data: T) -> Response {
    let (jar, notice) = Notice::take(jar);
    (jar, Json(PageView { notice, data })).into_response()
}

/// 页面数据加载失败时返回空页面和错误提示
pub fn render_failure<T: Serialize + Default>(jar: CookieJar, e: &Error) -> Response {
    let (jar, _) = Notice::take(jar);
    let view = PageView {
        notice: Some(notice_for(e)),
        data: T::default(),
    };
    (jar, Json(view)).into_response()
}

/// 带提示的重定向
pub fn redirect(jar: CookieJar, to: &str, notice: Notice) -> Response {
    (notice.store(jar), Redirect::to(to)).into_response()
}

/// 把错误转换为面向用户的提示，内部错误只记录日志
pub fn notice_for(e: &Error) -> Notice {
    if e.is_internal() {
        tracing::error!(%e, "request failed");
        Notice::error("Something went wrong, please try again")
    } else {
        Notice::error(e.to_string())
    }
}

/// 文章相关错误的提示，找不到文章时使用更具体的文案
pub fn article_notice(e: &Error) -> Notice {
    match e {
        Error::NotFound => Notice::error("News article not found"),
        e => notice_for(e),
    }
}

/// 表单无法解析（类型或内容不符）时按校验错误处理
pub fn form_error(rejection: FormRejection) -> Error {
    Error::validation(rejection.body_text())
}
