use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::Response,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use super::view::redirect;
use crate::{
    content::AdminUser,
    session::{Notice, SESSION_COOKIE, SessionClaims, clear_session},
    state::AppState,
    storage::Store,
};

/// 已登录的管理员
///
/// 作为提取器使用时会校验会话 cookie 的签名、有效期以及管理员账户状态，
/// 校验失败时重定向到登录页。
pub struct AdminSession {
    pub admin: AdminUser,
    pub claims: SessionClaims,
}

fn login_redirect(jar: CookieJar) -> Response {
    redirect(
        jar,
        "/admin/login",
        Notice::error("Please log in to access the admin panel"),
    )
}

impl<S: Store> FromRequestParts<AppState<S>> for AdminSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(claims) = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| state.sessions().verify(cookie.value(), Utc::now()))
        else {
            return Err(login_redirect(jar));
        };

        match state.accounts().authenticate(&claims).await {
            Ok(admin) => Ok(AdminSession { admin, claims }),
            Err(e) => {
                if e.is_internal() {
                    tracing::error!(%e, "session check failed");
                }
                Err(login_redirect(clear_session(jar)))
            }
        }
    }
}
