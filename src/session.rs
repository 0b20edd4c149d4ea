//! 管理员会话与一次性提示
//!
//! 会话令牌是 HS256 签名的 JWT，每个请求都重新校验签名和有效期，
//! 进程内不保存任何登录状态。

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{content::AdminUser, error::Result};

pub const SESSION_COOKIE: &str = "newsdesk_session";
pub const NOTICE_COOKIE: &str = "newsdesk_notice";

/// 会话中携带的管理员身份
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "sub")]
    pub admin_id: Uuid,
    pub username: String,
    /// 签发时间（Unix 秒）
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// 本次登录时间，用于后台展示
    pub last_login: DateTime<Utc>,
}

impl SessionClaims {
    pub fn for_admin(admin: &AdminUser, now: DateTime<Utc>) -> Self {
        Self {
            admin_id: admin.id,
            username: admin.username.clone(),
            issued_at: now.timestamp(),
            last_login: now,
        }
    }
}

/// 令牌中的完整载荷，过期时间由签发方按 ttl 计算
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    #[serde(flatten)]
    session: SessionClaims,
    exp: i64,
}

/// 会话签名密钥
#[derive(Clone)]
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // 有效期按调用方给出的时间检查
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            validation,
            ttl,
        }
    }

    /// 签发令牌
    pub fn sign(&self, claims: &SessionClaims) -> Result<String> {
        let claims = TokenClaims {
            session: claims.clone(),
            exp: claims.issued_at.saturating_add(self.ttl.num_seconds()),
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// 校验令牌签名与有效期
    ///
    /// 签名不符、格式错误或已过期时返回 `None`。
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<SessionClaims> {
        let data =
            jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation).ok()?;

        if now.timestamp() > data.claims.exp {
            return None;
        }
        Some(data.claims.session)
    }

    /// 生成会话 cookie
    pub fn session_cookie(&self, claims: &SessionClaims) -> Result<Cookie<'static>> {
        Ok(Cookie::build((SESSION_COOKIE, self.sign(claims)?))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build())
    }
}

/// 清除会话 cookie
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// 一次性提示，跟随重定向在下一个页面展示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// 写入提示 cookie
    pub fn store(&self, jar: CookieJar) -> CookieJar {
        let value = URL_SAFE_NO_PAD.encode(serde_json::to_vec(self).unwrap_or_default());
        jar.add(
            Cookie::build((NOTICE_COOKIE, value))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        )
    }

    /// 取出并清除提示 cookie
    pub fn take(jar: CookieJar) -> (CookieJar, Option<Notice>) {
        let Some(cookie) = jar.get(NOTICE_COOKIE) else {
            return (jar, None);
        };
        let notice = URL_SAFE_NO_PAD
            .decode(cookie.value())
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok());

        (jar.remove(Cookie::build(NOTICE_COOKIE).path("/")), notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new("a-test-secret-that-is-long-enough", Duration::hours(24))
    }

    fn claims(now: DateTime<Utc>) -> SessionClaims {
        SessionClaims {
            admin_id: Uuid::new_v4(),
            username: "admin".into(),
            issued_at: now.timestamp(),
            last_login: now,
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let now = Utc::now();
        let claims = claims(now);
        let token = keys().sign(&claims).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(keys().verify(&token, now), Some(claims));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let now = Utc::now();
        let token = keys().sign(&claims(now)).unwrap();

        let forged = SessionKeys::new("another-secret-value-entirely", Duration::hours(24))
            .sign(&SessionClaims {
                username: "mallory".into(),
                ..claims(now)
            })
            .unwrap();
        assert!(keys().verify(&forged, now).is_none());

        let (header_and_payload, _) = token.rsplit_once('.').unwrap();
        assert!(keys().verify(header_and_payload, now).is_none());
        assert!(keys().verify(&format!("{header_and_payload}.AAAA"), now).is_none());
        assert!(keys().verify("garbage", now).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issued = Utc::now() - Duration::hours(25);
        let token = keys().sign(&claims(issued)).unwrap();
        assert!(keys().verify(&token, Utc::now()).is_none());
        assert!(keys().verify(&token, issued + Duration::hours(23)).is_some());
    }

    #[test]
    fn test_notice_round_trip_through_jar() {
        let jar = Notice::error("News article not found").store(CookieJar::new());
        let (jar, notice) = Notice::take(jar);
        assert_eq!(notice, Some(Notice::error("News article not found")));
        assert!(jar.get(NOTICE_COOKIE).is_none());
    }
}
