mod password;

pub use self::password::{
    hash_password, hash_password_blocking, verify_password, verify_password_blocking,
};

use chrono::Utc;
use serde::Deserialize;

use crate::{
    content::{AdminUser, NewAdmin},
    error::{Error, Result},
    session::SessionClaims,
    storage::AdminStore,
};

/// 密码最短长度
pub const MIN_PASSWORD_LEN: usize = 6;

/// 管理员账户状态
///
/// 系统只允许一个管理员：[`AccountState::NoAdmin`] 时只能注册，
/// [`AccountState::AdminExists`] 时只能登录。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    NoAdmin,
    AdminExists,
}

/// 注册表单
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// 登录表单
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// 管理员账户服务
pub struct AdminAccounts<'a, S> {
    store: &'a S,
}

impl<'a, S: AdminStore> AdminAccounts<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// 当前账户状态
    pub async fn state(&self) -> Result<AccountState> {
        Ok(match self.store.count_admins().await? {
            0 => AccountState::NoAdmin,
            _ => AccountState::AdminExists,
        })
    }

    /// 注册第一个管理员
    pub async fn signup(&self, form: &SignupForm) -> Result<AdminUser> {
        let username = form.username.trim();
        let email = form.email.trim();

        if username.is_empty() || email.is_empty() || form.password.is_empty() {
            return Err(Error::validation("All fields are required"));
        }
        if form.password != form.confirm_password {
            return Err(Error::validation("Passwords do not match"));
        }
        if form.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }
        if self.state().await? == AccountState::AdminExists {
            return Err(Error::Conflict("Admin user already exists".to_string()));
        }
        if self.store.find_admin_by_username(username).await?.is_some() {
            return Err(Error::Conflict("Username already exists".to_string()));
        }

        let admin = self
            .register(username, email, form.password.clone())
            .await?
            .ok_or_else(|| Error::Conflict("Admin user already exists".to_string()))?;

        tracing::info!(username = %admin.username, "admin account created");
        Ok(admin)
    }

    /// 计算哈希并原子地写入第一个管理员，已存在管理员时返回 `None`
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: String,
    ) -> Result<Option<AdminUser>> {
        let password_hash = hash_password_blocking(password).await?;
        self.store
            .insert_first_admin(NewAdmin {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                created_at: Utc::now(),
            })
            .await
    }

    /// 登录，成功时记录登录时间并返回会话身份
    pub async fn login(&self, form: &LoginForm) -> Result<SessionClaims> {
        let admin = self
            .store
            .find_admin_by_username(form.username.trim())
            .await?
            .filter(|admin| admin.is_active)
            .ok_or(Error::InvalidCredentials)?;

        if !verify_password_blocking(form.password.clone(), admin.password_hash.clone()).await? {
            tracing::info!(username = %admin.username, "login rejected");
            return Err(Error::InvalidCredentials);
        }

        let now = Utc::now();
        self.store.record_login(admin.id, now).await?;

        tracing::info!(username = %admin.username, "admin logged in");
        Ok(SessionClaims::for_admin(&admin, now))
    }

    /// 校验会话对应的管理员仍然存在且可用
    pub async fn authenticate(&self, claims: &SessionClaims) -> Result<AdminUser> {
        self.store
            .find_admin(claims.admin_id)
            .await?
            .filter(|admin| admin.is_active)
            .ok_or(Error::AuthenticationRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn signup_form(username: &str, password: &str, confirm: &str) -> SignupForm {
        SignupForm {
            username: username.into(),
            email: "admin@newsportal.com".into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    fn login_form(username: &str, password: &str) -> LoginForm {
        LoginForm {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let store = MemoryStore::new();
        let accounts = AdminAccounts::new(&store);

        for form in [
            signup_form("", "secret1", "secret1"),
            signup_form("admin", "secret1", "secret2"),
            signup_form("admin", "abc", "abc"),
        ] {
            let err = accounts.signup(&form).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{:?}", form);
        }
        assert_eq!(accounts.state().await.unwrap(), AccountState::NoAdmin);
    }

    #[tokio::test]
    async fn test_signup_once_then_login() {
        let store = MemoryStore::new();
        let accounts = AdminAccounts::new(&store);

        let admin = accounts
            .signup(&signup_form("editor", "secret1", "secret1"))
            .await
            .unwrap();
        assert_ne!(admin.password_hash, "secret1");
        assert_eq!(accounts.state().await.unwrap(), AccountState::AdminExists);

        // 已存在管理员后不允许再注册
        let err = accounts
            .signup(&signup_form("second", "secret2", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let err = accounts
            .login(&login_form("editor", "wrong-password"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));

        let err = accounts.login(&login_form("nobody", "secret1")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));

        let claims = accounts.login(&login_form("editor", "secret1")).await.unwrap();
        assert_eq!(claims.username, "editor");
        assert_eq!(claims.admin_id, admin.id);

        let stored = store.find_admin(admin.id).await.unwrap().unwrap();
        assert_eq!(stored.last_login, Some(claims.last_login));
        assert_eq!(accounts.authenticate(&claims).await.unwrap().id, admin.id);
    }
}
