use chrono::Duration;

use crate::{
    accounts::AdminAccounts,
    articles::ArticleRepository,
    config::Config,
    session::SessionKeys,
    storage::Store,
    uploads::ImageStore,
};

/// 应用程序上下文
///
/// [`AppState`] 封装了存储后端、图片存储和会话密钥，提供统一访问入口。
#[derive(Clone)]
pub struct AppState<S> {
    store: S,
    images: ImageStore,
    sessions: SessionKeys,
    max_upload_size: usize,
}

impl<S: Store> AppState<S> {
    /// 创建一个新的 [`AppState`] 实例
    pub fn new(store: S, images: ImageStore, sessions: SessionKeys, max_upload_size: usize) -> Self {
        Self {
            store,
            images,
            sessions,
            max_upload_size,
        }
    }

    /// 根据 [`Config`] 创建
    pub fn from_config(store: S, config: &Config) -> Self {
        Self::new(
            store,
            ImageStore::new(&config.upload_dir),
            SessionKeys::new(&config.secret_key, Duration::hours(config.session_ttl_hours)),
            config.max_upload_size,
        )
    }

    /// 获取存储后端
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 获取文章仓储
    pub fn articles(&self) -> ArticleRepository<'_, S> {
        ArticleRepository::new(&self.store, &self.images)
    }

    /// 获取管理员账户服务
    pub fn accounts(&self) -> AdminAccounts<'_, S> {
        AdminAccounts::new(&self.store)
    }

    /// 获取图片存储
    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// 获取会话密钥
    pub fn sessions(&self) -> &SessionKeys {
        &self.sessions
    }

    /// 请求体大小上限
    pub fn max_upload_size(&self) -> usize {
        self.max_upload_size
    }
}
