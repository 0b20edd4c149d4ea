use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use uuid::Uuid;

use crate::error::Result;

/// 允许上传的图片扩展名
const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// 一次文件上传
#[derive(Debug, Clone)]
pub struct Upload {
    /// 客户端提供的原始文件名
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// 文件扩展名是否在允许列表中（忽略大小写）
    pub fn is_allowed(&self) -> bool {
        is_allowed_file(&self.file_name)
    }
}

pub fn is_allowed_file(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// 清理文件名，只保留 ASCII 字母、数字、`.`、`-`、`_`
///
/// 空白转为 `_`，去掉路径分隔符和开头的 `.`，结果为空时返回 `upload`。
pub fn sanitize_file_name(file_name: &str) -> String {
    // 只取最后一段，丢弃客户端带来的目录
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// 磁盘上的图片存储
///
/// 文件名形如 `<32位十六进制>_<清理后的原始文件名>`，文章的 `image` 字段只保存文件名。
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: Arc<Path>,
}

impl ImageStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: Arc::from(dir.as_ref()),
        }
    }

    /// 上传目录
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 确保上传目录存在
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// 保存上传的图片，返回存储后的文件名
    pub async fn save(&self, upload: &Upload) -> Result<String> {
        let name = format!(
            "{}_{}",
            Uuid::new_v4().simple(),
            sanitize_file_name(&upload.file_name)
        );
        tokio::fs::write(self.path_of(&name), &upload.bytes).await?;
        tracing::debug!(%name, size = upload.bytes.len(), "image saved");
        Ok(name)
    }

    /// 删除已存储的图片，文件不存在时视为成功
    pub async fn release(&self, name: &str) -> Result<()> {
        // 文件名来自数据库，仍然只允许落在上传目录内
        let name = sanitize_file_name(name);
        match tokio::fs::remove_file(self.path_of(&name)).await {
            Ok(()) => {
                tracing::debug!(%name, "image released");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// 尽力删除图片，失败只记录日志
    pub async fn release_quietly(&self, name: &str) {
        if let Err(e) = self.release(name).await {
            tracing::warn!(%e, %name, "failed to release image");
        }
    }

    /// 图片是否存在
    pub async fn exists(&self, name: &str) -> bool {
        tokio::fs::try_exists(self.path_of(&sanitize_file_name(name)))
            .await
            .unwrap_or(false)
    }
}
