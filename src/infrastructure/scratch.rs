use crate::error::{AppError, AppResult};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 单次执行独占的临时目录
///
/// 每次执行各自创建，因此并发执行不会互相覆盖验证码图片。
/// 对象销毁时目录随之删除。
pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    pub fn new() -> AppResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("captcha-")
            .tempdir()
            .map_err(|e| AppError::file(std::env::temp_dir().display().to_string(), e))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// 写入一个文件并返回其完整路径
    pub fn write(&self, file_name: &str, bytes: &[u8]) -> AppResult<PathBuf> {
        let path = self.dir.path().join(file_name);
        std::fs::write(&path, bytes).map_err(|e| AppError::file(path.display().to_string(), e))?;
        Ok(path)
    }
}
