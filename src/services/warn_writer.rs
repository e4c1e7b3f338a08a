//! 警告写入服务
//!
//! 只负责把属性校验警告追加到警告文件，不关心解析流程

use crate::error::{AppResult, FileError};
use crate::parser::AttributeWarning;
use std::path::Path;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 警告写入服务
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.warn_file_path
    }

    /// 初始化警告文件（覆盖旧内容并写入带时间的标题）
    pub async fn init(&self) -> AppResult<()> {
        let header = format!(
            "{}\n解析警告 - {}\n{}\n\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        fs::write(&self.warn_file_path, header)
            .await
            .map_err(|e| self.write_failed(e))?;
        Ok(())
    }

    /// 写入警告信息
    ///
    /// # 参数
    /// - `file_name`: 警告所在的输入文件
    /// - `warning`: 属性校验警告
    pub async fn write(&self, file_name: &str, warning: &AttributeWarning) -> AppResult<()> {
        debug!("写入警告: {} | {}", file_name, warning);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .await
            .map_err(|e| self.write_failed(e))?;

        let warn_msg = format!("{} | {}\n", file_name, warning);
        file.write_all(warn_msg.as_bytes())
            .await
            .map_err(|e| self.write_failed(e))?;

        Ok(())
    }

    fn write_failed(&self, source: std::io::Error) -> FileError {
        FileError::write_failed(Path::new(&self.warn_file_path), source)
    }
}
