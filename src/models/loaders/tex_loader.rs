use crate::error::{AppResult, FileError};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 一个已读入内存的 LaTeX 文件
#[derive(Debug, Clone)]
pub struct TexSource {
    pub path: PathBuf,
    pub lines: Vec<String>,
}

impl TexSource {
    /// 文件名（用于日志）
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

/// 读取单个 LaTeX 文件并按行切分
pub async fn load_tex_file(tex_file_path: &Path) -> AppResult<TexSource> {
    let content = fs::read_to_string(tex_file_path)
        .await
        .map_err(|e| FileError::read_failed(tex_file_path, e))?;

    Ok(TexSource {
        path: tex_file_path.to_path_buf(),
        lines: content.lines().map(str::to_string).collect(),
    })
}

/// 读取所有输入路径
///
/// 文件直接读取，读取失败即返回错误；
/// 文件夹读取其中全部 `.tex` 文件（按文件名排序），读取失败的文件会被跳过
pub async fn load_tex_inputs(paths: &[PathBuf]) -> AppResult<Vec<TexSource>> {
    let mut sources = Vec::new();

    for path in paths {
        if path.is_dir() {
            sources.extend(load_tex_folder(path).await?);
        } else if path.exists() {
            sources.push(load_tex_file(path).await?);
        } else {
            return Err(FileError::not_found(path).into());
        }
    }

    Ok(sources)
}

async fn load_tex_folder(folder: &Path) -> AppResult<Vec<TexSource>> {
    let mut tex_files = Vec::new();
    let mut entries = fs::read_dir(folder)
        .await
        .map_err(|e| FileError::read_failed(folder, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| FileError::read_failed(folder, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("tex") {
            tex_files.push(path);
        }
    }

    if tex_files.is_empty() {
        tracing::warn!("在文件夹 {} 中没有找到 .tex 文件", folder.display());
        return Ok(Vec::new());
    }
    tex_files.sort();

    let mut sources = Vec::new();
    for path in tex_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );
        match load_tex_file(&path).await {
            Ok(source) => sources.push(source),
            Err(e) => tracing::warn!("加载文件失败: {}", e),
        }
    }

    Ok(sources)
}
