use crate::error::{AppResult, FileError};
use crate::models::configuration::Configuration;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载标记配置
///
/// 文件中只需写出要覆盖的键，例如 `CHOICE = '\item'`；未写出的键使用默认值
pub async fn load_configuration(toml_file_path: &Path) -> AppResult<Configuration> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| FileError::read_failed(toml_file_path, e))?;

    let table: toml::Table =
        toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
            path: toml_file_path.display().to_string(),
            source: e,
        })?;

    let configuration = Configuration::from_toml_table(&table)?;

    tracing::info!(
        "成功加载标记配置: {} ({} 项覆盖)",
        toml_file_path.display(),
        table.len()
    );

    Ok(configuration)
}
