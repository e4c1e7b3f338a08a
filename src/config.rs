use std::path::PathBuf;

/// 输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// 重新排版的 LaTeX 文本
    Text,
    /// 题目列表的 JSON
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "tex" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 输入文件或文件夹
    pub inputs: Vec<PathBuf>,
    /// 输出文件，未设置时写到标准输出
    pub output_file: Option<PathBuf>,
    /// 标记配置文件（TOML）
    pub markers_file: Option<PathBuf>,
    /// 输出时改用的标记配置（TOML），用于在两套标记之间转换
    pub target_markers_file: Option<PathBuf>,
    /// 属性校验警告文件
    pub warn_file: String,
    /// 输出格式
    pub output_format: OutputFormat,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: vec![PathBuf::from("input_tex")],
            output_file: None,
            markers_file: None,
            target_markers_file: None,
            warn_file: "warn.txt".to_string(),
            output_format: OutputFormat::Text,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            inputs: std::env::var("INPUT_FOLDER")
                .map(|v| vec![PathBuf::from(v)])
                .unwrap_or(default.inputs),
            output_file: env_path("OUTPUT_FILE").or(default.output_file),
            markers_file: env_path("MARKERS_FILE").or(default.markers_file),
            target_markers_file: env_path("TARGET_MARKERS_FILE").or(default.target_markers_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(default.warn_file),
            output_format: std::env::var("OUTPUT_FORMAT")
                .ok()
                .and_then(|v| OutputFormat::parse(&v))
                .unwrap_or(default.output_format),
            verbose_logging: std::env::var("VERBOSE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.verbose_logging),
        }
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name).ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse(" JSON "), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("tex"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::parse("yaml"), None);
    }
}
