use anyhow::Result;
use clap::Parser;
use exercise_bulk::config::{Config, OutputFormat};
use exercise_bulk::{logger, App};
use std::path::PathBuf;

/// 从带标记的 LaTeX 文件中批量提取题目并重新排版
#[derive(Parser)]
#[command(name = "exercise-bulk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 输入的 .tex 文件或文件夹（默认读取环境变量 INPUT_FOLDER）
    inputs: Vec<PathBuf>,

    /// 标记配置文件（TOML）
    #[arg(short, long)]
    markers: Option<PathBuf>,

    /// 输出时改用的标记配置文件（TOML）
    #[arg(short, long)]
    target_markers: Option<PathBuf>,

    /// 输出文件，未指定时写到标准输出
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 属性校验警告文件
    #[arg(short, long)]
    warn_file: Option<String>,

    /// 输出格式
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// 详细日志
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// 命令行参数覆盖环境变量配置
    fn apply_to(self, mut config: Config) -> Config {
        if !self.inputs.is_empty() {
            config.inputs = self.inputs;
        }
        config.markers_file = self.markers.or(config.markers_file);
        config.target_markers_file = self.target_markers.or(config.target_markers_file);
        config.output_file = self.output.or(config.output_file);
        config.warn_file = self.warn_file.unwrap_or(config.warn_file);
        config.output_format = self.format.unwrap_or(config.output_format);
        config.verbose_logging |= self.verbose;
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Cli::parse().apply_to(Config::from_env());

    // 初始化日志
    logger::init(config.verbose_logging);

    // 初始化并运行应用
    let report = App::initialize(config).await?.run().await?;
    if report.files_failed > 0 {
        anyhow::bail!("{} 个文件解析失败", report.files_failed);
    }

    Ok(())
}
