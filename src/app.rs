use crate::config::{Config, OutputFormat};
use crate::models::{load_configuration, load_tex_inputs, Configuration, TexSource};
use crate::parser::Parser;
use crate::services::WarnWriter;
use crate::utils::logging::{log_file_parsed, log_files_loaded, log_startup, print_final_stats};
use anyhow::{Context, Result};
use tokio::fs;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    configuration: Configuration,
    target: Option<Configuration>,
    warn_writer: WarnWriter,
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub files_parsed: usize,
    pub files_failed: usize,
    pub questions: usize,
    pub warnings: usize,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(
            config.inputs.len(),
            config.markers_file.as_ref().and_then(|p| p.to_str()),
        );

        let configuration = match &config.markers_file {
            Some(path) => load_configuration(path).await?,
            None => Configuration::default(),
        };
        let target = match &config.target_markers_file {
            Some(path) => Some(load_configuration(path).await?),
            None => None,
        };

        let warn_writer = WarnWriter::with_path(config.warn_file.clone());
        warn_writer.init().await?;

        Ok(Self {
            config,
            configuration,
            target,
            warn_writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunReport> {
        info!("\n📁 正在扫描待解析的文件...");
        let sources = load_tex_inputs(&self.config.inputs).await?;

        if sources.is_empty() {
            warn!("⚠️ 没有找到待解析的 .tex 文件，程序结束");
            return Ok(RunReport::default());
        }
        log_files_loaded(sources.len(), sources.iter().map(|s| s.lines.len()).sum());

        let mut parser = Parser::new();
        let mut report = self.parse_all(&mut parser, &sources).await?;
        report.questions = parser.questions().len();

        if let Some(target) = &self.target {
            let changes = self.configuration.changes(target);
            for (key, value) in &changes {
                info!("{}: {} → {}", key, self.configuration.get(*key), value);
            }
            parser.apply_changes(&changes)?;
        }

        match self.format(&parser)? {
            Some(output) => self.write_output(&output).await?,
            None => warn!("⚠️ 没有可输出的题目"),
        }
        parser.clear(true);

        print_final_stats(
            report.files_parsed,
            report.files_failed,
            report.questions,
            report.warnings,
        );
        if report.warnings > 0 {
            info!("警告已保存至: {}", self.warn_writer.path());
        }

        Ok(report)
    }

    /// 逐个文件解析，单个文件的结构错误不会中断其他文件
    async fn parse_all(&self, parser: &mut Parser, sources: &[TexSource]) -> Result<RunReport> {
        let mut report = RunReport::default();

        for (idx, source) in sources.iter().enumerate() {
            let file_index = idx + 1;
            let name = source.name();

            match parser.read(&source.lines, &self.configuration) {
                Ok(found) => {
                    report.files_parsed += 1;
                    log_file_parsed(file_index, &name, found);
                }
                Err(e) => {
                    report.files_failed += 1;
                    error!("[文件 {}] ❌ {} 解析失败: {}", file_index, name, e);
                }
            }

            for warning in parser.take_warnings() {
                self.warn_writer.write(&name, &warning).await?;
                report.warnings += 1;
            }
        }

        Ok(report)
    }

    fn format(&self, parser: &Parser) -> Result<Option<String>> {
        match self.config.output_format {
            OutputFormat::Text => Ok(parser.pretty_print()),
            OutputFormat::Json if parser.questions().is_empty() => Ok(None),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(parser.questions())
                    .context("无法序列化题目")?;
                Ok(Some(json))
            }
        }
    }

    async fn write_output(&self, output: &str) -> Result<()> {
        match &self.config.output_file {
            Some(path) => {
                fs::write(path, format!("{}\n", output))
                    .await
                    .with_context(|| format!("无法写入输出文件: {}", path.display()))?;
                info!("✓ 结果已保存至: {}", path.display());
            }
            None => println!("{}", output),
        }
        Ok(())
    }
}
