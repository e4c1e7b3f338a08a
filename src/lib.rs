//! # Exercise Bulk
//!
//! 从带注释标记的 LaTeX 源文件中批量提取题目（选择题 / 问答题），并重新排版输出
//!
//! ## 架构设计
//!
//! ### ① 数据模型（Models）
//! - `models/configuration` - 标记配置，键集合固定
//! - `models/question` - 题目记录及其渲染
//! - `models/loaders` - 读取 .tex 输入和 TOML 标记配置
//!
//! ### ② 解析（Parser）
//! - `parser/attributes` - 行内 `key=value` 属性扫描
//! - `parser/bulk` - 逐行状态机，生成题目列表
//!
//! ### ③ 业务能力层（Services）
//! - `WarnWriter` - 写警告文件
//!
//! ### ④ 编排层（App）
//! - `App` - 加载文件、解析、输出、统计
//!
//! ## 示例
//!
//! ```
//! use exercise_bulk::{Configuration, Parser};
//!
//! let lines = [
//!     "% UFPR 2014",
//!     "Qual é a capital do Paraná?",
//!     r"\begin{choices}",
//!     r"\choice Londrina",
//!     r"\CorrectChoice Curitiba",
//!     r"\end{choices}",
//!     r"\end{Exercise}",
//!     r"\begin{Answer}",
//!     "Curitiba é a capital.",
//!     r"\end{Answer}",
//! ];
//! let mut parser = Parser::new();
//! parser.read(lines, &Configuration::default()).unwrap();
//! assert_eq!(parser.questions()[0].answer(), "Curitiba");
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod parser;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use app::{App, RunReport};
pub use config::{Config, OutputFormat};
pub use error::{AppError, AppResult, ConfigurationError, FileError, ParseError, QuestionError};
pub use models::{ConfigKey, Configuration, Question, QuestionDraft, QuestionType, EOL};
pub use parser::{AttributeWarning, Location, Parser};
pub use services::WarnWriter;
