use std::path::Path;
use thiserror::Error;

/// 加载与写出阶段的错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 标记配置错误
    #[error("配置错误: {0}")]
    Configuration(#[from] ConfigurationError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 标记配置错误
///
/// 配置的键集合是固定的，任何增删键的尝试都会失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// 未知的配置键
    #[error("{keys} 不是有效的配置键")]
    InvalidKey { keys: String },
    /// 配置值不是（非空）文本
    #[error("配置 {key} 的值 {value} 必须是非空文本")]
    InvalidValue { key: String, value: String },
    /// 配置项不可删除
    #[error("配置项 {key} 不能被删除")]
    Undeletable { key: String },
}

/// 题目构造错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    /// 年份既不是四位数字也不是未知年份标记
    #[error("年份 {year:?} 必须是四位数字或 {sentinel}")]
    InvalidYear { year: String, sentinel: String },
    /// 题型未确定
    #[error("题目类型未确定")]
    InvalidState,
    /// 问答题不能有答案
    #[error("问答题不能有答案: {answer:?}")]
    UnexpectedAnswer { answer: String },
    /// 选择题的答案不在选项中
    #[error("答案 {answer:?} 不在选项中")]
    AnswerNotInChoices { answer: String },
    /// 错误选项与选项列表不一致
    #[error("错误选项必须等于去掉答案后的选项列表")]
    WrongsMismatch,
}

/// 解析过程中的结构错误
///
/// 行号从 1 开始，对应传给 `Parser::read` 的行
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// 题目起始注释行缺少来源和年份
    #[error("第 {line} 行: 题目起始注释缺少来源和年份")]
    MalformedHeader { line: usize },
    /// 选项出现在选择题块之外
    #[error("第 {line} 行: 选项出现在选择题块之外")]
    ChoiceOutsideChoices { line: usize },
    /// 选项块结束时找不到正确答案
    #[error("第 {line} 行: 正确答案 {answer:?} 不在选项中")]
    MissingCorrectChoice { line: usize, answer: String },
    /// 标记出现在错误的位置
    #[error("第 {line} 行: {marker} 需要位于 {expected}，当前位于 {found}")]
    UnexpectedMarker {
        line: usize,
        marker: String,
        expected: String,
        found: String,
    },
    /// 答案块结束时无法构造题目
    #[error("第 {line} 行: 无法构造题目: {source}")]
    InvalidQuestion {
        line: usize,
        #[source]
        source: QuestionError,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl FileError {
    pub fn not_found(path: &Path) -> Self {
        FileError::NotFound {
            path: path.display().to_string(),
        }
    }

    pub fn read_failed(path: &Path, source: std::io::Error) -> Self {
        FileError::ReadFailed {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn write_failed(path: &Path, source: std::io::Error) -> Self {
        FileError::WriteFailed {
            path: path.display().to_string(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
