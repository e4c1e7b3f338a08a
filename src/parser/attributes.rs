//! 行内属性扫描
//!
//! 读取 `\begin{Exercise}[label=ufa, origin={UFA-AM}]` 这类行中的 `key=value` 对

use regex::Regex;
use std::sync::LazyLock;

// 0~2 个空白、[ 或 , 作为边界；键由字母、数字、连字符组成；
// 值还可以包含冒号，并可被 {} 包围；末尾可以有 ]
static ATTRIBUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s\[,]{0,2}([\w\-]+)\s*=\s*(\{?[\w:\-]+\}?)\]?").expect("属性正则表达式无效")
});

/// 一个 `key=value` 属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// 从一行文本中按从左到右的顺序提取全部属性
///
/// 不做大小写转换；没有属性时返回空列表
pub fn scan_attributes(line: &str) -> Vec<Attribute> {
    ATTRIBUTE_PATTERN
        .captures_iter(line)
        .map(|caps| Attribute::new(&caps[1], &caps[2]))
        .collect()
}
