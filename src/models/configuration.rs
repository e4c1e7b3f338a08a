//! 标记配置
//!
//! 键集合固定为 [`ConfigKey`] 的全部成员，只能修改值

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 配置键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigKey {
    /// 未知年份标记
    BadYear,
    /// 使用记录前缀
    Uso,
    /// 标签前缀
    Tags,
    /// label 属性名
    Label,
    /// origin 属性名
    Origin,
    BeginQuestion,
    EndQuestion,
    BeginChoices,
    EndChoices,
    Choice,
    /// 正确选项标记
    Correct,
    BeginAnswer,
    EndAnswer,
}

static KEYS_BY_NAME: phf::Map<&'static str, ConfigKey> = phf::phf_map! {
    "BAD_YEAR" => ConfigKey::BadYear,
    "USO" => ConfigKey::Uso,
    "TAGS" => ConfigKey::Tags,
    "LABEL" => ConfigKey::Label,
    "ORIGIN" => ConfigKey::Origin,
    "BEGIN_QUESTION" => ConfigKey::BeginQuestion,
    "END_QUESTION" => ConfigKey::EndQuestion,
    "BEGIN_CHOICES" => ConfigKey::BeginChoices,
    "END_CHOICES" => ConfigKey::EndChoices,
    "CHOICE" => ConfigKey::Choice,
    "CORRECT" => ConfigKey::Correct,
    "BEGIN_ANSWER" => ConfigKey::BeginAnswer,
    "END_ANSWER" => ConfigKey::EndAnswer,
};

impl ConfigKey {
    /// 全部配置键（顺序即存储顺序）
    pub const ALL: [ConfigKey; 13] = [
        ConfigKey::BadYear,
        ConfigKey::Uso,
        ConfigKey::Tags,
        ConfigKey::Label,
        ConfigKey::Origin,
        ConfigKey::BeginQuestion,
        ConfigKey::EndQuestion,
        ConfigKey::BeginChoices,
        ConfigKey::EndChoices,
        ConfigKey::Choice,
        ConfigKey::Correct,
        ConfigKey::BeginAnswer,
        ConfigKey::EndAnswer,
    ];

    /// 获取配置键名称
    pub fn name(self) -> &'static str {
        match self {
            ConfigKey::BadYear => "BAD_YEAR",
            ConfigKey::Uso => "USO",
            ConfigKey::Tags => "TAGS",
            ConfigKey::Label => "LABEL",
            ConfigKey::Origin => "ORIGIN",
            ConfigKey::BeginQuestion => "BEGIN_QUESTION",
            ConfigKey::EndQuestion => "END_QUESTION",
            ConfigKey::BeginChoices => "BEGIN_CHOICES",
            ConfigKey::EndChoices => "END_CHOICES",
            ConfigKey::Choice => "CHOICE",
            ConfigKey::Correct => "CORRECT",
            ConfigKey::BeginAnswer => "BEGIN_ANSWER",
            ConfigKey::EndAnswer => "END_ANSWER",
        }
    }

    /// 获取默认值
    pub fn default_value(self) -> &'static str {
        match self {
            ConfigKey::BadYear => "XXXX",
            ConfigKey::Uso => "Uso:",
            ConfigKey::Tags => "Tags:",
            ConfigKey::Label => "label",
            ConfigKey::Origin => "origin",
            ConfigKey::BeginQuestion => r"\begin{Exercise}",
            ConfigKey::EndQuestion => r"\end{Exercise}",
            ConfigKey::BeginChoices => r"\begin{choices}",
            ConfigKey::EndChoices => r"\end{choices}",
            ConfigKey::Choice => r"\choice",
            ConfigKey::Correct => r"\CorrectChoice",
            ConfigKey::BeginAnswer => r"\begin{Answer}",
            ConfigKey::EndAnswer => r"\end{Answer}",
        }
    }

    /// 从名称解析配置键（不区分大小写）
    pub fn from_name(name: &str) -> Option<Self> {
        KEYS_BY_NAME
            .get(name.trim().to_ascii_uppercase().as_str())
            .copied()
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 标记配置
///
/// 每个 [`ConfigKey`] 恰好对应一个值。克隆得到的是独立副本。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct Configuration {
    values: [String; 13],
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            values: ConfigKey::ALL.map(|key| key.default_value().to_string()),
        }
    }
}

impl Configuration {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 在默认配置的基础上应用覆盖项
    ///
    /// # 参数
    /// - `overrides`: 名称到值的映射，名称必须全部合法
    pub fn from_pairs<I, K, V>(overrides: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut configuration = Self::default();
        configuration.update(overrides)?;
        Ok(configuration)
    }

    /// 从 TOML 表构造配置，值必须全部是字符串
    pub fn from_toml_table(table: &toml::Table) -> Result<Self, ConfigurationError> {
        let mut configuration = Self::default();
        configuration.check_names(table.keys())?;
        for (name, value) in table {
            configuration.set_toml_value(name, value)?;
        }
        Ok(configuration)
    }

    /// 按键读取
    pub fn get(&self, key: ConfigKey) -> &str {
        &self.values[key.index()]
    }

    /// 按名称读取
    pub fn get_by_name(&self, name: &str) -> Result<&str, ConfigurationError> {
        ConfigKey::from_name(name)
            .map(|key| self.get(key))
            .ok_or_else(|| ConfigurationError::InvalidKey {
                keys: name.to_string(),
            })
    }

    /// 按键写入
    pub fn set(
        &mut self,
        key: ConfigKey,
        value: impl Into<String>,
    ) -> Result<(), ConfigurationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue {
                key: key.name().to_string(),
                value: format!("{value:?}"),
            });
        }
        self.values[key.index()] = value;
        Ok(())
    }

    /// 按名称写入
    pub fn set_by_name(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), ConfigurationError> {
        let key = ConfigKey::from_name(name).ok_or_else(|| ConfigurationError::InvalidKey {
            keys: name.to_string(),
        })?;
        self.set(key, value)
    }

    /// 写入一个来自 TOML 的值，非字符串值会被拒绝
    pub fn set_toml_value(
        &mut self,
        name: &str,
        value: &toml::Value,
    ) -> Result<(), ConfigurationError> {
        match value {
            toml::Value::String(text) => self.set_by_name(name, text.as_str()),
            other => Err(ConfigurationError::InvalidValue {
                key: name.to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// 合并覆盖项
    ///
    /// 只要有一个名称不合法，整个更新都不会生效；未出现的键保留原值
    pub fn update<I, K, V>(&mut self, overrides: I) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let overrides: Vec<(K, V)> = overrides.into_iter().collect();
        self.check_names(overrides.iter().map(|(name, _)| name))?;

        let mut updated = self.clone();
        for (name, value) in &overrides {
            updated.set_by_name(name.as_ref(), value.as_ref())?;
        }
        *self = updated;
        Ok(())
    }

    /// 配置项永远不能删除
    pub fn remove(&mut self, name: &str) -> Result<(), ConfigurationError> {
        Err(ConfigurationError::Undeletable {
            key: name.to_string(),
        })
    }

    /// 列出 `other` 中与当前配置不同的项
    pub fn changes(&self, other: &Configuration) -> Vec<(ConfigKey, String)> {
        ConfigKey::ALL
            .into_iter()
            .filter(|key| self.get(*key) != other.get(*key))
            .map(|key| (key, other.get(key).to_string()))
            .collect()
    }

    /// 按键顺序遍历所有配置项
    pub fn iter(&self) -> impl Iterator<Item = (ConfigKey, &str)> {
        ConfigKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    fn check_names<I, K>(&self, names: I) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut illegal: Vec<String> = names
            .into_iter()
            .filter(|name| ConfigKey::from_name(name.as_ref()).is_none())
            .map(|name| name.as_ref().to_string())
            .collect();
        if illegal.is_empty() {
            return Ok(());
        }
        illegal.sort();
        Err(ConfigurationError::InvalidKey {
            keys: illegal.join(", "),
        })
    }

    // ========== 具名访问器 ==========

    pub fn bad_year(&self) -> &str {
        self.get(ConfigKey::BadYear)
    }

    pub fn uso(&self) -> &str {
        self.get(ConfigKey::Uso)
    }

    pub fn tags(&self) -> &str {
        self.get(ConfigKey::Tags)
    }

    pub fn label(&self) -> &str {
        self.get(ConfigKey::Label)
    }

    pub fn origin(&self) -> &str {
        self.get(ConfigKey::Origin)
    }

    pub fn begin_question(&self) -> &str {
        self.get(ConfigKey::BeginQuestion)
    }

    pub fn end_question(&self) -> &str {
        self.get(ConfigKey::EndQuestion)
    }

    pub fn begin_choices(&self) -> &str {
        self.get(ConfigKey::BeginChoices)
    }

    pub fn end_choices(&self) -> &str {
        self.get(ConfigKey::EndChoices)
    }

    pub fn choice(&self) -> &str {
        self.get(ConfigKey::Choice)
    }

    pub fn correct(&self) -> &str {
        self.get(ConfigKey::Correct)
    }

    pub fn begin_answer(&self) -> &str {
        self.get(ConfigKey::BeginAnswer)
    }

    pub fn end_answer(&self) -> &str {
        self.get(ConfigKey::EndAnswer)
    }
}

impl fmt::Display for Configuration {
    /// 输出为 "KEY: value, KEY: value"，按键名排序
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sorted: BTreeMap<&str, &str> = self
            .iter()
            .map(|(key, value)| (key.name(), value))
            .collect();
        let items: Vec<String> = sorted
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect();
        write!(f, "{}", items.join(", "))
    }
}

impl TryFrom<BTreeMap<String, String>> for Configuration {
    type Error = ConfigurationError;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        Self::from_pairs(map)
    }
}

impl From<Configuration> for BTreeMap<String, String> {
    fn from(configuration: Configuration) -> Self {
        configuration
            .iter()
            .map(|(key, value)| (key.name().to_string(), value.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let configuration = Configuration::default();
        assert_eq!(configuration.begin_question(), r"\begin{Exercise}");
        assert_eq!(configuration.correct(), r"\CorrectChoice");
        assert_eq!(configuration.bad_year(), "XXXX");
        assert_eq!(configuration.iter().count(), 13);
    }

    #[test]
    fn test_key_names_round_trip() {
        for key in ConfigKey::ALL {
            assert_eq!(ConfigKey::from_name(key.name()), Some(key));
        }
        assert_eq!(ConfigKey::from_name("begin_answer"), Some(ConfigKey::BeginAnswer));
        assert_eq!(ConfigKey::from_name("NOPE"), None);
    }

    #[test]
    fn test_update_rejects_unknown_keys_without_partial_change() {
        let mut configuration = Configuration::default();
        let result = configuration.update([("CHOICE", r"\item"), ("FOO", "bar")]);

        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidKey { ref keys }) if keys == "FOO"
        ));
        assert_eq!(configuration.choice(), r"\choice");
    }

    #[test]
    fn test_update_keeps_untouched_keys() {
        let mut configuration = Configuration::default();
        configuration.update([("CHOICE", r"\item")]).unwrap();

        assert_eq!(configuration.choice(), r"\item");
        assert_eq!(configuration.correct(), r"\CorrectChoice");
    }

    #[test]
    fn test_set_rejects_empty_value() {
        let mut configuration = Configuration::default();
        let result = configuration.set(ConfigKey::Choice, "  ");
        assert!(matches!(result, Err(ConfigurationError::InvalidValue { .. })));
    }

    #[test]
    fn test_set_by_name_rejects_unknown_key() {
        let mut configuration = Configuration::default();
        let result = configuration.set_by_name("COLOR", "red");
        assert!(matches!(result, Err(ConfigurationError::InvalidKey { .. })));
    }

    #[test]
    fn test_toml_value_must_be_text() {
        let table: toml::Table = toml::from_str("CHOICE = 3").unwrap();
        let result = Configuration::from_toml_table(&table);
        assert!(matches!(result, Err(ConfigurationError::InvalidValue { .. })));
    }

    #[test]
    fn test_remove_always_fails() {
        let mut configuration = Configuration::default();
        assert!(matches!(
            configuration.remove("CHOICE"),
            Err(ConfigurationError::Undeletable { .. })
        ));
        assert_eq!(configuration.choice(), r"\choice");
    }

    #[test]
    fn test_display_is_sorted() {
        let text = Configuration::default().to_string();
        assert!(text.starts_with(r"BAD_YEAR: XXXX, BEGIN_ANSWER: \begin{Answer}, "));
        assert!(text.ends_with("USO: Uso:"));
    }

    #[test]
    fn test_copies_are_independent() {
        let original = Configuration::default();
        let mut copy = original.clone();
        copy.set(ConfigKey::Tags, "Assuntos:").unwrap();

        assert_eq!(original.tags(), "Tags:");
        assert_ne!(original, copy);
    }

    #[test]
    fn test_changes_lists_differing_values() {
        let original = Configuration::default();
        let other = Configuration::from_pairs([("END_ANSWER", r"\end{Solution}")]).unwrap();

        assert_eq!(
            original.changes(&other),
            vec![(ConfigKey::EndAnswer, r"\end{Solution}".to_string())]
        );
        assert!(original.changes(&original.clone()).is_empty());
    }

    #[test]
    fn test_serde_json_round_trip() {
        let configuration = Configuration::from_pairs([("USO", "Usage:")]).unwrap();
        let json = serde_json::to_string(&configuration).unwrap();
        let back: Configuration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, configuration);
    }
}
