use crate::error::QuestionError;
use crate::models::configuration::{ConfigKey, Configuration};
use crate::utils::logging::truncate_text;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 平台换行符
#[cfg(windows)]
pub const EOL: &str = "\r\n";
/// 平台换行符
#[cfg(not(windows))]
pub const EOL: &str = "\n";

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// 选择题
    MultipleChoice,
    /// 问答题
    OpenEnded,
}

impl QuestionType {
    pub fn name(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "choices question",
            QuestionType::OpenEnded => "written question",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 题目草稿
///
/// 解析器在扫描过程中往这里累积内容，遇到答案块结束标记时转换为 [`Question`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    pub source: String,
    pub year: String,
    pub question_type: Option<QuestionType>,
    pub answer: String,
    pub histories: Vec<String>,
    pub tags: Vec<String>,
    pub texts: Vec<String>,
    pub choices: Vec<String>,
    pub wrongs: Vec<String>,
    pub explanations: Vec<String>,
}

impl QuestionDraft {
    /// 草稿是否还没有任何内容
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// 解析完成的题目
///
/// 反序列化同样经过 [`Question::from_draft`] 的校验
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord")]
pub struct Question {
    source: String,
    year: String,
    #[serde(rename = "type")]
    question_type: QuestionType,
    answer: String,
    histories: Vec<String>,
    tags: Vec<String>,
    texts: Vec<String>,
    choices: Vec<String>,
    wrongs: Vec<String>,
    explanations: Vec<String>,
    configuration: Configuration,
}

/// 题目的序列化形式
#[derive(Deserialize)]
struct QuestionRecord {
    source: String,
    year: String,
    #[serde(rename = "type")]
    question_type: QuestionType,
    answer: String,
    histories: Vec<String>,
    tags: Vec<String>,
    texts: Vec<String>,
    choices: Vec<String>,
    wrongs: Vec<String>,
    explanations: Vec<String>,
    configuration: Configuration,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        let draft = QuestionDraft {
            source: record.source,
            year: record.year,
            question_type: Some(record.question_type),
            answer: record.answer,
            histories: record.histories,
            tags: record.tags,
            texts: record.texts,
            choices: record.choices,
            wrongs: record.wrongs,
            explanations: record.explanations,
        };
        Question::from_draft(draft, &record.configuration)
    }
}

impl Question {
    /// 从草稿构造题目并校验不变量
    ///
    /// # 参数
    /// - `draft`: 累积的题目内容
    /// - `configuration`: 本题使用的标记配置（保存一份副本）
    ///
    /// # 返回
    /// 年份、题型或答案不合法时返回错误
    pub fn from_draft(
        draft: QuestionDraft,
        configuration: &Configuration,
    ) -> Result<Self, QuestionError> {
        let configuration = configuration.clone();

        if !is_valid_year(&draft.year) && draft.year != configuration.bad_year() {
            return Err(QuestionError::InvalidYear {
                year: draft.year,
                sentinel: configuration.bad_year().to_string(),
            });
        }

        let question_type = draft.question_type.ok_or(QuestionError::InvalidState)?;
        match question_type {
            QuestionType::OpenEnded => {
                if !draft.answer.is_empty() {
                    return Err(QuestionError::UnexpectedAnswer {
                        answer: draft.answer,
                    });
                }
            }
            QuestionType::MultipleChoice => {
                let position = draft
                    .choices
                    .iter()
                    .position(|choice| *choice == draft.answer)
                    .ok_or_else(|| QuestionError::AnswerNotInChoices {
                        answer: draft.answer.clone(),
                    })?;
                let mut expected = draft.choices.clone();
                expected.remove(position);
                if expected != draft.wrongs {
                    return Err(QuestionError::WrongsMismatch);
                }
            }
        }

        Ok(Self {
            source: draft.source,
            year: draft.year,
            question_type,
            answer: draft.answer,
            histories: draft.histories,
            tags: draft.tags,
            texts: draft.texts,
            choices: draft.choices,
            wrongs: draft.wrongs,
            explanations: draft.explanations,
            configuration,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    /// 正确选项的文本，问答题为空
    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn histories(&self) -> &[String] {
        &self.histories
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn wrongs(&self) -> &[String] {
        &self.wrongs
    }

    pub fn explanations(&self) -> &[String] {
        &self.explanations
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// 修改本题的标记配置，只影响本题的输出
    pub fn set_marker(
        &mut self,
        key: ConfigKey,
        value: impl Into<String>,
    ) -> Result<(), crate::error::ConfigurationError> {
        self.configuration.set(key, value)
    }

    /// 题干预览（用于日志）
    pub fn preview(&self) -> String {
        truncate_text(&self.texts.join(" "), 15)
    }

    /// 渲染为 LaTeX 文本
    ///
    /// 题干块和答案块之间用一个换行符连接
    pub fn render(&self) -> String {
        let configuration = &self.configuration;

        let mut body = vec![configuration.begin_question().to_string()];
        body.extend(self.texts.iter().cloned());
        if self.question_type == QuestionType::MultipleChoice {
            body.push(configuration.begin_choices().to_string());
            for choice in &self.choices {
                let marker = if *choice == self.answer {
                    configuration.correct()
                } else {
                    configuration.choice()
                };
                body.push(format!("{} {}", marker, choice));
            }
            body.push(configuration.end_choices().to_string());
        }
        body.push(configuration.end_question().to_string());

        let mut explanation = vec![configuration.begin_answer().to_string()];
        explanation.extend(self.explanations.iter().cloned());
        explanation.push(configuration.end_answer().to_string());

        format!("{}{}{}", body.join(EOL), EOL, explanation.join(EOL))
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

fn is_valid_year(year: &str) -> bool {
    year.len() == 4 && year.chars().all(|c| c.is_ascii_digit())
}
