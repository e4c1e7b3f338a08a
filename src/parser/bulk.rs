//! 题目批量解析
//!
//! 逐行扫描带标记的 LaTeX 文本，每遇到一组完整的"题干 + 答案"就生成一道 [`Question`]

use crate::error::{ConfigurationError, ParseError, QuestionError};
use crate::models::configuration::{ConfigKey, Configuration};
use crate::models::question::{Question, QuestionDraft, QuestionType, EOL};
use crate::parser::attributes::scan_attributes;
use crate::utils::logging::{truncate_text, truncate_with_prefix};
use std::fmt;
use tracing::{debug, info, warn};

/// 扫描位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// 不在任何块内
    Outside,
    /// 题干中
    InsideQuestionBody,
    /// 答案中
    InsideAnswerBody,
    /// 没有正在进行的读取
    Unset,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Location::Outside => "块外",
            Location::InsideQuestionBody => "题干中",
            Location::InsideAnswerBody => "答案中",
            Location::Unset => "未开始",
        };
        write!(f, "{}", name)
    }
}

/// label / origin 属性校验失败的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeWarning {
    pub line: usize,
    pub key: String,
    pub value: String,
    pub source: String,
}

impl fmt::Display for AttributeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "第 {} 行: {}={} 不在来源 {:?} 中",
            self.line, self.key, self.value, self.source
        )
    }
}

/// 题目解析器
///
/// 职责：
/// - 维护扫描位置和当前题目的草稿
/// - 按顺序保存已完成的题目
/// - 记录属性校验警告（不中断解析）
#[derive(Debug)]
pub struct Parser {
    location: Location,
    draft: QuestionDraft,
    questions: Vec<Question>,
    warnings: Vec<AttributeWarning>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// 创建空的解析器
    pub fn new() -> Self {
        Self {
            location: Location::Unset,
            draft: QuestionDraft::default(),
            questions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// 当前题目的累积内容
    pub fn draft(&self) -> &QuestionDraft {
        &self.draft
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn warnings(&self) -> &[AttributeWarning] {
        &self.warnings
    }

    /// 取走已记录的警告
    pub fn take_warnings(&mut self) -> Vec<AttributeWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// 读取一组文本行
    ///
    /// 若上一次读取在题目中途结束，残留的草稿会先被丢弃。
    /// 读取结束（包括出错）后位置重置为 [`Location::Unset`]；未完成的题目不会被生成。
    ///
    /// # 参数
    /// - `lines`: 已按行切分的文本
    /// - `configuration`: 标记配置，每道题保存一份副本
    ///
    /// # 返回
    /// 本次新增的题目数量；遇到结构错误时返回 [`ParseError`]
    pub fn read<I, S>(
        &mut self,
        lines: I,
        configuration: &Configuration,
    ) -> Result<usize, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.draft.is_empty() {
            warn!(
                "⚠️ 丢弃上次读取残留的未完成题目: {}",
                truncate_text(&self.draft.source, 30)
            );
            self.clear(false);
        }

        let configuration = configuration.clone();
        let before = self.questions.len();
        self.location = Location::Outside;

        let result = self.scan(lines, &configuration);
        if result.is_ok() && !self.draft.is_empty() {
            warn!("⚠️ 输入在题目中途结束（位置: {}），该题不会被生成", self.location);
        }
        self.location = Location::Unset;
        result?;

        let found = self.questions.len() - before;
        debug!("本次读取新增 {} 道题目", found);
        Ok(found)
    }

    fn scan<I, S>(&mut self, lines: I, configuration: &Configuration) -> Result<(), ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (index, raw) in lines.into_iter().enumerate() {
            let line_number = index + 1;
            let line = raw.as_ref().trim();
            debug!("{}", truncate_with_prefix(&format!("{}: ", line_number), line, 79));
            self.scan_line(line, line_number, configuration)?;
        }
        Ok(())
    }

    fn scan_line(
        &mut self,
        line: &str,
        line_number: usize,
        configuration: &Configuration,
    ) -> Result<(), ParseError> {
        if let Some(comment) = line.strip_prefix('%') {
            self.read_comment(comment.trim(), line_number, configuration)?;
        } else if line.starts_with(configuration.begin_question()) {
            self.check_attributes(line, line_number, configuration);
        } else if line.starts_with(configuration.begin_choices()) {
            self.draft.question_type = Some(QuestionType::MultipleChoice);
        } else if let Some(choice) = line.strip_prefix(configuration.choice()) {
            self.require_choices(line_number)?;
            self.draft.choices.push(choice.trim().to_string());
        } else if let Some(correct) = line.strip_prefix(configuration.correct()) {
            self.require_choices(line_number)?;
            self.draft.answer = correct.trim().to_string();
            self.draft.choices.push(self.draft.answer.clone());
        } else if line.starts_with(configuration.end_choices()) {
            let mut wrongs = self.draft.choices.clone();
            let position = wrongs
                .iter()
                .position(|choice| *choice == self.draft.answer)
                .ok_or_else(|| ParseError::MissingCorrectChoice {
                    line: line_number,
                    answer: self.draft.answer.clone(),
                })?;
            wrongs.remove(position);
            self.draft.wrongs = wrongs;
        } else if line.starts_with(configuration.end_question()) {
            self.expect_location(
                Location::InsideQuestionBody,
                ConfigKey::EndQuestion,
                line_number,
            )?;
            self.location = Location::Outside;
            if self.draft.question_type.is_none() {
                self.draft.question_type = Some(QuestionType::OpenEnded);
            }
        } else if line.starts_with(configuration.begin_answer()) {
            self.expect_location(Location::Outside, ConfigKey::BeginAnswer, line_number)?;
            self.location = Location::InsideAnswerBody;
        } else if line.starts_with(configuration.end_answer()) {
            self.expect_location(Location::InsideAnswerBody, ConfigKey::EndAnswer, line_number)?;
            let question = self
                .get_question(configuration)
                .map_err(|source| ParseError::InvalidQuestion {
                    line: line_number,
                    source,
                })?;
            info!(
                "✓ 新题目 #{}: {} [{} {}]",
                self.questions.len() + 1,
                question.preview(),
                question.source(),
                question.year()
            );
            self.questions.push(question);
            self.location = Location::Outside;
        } else if !line.is_empty() {
            match self.location {
                Location::InsideQuestionBody => self.draft.texts.push(line.to_string()),
                Location::InsideAnswerBody => self.draft.explanations.push(line.to_string()),
                _ => debug!("忽略块外文本: {}", truncate_text(line, 40)),
            }
        }
        Ok(())
    }

    /// 处理 `%` 注释行
    ///
    /// 块外的注释开始一道新题（`% UFPR-PR 2014`）；题目内识别使用记录和标签前缀
    fn read_comment(
        &mut self,
        comment: &str,
        line_number: usize,
        configuration: &Configuration,
    ) -> Result<(), ParseError> {
        if self.location == Location::Outside {
            self.draft.question_type = None;
            self.location = Location::InsideQuestionBody;

            let tokens: Vec<&str> = comment.split_whitespace().collect();
            let (year, source) = tokens
                .split_last()
                .ok_or(ParseError::MalformedHeader { line: line_number })?;
            self.draft.source = source.join(" ");
            self.draft.year = year.to_string();
            debug!("题目开始: 来源 {:?}, 年份 {:?}", self.draft.source, self.draft.year);
        } else if let Some(histories) = comment.strip_prefix(configuration.uso()) {
            self.draft.histories.extend(split_list(histories));
        } else if let Some(tags) = comment.strip_prefix(configuration.tags()) {
            self.draft.tags.extend(split_list(tags));
        }
        Ok(())
    }

    /// 校验题目起始行上的 label / origin 属性是否出现在来源中
    fn check_attributes(&mut self, line: &str, line_number: usize, configuration: &Configuration) {
        let source = self.draft.source.to_lowercase();
        let label = configuration.label().to_lowercase();
        let origin = configuration.origin().to_lowercase();

        for attribute in scan_attributes(line) {
            let key = attribute.key.to_lowercase();
            let value = attribute.value.to_lowercase();
            let expected = if key == label {
                value.strip_prefix("q:").unwrap_or(&value)
            } else if key == origin {
                value.trim_matches(|c: char| matches!(c, '{' | '}' | '[' | ']'))
            } else {
                continue;
            };

            if source.contains(expected) {
                debug!("✓ {}={} 校验通过", key, value);
            } else {
                let warning = AttributeWarning {
                    line: line_number,
                    key,
                    value,
                    source: self.draft.source.clone(),
                };
                warn!("⚠️ {}", warning);
                self.warnings.push(warning);
            }
        }
    }

    fn require_choices(&self, line_number: usize) -> Result<(), ParseError> {
        if self.draft.question_type == Some(QuestionType::MultipleChoice) {
            Ok(())
        } else {
            Err(ParseError::ChoiceOutsideChoices { line: line_number })
        }
    }

    fn expect_location(
        &self,
        expected: Location,
        marker: ConfigKey,
        line_number: usize,
    ) -> Result<(), ParseError> {
        if self.location == expected {
            return Ok(());
        }
        Err(ParseError::UnexpectedMarker {
            line: line_number,
            marker: marker.name().to_string(),
            expected: expected.to_string(),
            found: self.location.to_string(),
        })
    }

    /// 用当前草稿构造题目，并清空草稿
    pub fn get_question(
        &mut self,
        configuration: &Configuration,
    ) -> Result<Question, QuestionError> {
        let draft = std::mem::take(&mut self.draft);
        Question::from_draft(draft, configuration)
    }

    /// 渲染全部题目，题目之间空一行
    ///
    /// 没有题目时返回 `None`
    pub fn pretty_print(&self) -> Option<String> {
        if self.questions.is_empty() {
            info!("没有成功解析的题目");
            return None;
        }
        let rendered: Vec<String> = self.questions.iter().map(Question::render).collect();
        Some(rendered.join(EOL.repeat(2).as_str()))
    }

    /// 清空当前题目的草稿；`total` 为真时同时清空已完成的题目和警告
    pub fn clear(&mut self, total: bool) {
        self.draft = QuestionDraft::default();
        if total {
            self.questions.clear();
            self.warnings.clear();
        }
    }

    /// 把配置变更应用到所有已完成题目的标记上
    pub fn apply_changes(
        &mut self,
        changes: &[(ConfigKey, String)],
    ) -> Result<(), ConfigurationError> {
        for question in &mut self.questions {
            for (key, value) in changes {
                question.set_marker(*key, value.as_str())?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Parser {
    /// 显示前三道题的预览
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let previews: Vec<String> = self.questions.iter().take(3).map(Question::preview).collect();
        write!(f, "{}", truncate_with_prefix("题目: ", &previews.join(", "), 79))
    }
}

fn split_list(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_a() -> Vec<&'static str> {
        vec![
            "% SRC 2020",
            "Question body line.",
            r"\end{Exercise}",
            r"\begin{Answer}",
            "Explanation line.",
            r"\end{Answer}",
        ]
    }

    fn scenario_b() -> Vec<&'static str> {
        vec![
            "% UFPR 2014",
            "Prompt.",
            r"\begin{choices}",
            r"\choice wrong1",
            r"\CorrectChoice correct1",
            r"\choice wrong2",
            r"\end{choices}",
            r"\end{Exercise}",
            r"\begin{Answer}",
            "Because reasons.",
            r"\end{Answer}",
        ]
    }

    fn parse(lines: &[&str]) -> Parser {
        let mut parser = Parser::new();
        parser.read(lines, &Configuration::default()).unwrap();
        parser
    }

    #[test]
    fn test_minimal_open_ended_exercise() {
        let parser = parse(&scenario_a());

        assert_eq!(parser.questions().len(), 1);
        let question = &parser.questions()[0];
        assert_eq!(question.source(), "SRC");
        assert_eq!(question.year(), "2020");
        assert_eq!(question.question_type(), QuestionType::OpenEnded);
        assert_eq!(question.texts(), ["Question body line."]);
        assert_eq!(question.explanations(), ["Explanation line."]);
        assert_eq!(question.answer(), "");
    }

    #[test]
    fn test_multiple_choice_exercise() {
        let parser = parse(&scenario_b());

        let question = &parser.questions()[0];
        assert_eq!(question.question_type(), QuestionType::MultipleChoice);
        assert_eq!(question.answer(), "correct1");
        assert_eq!(question.choices(), ["wrong1", "correct1", "wrong2"]);
        assert_eq!(question.wrongs(), ["wrong1", "wrong2"]);
        assert_eq!(question.explanations(), ["Because reasons."]);
    }

    #[test]
    fn test_source_with_several_tokens() {
        let mut lines = scenario_a();
        lines[0] = "%  UFRJ RJ   2011 ";
        let parser = parse(&lines);

        assert_eq!(parser.questions()[0].source(), "UFRJ RJ");
        assert_eq!(parser.questions()[0].year(), "2011");
    }

    #[test]
    fn test_usage_and_tags_comments() {
        let mut lines = scenario_a();
        lines.insert(1, "% Uso: lista01, aula13");
        lines.insert(2, "% Tags: figuras de linguagem,  sintaxe");
        lines.insert(3, "% um comentário qualquer");
        let parser = parse(&lines);

        let question = &parser.questions()[0];
        assert_eq!(question.histories(), ["lista01", "aula13"]);
        assert_eq!(question.tags(), ["figuras de linguagem", "sintaxe"]);
        assert_eq!(question.texts(), ["Question body line."]);
    }

    #[test]
    fn test_questions_in_source_order() {
        let mut lines = scenario_a();
        lines.push("");
        lines.extend(scenario_b());
        lines.push("texto solto fora dos blocos");
        lines.extend(scenario_a());
        let parser = parse(&lines);

        let sources: Vec<&str> = parser.questions().iter().map(Question::source).collect();
        assert_eq!(sources, ["SRC", "UFPR", "SRC"]);
        assert_eq!(parser.location(), Location::Unset);
    }

    #[test]
    fn test_missing_correct_choice_is_an_error() {
        let lines: Vec<&str> = scenario_b()
            .into_iter()
            .filter(|line| !line.starts_with(r"\CorrectChoice"))
            .collect();
        let mut parser = Parser::new();
        let result = parser.read(&lines, &Configuration::default());

        assert!(matches!(result, Err(ParseError::MissingCorrectChoice { line: 6, .. })));
        assert!(parser.questions().is_empty());
        assert_eq!(parser.location(), Location::Unset);
    }

    #[test]
    fn test_choice_outside_choices_block_is_an_error() {
        let lines = ["% UFPR 2014", "Prompt.", r"\choice wrong1"];
        let mut parser = Parser::new();
        let result = parser.read(lines, &Configuration::default());

        assert_eq!(result, Err(ParseError::ChoiceOutsideChoices { line: 3 }));
    }

    #[test]
    fn test_correct_choice_outside_choices_block_is_an_error() {
        let lines = ["% UFPR 2014", "Prompt.", r"\CorrectChoice correct1"];
        let mut parser = Parser::new();
        let result = parser.read(lines, &Configuration::default());

        assert_eq!(result, Err(ParseError::ChoiceOutsideChoices { line: 3 }));
        assert!(parser.questions().is_empty());
        assert_eq!(parser.location(), Location::Unset);
    }

    #[test]
    fn test_end_answer_outside_answer_is_an_error() {
        let lines = ["% SRC 2020", "Body.", r"\end{Answer}"];
        let mut parser = Parser::new();
        let result = parser.read(lines, &Configuration::default());

        assert_eq!(
            result,
            Err(ParseError::UnexpectedMarker {
                line: 3,
                marker: "END_ANSWER".to_string(),
                expected: Location::InsideAnswerBody.to_string(),
                found: Location::InsideQuestionBody.to_string(),
            })
        );
        assert!(parser.questions().is_empty());
    }

    #[test]
    fn test_end_question_outside_question_is_an_error() {
        let lines = [r"\end{Exercise}"];
        let mut parser = Parser::new();
        let result = parser.read(lines, &Configuration::default());

        assert!(matches!(result, Err(ParseError::UnexpectedMarker { line: 1, .. })));
    }

    #[test]
    fn test_begin_answer_inside_question_is_an_error() {
        let lines = ["% SRC 2020", "Body.", r"\begin{Answer}"];
        let mut parser = Parser::new();
        let result = parser.read(lines, &Configuration::default());

        assert!(matches!(result, Err(ParseError::UnexpectedMarker { line: 3, .. })));
    }

    #[test]
    fn test_invalid_year_fails_at_end_of_answer() {
        let mut lines = scenario_a();
        lines[0] = "% SRC vinte";
        let mut parser = Parser::new();
        let result = parser.read(&lines, &Configuration::default());

        assert!(matches!(
            result,
            Err(ParseError::InvalidQuestion {
                line: 6,
                source: QuestionError::InvalidYear { .. }
            })
        ));
    }

    #[test]
    fn test_empty_header_is_an_error() {
        let mut parser = Parser::new();
        let result = parser.read(["%"], &Configuration::default());
        assert_eq!(result, Err(ParseError::MalformedHeader { line: 1 }));
    }

    #[test]
    fn test_label_and_origin_warnings() {
        let mut lines = scenario_a();
        lines.insert(1, r"\begin{Exercise}[label=q:src, origin={OTHER}, color=red]");
        let parser = parse(&lines);

        assert_eq!(parser.questions().len(), 1);
        assert_eq!(parser.warnings().len(), 1);
        let warning = &parser.warnings()[0];
        assert_eq!(warning.key, "origin");
        assert_eq!(warning.value, "{other}");
        assert_eq!(warning.line, 2);
    }

    #[test]
    fn test_matching_attributes_produce_no_warning() {
        let lines = [
            "% UFA-AM 2019",
            r"\begin{Exercise}[label=Q:ufa,origin={UFA-AM}]",
            "Body.",
            r"\end{Exercise}",
            r"\begin{Answer}",
            r"\end{Answer}",
        ];
        let parser = parse(&lines);

        assert!(parser.warnings().is_empty());
        assert_eq!(parser.questions()[0].explanations().len(), 0);
    }

    #[test]
    fn test_zero_lines_keep_previous_questions() {
        let mut parser = parse(&scenario_a());
        let found = parser.read(Vec::<String>::new(), &Configuration::default()).unwrap();

        assert_eq!(found, 0);
        assert_eq!(parser.questions().len(), 1);
    }

    #[test]
    fn test_unfinished_exercise_is_not_emitted() {
        let lines = scenario_b();
        let mut parser = Parser::new();
        let found = parser.read(&lines[..9], &Configuration::default()).unwrap();

        assert_eq!(found, 0);
        assert!(parser.questions().is_empty());
        assert!(!parser.draft().is_empty());
        assert_eq!(parser.location(), Location::Unset);
    }

    #[test]
    fn test_leftover_draft_is_discarded_on_next_read() {
        let mut parser = Parser::new();
        parser.read(&scenario_b()[..5], &Configuration::default()).unwrap();
        let found = parser.read(scenario_a(), &Configuration::default()).unwrap();

        assert_eq!(found, 1);
        let question = &parser.questions()[0];
        assert_eq!(question.source(), "SRC");
        assert_eq!(question.texts(), ["Question body line."]);
        assert!(question.choices().is_empty());
    }

    #[test]
    fn test_questions_do_not_alias_buffers() {
        let mut parser = parse(&scenario_b());
        parser.read(scenario_a(), &Configuration::default()).unwrap();

        assert_eq!(parser.questions()[0].texts(), ["Prompt."]);
        assert_eq!(parser.questions()[1].texts(), ["Question body line."]);
        assert!(parser.draft().is_empty());
    }

    #[test]
    fn test_custom_markers() {
        let configuration = Configuration::from_pairs([
            ("BEGIN_CHOICES", r"\begin{itemize}"),
            ("END_CHOICES", r"\end{itemize}"),
            ("CHOICE", r"\wrong"),
            ("CORRECT", r"\right"),
        ])
        .unwrap();
        let lines = [
            "% ENEM 2021",
            "Prompt.",
            r"\begin{itemize}",
            r"\wrong a",
            r"\right b",
            r"\end{itemize}",
            r"\end{Exercise}",
            r"\begin{Answer}",
            r"\end{Answer}",
        ];
        let mut parser = Parser::new();
        parser.read(lines, &configuration).unwrap();

        let question = &parser.questions()[0];
        assert_eq!(question.answer(), "b");
        assert_eq!(question.wrongs(), ["a"]);
        assert_eq!(question.configuration(), &configuration);
    }

    #[test]
    fn test_render_then_parse_round_trip() {
        let parser = parse(&scenario_b());
        let original = &parser.questions()[0];

        let rendered = format!("% UFPR 2014{}{}", EOL, original.render());
        let reparsed = parse(&rendered.lines().collect::<Vec<_>>());

        assert_eq!(&reparsed.questions()[0], original);
    }

    #[test]
    fn test_pretty_print() {
        let mut parser = Parser::new();
        assert_eq!(parser.pretty_print(), None);

        parser.read(scenario_a(), &Configuration::default()).unwrap();
        parser.read(scenario_b(), &Configuration::default()).unwrap();
        let output = parser.pretty_print().unwrap();
        let separator = EOL.repeat(2);

        assert_eq!(
            output,
            format!(
                "{}{}{}",
                parser.questions()[0].render(),
                separator,
                parser.questions()[1].render()
            )
        );
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut parser = Parser::new();
        parser.read(&scenario_b()[..4], &Configuration::default()).unwrap();
        parser.clear(false);
        let once = parser.draft().clone();
        parser.clear(false);

        assert_eq!(parser.draft(), &once);
        assert!(parser.draft().is_empty());
    }

    #[test]
    fn test_total_clear_empties_questions() {
        let mut parser = parse(&scenario_a());
        parser.read(&scenario_b()[..3], &Configuration::default()).unwrap();
        parser.clear(true);

        assert!(parser.questions().is_empty());
        assert!(parser.draft().is_empty());
        assert_eq!(parser.pretty_print(), None);
    }

    #[test]
    fn test_apply_changes_updates_every_question() {
        let mut parser = parse(&scenario_b());
        parser.read(scenario_b(), &Configuration::default()).unwrap();

        let session = Configuration::default();
        let updated = Configuration::from_pairs([("CORRECT", r"\correct")]).unwrap();
        parser.apply_changes(&session.changes(&updated)).unwrap();

        for question in parser.questions() {
            assert_eq!(question.configuration(), &updated);
            assert!(question.render().contains(r"\correct correct1"));
        }
    }

    #[test]
    fn test_display_previews_first_three() {
        let mut parser = Parser::new();
        for _ in 0..4 {
            parser.read(scenario_a(), &Configuration::default()).unwrap();
        }
        let text = parser.to_string();

        assert!(text.starts_with("题目: Question body l..."));
        assert_eq!(text.matches("Question body l...").count(), 3);
    }
}
