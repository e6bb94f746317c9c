//! Two-step resume evaluation: structure, then grade.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analyze::{FileInfo, FormatAnalyzer, FormatReport};
use crate::error::{Error, Result};
use crate::render::document_text;

use super::{GenerativeModel, Rubric};

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?m)^```(?:json)?|```$").expect("fence pattern is valid"))
}

/// Remove Markdown code fences around a model reply.
pub fn strip_json_fences(reply: &str) -> String {
    fence_pattern()
        .replace_all(reply.trim(), "")
        .trim()
        .to_string()
}

/// Slice from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Resume content as structured by the model.
///
/// The shape is whatever the rubric asked for; it is carried as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedResume(serde_json::Value);

impl ParsedResume {
    /// Parse a (fence-stripped) JSON reply.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self(serde_json::from_str(json)?))
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Look up a top-level section, e.g. `"Skills"`.
    pub fn section(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }
}

impl fmt::Display for ParsedResume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-category scores as returned by the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    #[serde(rename = "Skill_Alignment")]
    pub skill_alignment: f64,
    #[serde(rename = "Experience_Relevance")]
    pub experience_relevance: f64,
    #[serde(rename = "Internship_Quality")]
    pub internship_quality: f64,
    #[serde(rename = "Soft_Skills")]
    pub soft_skills: f64,
    #[serde(rename = "Impactful_Contributions")]
    pub impactful_contributions: f64,
    #[serde(rename = "Miscellaneous_Score")]
    pub miscellaneous: f64,
    #[serde(rename = "Format_Score")]
    pub format: f64,
    /// The model's own weighted total
    pub weighted_total: f64,
}

#[derive(Debug, Deserialize)]
struct ScoreReply {
    scores: CategoryScores,
    #[serde(default)]
    evaluation: String,
}

/// Graded resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub scores: CategoryScores,
    /// The model's justification
    pub evaluation: String,
    /// Weighted total recomputed from the category scores, rounded
    pub computed_total: i64,
}

impl Evaluation {
    /// The reported ATS score: the model's weighted total.
    pub fn ats_score(&self) -> f64 {
        self.scores.weighted_total
    }
}

/// Everything produced for one resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsReport {
    pub parsed_resume: ParsedResume,
    pub format: FormatReport,
    pub evaluation: Evaluation,
}

/// Pipeline stage announced by [`ResumeEvaluator::evaluate_with_progress`]
/// before it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationStep {
    ExtractText,
    ParseResume,
    ScoreResume,
}

impl EvaluationStep {
    /// Short status line for the stage.
    pub fn message(self) -> &'static str {
        match self {
            EvaluationStep::ExtractText => "Extracting text from PDF...",
            EvaluationStep::ParseResume => "Parsing resume...",
            EvaluationStep::ScoreResume => "Scoring resume...",
        }
    }
}

/// Runs a rubric against a model.
pub struct ResumeEvaluator<M, R> {
    model: M,
    rubric: R,
}

impl<M: GenerativeModel, R: Rubric> ResumeEvaluator<M, R> {
    pub fn new(model: M, rubric: R) -> Self {
        Self { model, rubric }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn rubric(&self) -> &R {
        &self.rubric
    }

    /// Ask the model to structure raw resume text.
    pub fn parse_resume(&self, resume_text: &str) -> Result<ParsedResume> {
        let reply = self.model.generate(&self.rubric.parse_prompt(resume_text))?;
        let json = strip_json_fences(&reply);
        ParsedResume::from_json(&json).map_err(|e| {
            Error::ModelReply(format!("resume is not valid JSON ({e}): {}", preview(&json)))
        })
    }

    /// Ask the model to grade a parsed resume, given the format score.
    pub fn score(&self, parsed: &ParsedResume, format_score: u8) -> Result<Evaluation> {
        let reply = self
            .model
            .generate(&self.rubric.score_prompt(parsed, format_score))?;
        let text = strip_json_fences(&reply);
        let json = extract_json_object(&text).ok_or_else(|| {
            Error::ModelReply(format!("no JSON object in reply: {}", preview(&text)))
        })?;
        let reply: ScoreReply = serde_json::from_str(json)?;

        if reply.scores.format.round_ties_even() as i64 != i64::from(format_score) {
            warn!(
                "{} reported Format_Score {} but {} was supplied",
                self.model.name(),
                reply.scores.format,
                format_score
            );
        }

        let computed = self.rubric.weights().apply(&reply.scores);
        let computed_total = computed.round() as i64;
        if reply.scores.weighted_total.round() as i64 != computed_total {
            warn!(
                "{} reported weighted_total {} but the scores weigh to {:.2}",
                self.model.name(),
                reply.scores.weighted_total,
                computed
            );
        }

        Ok(Evaluation {
            scores: reply.scores,
            evaluation: reply.evaluation,
            computed_total,
        })
    }

    /// Full pipeline for a file: extract text, parse, analyze format, grade.
    pub fn evaluate<P: AsRef<Path>>(
        &self,
        path: P,
        analyzer: &FormatAnalyzer,
    ) -> Result<AtsReport> {
        self.evaluate_with_progress(path, analyzer, |_| {})
    }

    /// [`evaluate`](Self::evaluate), calling `progress` as each stage starts.
    pub fn evaluate_with_progress<P, F>(
        &self,
        path: P,
        analyzer: &FormatAnalyzer,
        mut progress: F,
    ) -> Result<AtsReport>
    where
        P: AsRef<Path>,
        F: FnMut(EvaluationStep),
    {
        let path = path.as_ref();
        progress(EvaluationStep::ExtractText);
        let file = FileInfo::from_path(path)?;
        let document = analyzer.walk(path)?;
        let text = document_text(&document);
        debug!(
            "{}: {} chars of text, rubric {}, model {}",
            path.display(),
            text.len(),
            self.rubric.name(),
            self.model.name()
        );

        progress(EvaluationStep::ParseResume);
        let parsed_resume = self.parse_resume(&text)?;
        let format = analyzer.analyze_document(&document, file);

        progress(EvaluationStep::ScoreResume);
        let evaluation = self.score(&parsed_resume, format.final_resume_score)?;

        Ok(AtsReport {
            parsed_resume,
            format,
            evaluation,
        })
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 200;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::AtsRubric;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct ScriptedModel {
        replies: RefCell<VecDeque<String>>,
        prompts: RefCell<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: RefCell::new(replies.iter().map(|r| r.to_string()).collect()),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl GenerativeModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.replies
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| Error::ModelReply("script exhausted".to_string()))
        }
    }

    const SCORES: &str = r#"Here you go:
```json
{"scores": {"Skill_Alignment": 80, "Experience_Relevance": 70, "Internship_Quality": 60,
"Soft_Skills": 90, "Impactful_Contributions": 50, "Miscellaneous_Score": 40,
"Format_Score": 100, "weighted_total": 75}, "evaluation": "Solid."}
```"#;

    #[test]
    fn test_strip_json_fences() {
        assert_eq!(strip_json_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_json_fences("```\n[]\n```\n"), "[]");
        assert_eq!(strip_json_fences("  {}  "), "{}");
    }

    #[test]
    fn test_extract_json_object() {
        assert_eq!(extract_json_object("x {\"a\": {}} y"), Some("{\"a\": {}}"));
        assert_eq!(extract_json_object("no braces"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn test_parse_resume() {
        let model = ScriptedModel::new(&["```json\n{\"Summary\": \"Engineer\"}\n```"]);
        let evaluator = ResumeEvaluator::new(&model, AtsRubric::new());

        let parsed = evaluator.parse_resume("Jane Doe\nEngineer").unwrap();
        assert_eq!(parsed.section("Summary").unwrap(), "Engineer");
        assert!(model.prompts.borrow()[0].ends_with("Jane Doe\nEngineer"));
    }

    #[test]
    fn test_parse_resume_rejects_prose() {
        let model = ScriptedModel::new(&["I could not read that resume."]);
        let evaluator = ResumeEvaluator::new(&model, AtsRubric::new());
        assert!(matches!(
            evaluator.parse_resume("text"),
            Err(Error::ModelReply(_))
        ));
    }

    #[test]
    fn test_score_reports_model_total_and_computed_total() {
        let model = ScriptedModel::new(&[SCORES]);
        let evaluator = ResumeEvaluator::new(&model, AtsRubric::new());
        let parsed = ParsedResume::from_json("{}").unwrap();

        let evaluation = evaluator.score(&parsed, 100).unwrap();
        assert_eq!(evaluation.ats_score(), 75.0);
        assert_eq!(evaluation.computed_total, 72);
        assert_eq!(evaluation.evaluation, "Solid.");
        assert!(model.prompts.borrow()[0].contains("Format_Score is given as 100"));
    }

    #[test]
    fn test_score_without_json() {
        let model = ScriptedModel::new(&["no scores today"]);
        let evaluator = ResumeEvaluator::new(&model, AtsRubric::new());
        let parsed = ParsedResume::from_json("{}").unwrap();
        assert!(matches!(
            evaluator.score(&parsed, 50),
            Err(Error::ModelReply(_))
        ));
    }

    #[test]
    fn test_score_with_missing_category() {
        let model = ScriptedModel::new(&[r#"{"scores": {"Skill_Alignment": 80}}"#]);
        let evaluator = ResumeEvaluator::new(&model, AtsRubric::new());
        let parsed = ParsedResume::from_json("{}").unwrap();
        assert!(matches!(evaluator.score(&parsed, 50), Err(Error::Json(_))));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), 203);
    }
}
