//! Rubric strategies: prompts plus category weights.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{CategoryScores, ParsedResume};

/// Relative weight of each category in the ATS score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub skill_alignment: f64,
    pub experience_relevance: f64,
    pub internship_quality: f64,
    pub soft_skills: f64,
    pub impactful_contributions: f64,
    pub miscellaneous: f64,
    pub format: f64,
}

impl Weights {
    const TOLERANCE: f64 = 1e-6;

    /// Validated weights. They must be non-negative and sum to 1.
    pub fn new(
        skill_alignment: f64,
        experience_relevance: f64,
        internship_quality: f64,
        soft_skills: f64,
        impactful_contributions: f64,
        miscellaneous: f64,
        format: f64,
    ) -> Result<Self> {
        let weights = Self {
            skill_alignment,
            experience_relevance,
            internship_quality,
            soft_skills,
            impactful_contributions,
            miscellaneous,
            format,
        };
        weights.validate()?;
        Ok(weights)
    }

    fn as_array(&self) -> [f64; 7] {
        [
            self.skill_alignment,
            self.experience_relevance,
            self.internship_quality,
            self.soft_skills,
            self.impactful_contributions,
            self.miscellaneous,
            self.format,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    pub fn validate(&self) -> Result<()> {
        if self.as_array().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::Config(
                "weights must be finite and non-negative".to_string(),
            ));
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > Self::TOLERANCE {
            return Err(Error::Config(format!("weights sum to {sum}, expected 1.0")));
        }
        Ok(())
    }

    /// Weighted sum of category scores.
    pub fn apply(&self, scores: &CategoryScores) -> f64 {
        self.skill_alignment * scores.skill_alignment
            + self.experience_relevance * scores.experience_relevance
            + self.internship_quality * scores.internship_quality
            + self.soft_skills * scores.soft_skills
            + self.impactful_contributions * scores.impactful_contributions
            + self.miscellaneous * scores.miscellaneous
            + self.format * scores.format
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            skill_alignment: 0.45,
            experience_relevance: 0.15,
            internship_quality: 0.15,
            soft_skills: 0.05,
            impactful_contributions: 0.10,
            miscellaneous: 0.05,
            format: 0.05,
        }
    }
}

/// A grading scheme: how to ask the model to structure a resume, how to ask
/// it to grade one, and how the grades are weighted.
pub trait Rubric {
    /// Rubric identifier, for logging.
    fn name(&self) -> &str;

    /// Prompt asking for the resume as a JSON object.
    fn parse_prompt(&self, resume_text: &str) -> String;

    /// Prompt asking for per-category scores of a parsed resume.
    fn score_prompt(&self, parsed: &ParsedResume, format_score: u8) -> String;

    fn weights(&self) -> &Weights;
}

/// The built-in ATS rubric.
#[derive(Debug, Clone, Default)]
pub struct AtsRubric {
    weights: Weights,
}

impl AtsRubric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same prompts, different weights.
    pub fn with_weights(weights: Weights) -> Result<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }
}

const PARSE_INSTRUCTIONS: &str = r#"Extract the resume below into a single JSON object with these keys:
"Contact Information" (name, email, phone, linkedin, location), "Summary",
"Education" (institution, degree, department, cgpa, year_of_completion),
"Skills" (Languages, Technologies, Core), "Certifications",
"Projects" (title, date, details), "Work Experience" (role, organization,
location, date, responsibilities).
Use null for missing values and empty arrays for missing lists.
Copy text literally; do not infer. Return only the JSON object.

Resume:
"#;

impl Rubric for AtsRubric {
    fn name(&self) -> &str {
        "ats"
    }

    fn parse_prompt(&self, resume_text: &str) -> String {
        format!("{PARSE_INSTRUCTIONS}{resume_text}")
    }

    fn score_prompt(&self, parsed: &ParsedResume, format_score: u8) -> String {
        let w = &self.weights;
        format!(
            r#"Grade the parsed resume below. Score every category from 0 to 100:
Skill_Alignment, Experience_Relevance, Internship_Quality, Soft_Skills,
Impactful_Contributions, Miscellaneous_Score. Format_Score is given as {format_score}.
Apply each rule the same way every time and round to the nearest whole number.

weighted_total = {} x Skill_Alignment + {} x Experience_Relevance
  + {} x Internship_Quality + {} x Soft_Skills + {} x Impactful_Contributions
  + {} x Miscellaneous_Score + {} x Format_Score

Return only:
{{"scores": {{"Skill_Alignment": X, "Experience_Relevance": X, "Internship_Quality": X,
"Soft_Skills": X, "Impactful_Contributions": X, "Miscellaneous_Score": X,
"Format_Score": {format_score}, "weighted_total": X}}, "evaluation": "short justification"}}

Parsed resume:
{}"#,
            w.skill_alignment,
            w.experience_relevance,
            w.internship_quality,
            w.soft_skills,
            w.impactful_contributions,
            w.miscellaneous,
            w.format,
            parsed,
        )
    }

    fn weights(&self) -> &Weights {
        &self.weights
    }
}
