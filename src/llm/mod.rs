//! Model-backed resume evaluation.
//!
//! The format score is only one term of the overall ATS score. The rest
//! comes from a generative model that first structures the resume text and
//! then grades it against a [`Rubric`]. All model traffic goes through the
//! [`GenerativeModel`] trait so the HTTP client can be swapped for a stub.

mod client;
mod evaluation;
mod rubric;

pub use client::{GeminiClient, LlmConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use evaluation::{
    extract_json_object, strip_json_fences, AtsReport, CategoryScores, Evaluation, EvaluationStep,
    ParsedResume, ResumeEvaluator,
};
pub use rubric::{AtsRubric, Rubric, Weights};

use crate::error::Result;

/// A text-in, text-out generative model.
pub trait GenerativeModel {
    /// Model identifier, for logging.
    fn name(&self) -> &str;

    /// Generate a reply to a single prompt.
    fn generate(&self, prompt: &str) -> Result<String>;
}

impl<M: GenerativeModel + ?Sized> GenerativeModel for &M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }
}

impl<M: GenerativeModel + ?Sized> GenerativeModel for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }
}
