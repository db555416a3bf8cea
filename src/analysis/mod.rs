//! Image analysis: asks the generative model to read and solve whatever is
//! drawn on the canvas.

mod prompt;

pub use prompt::{analysis_prompt, parse_reply};

use crate::{
    Result,
    llm::{GenerativeModel, PromptPart},
};
use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// One solved expression. `result` is kept exactly as the model wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub expr: String,
    pub result: Value,
    #[serde(default)]
    pub assign: bool,
}

#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        image: &DynamicImage,
        vars: &Map<String, Value>,
    ) -> Result<Vec<AnalysisResult>>;
}

/// Analyzer backed by a [`GenerativeModel`].
pub struct ModelAnalyzer {
    model: Arc<dyn GenerativeModel>,
}

impl ModelAnalyzer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Analyzer for ModelAnalyzer {
    async fn analyze(
        &self,
        image: &DynamicImage,
        vars: &Map<String, Value>,
    ) -> Result<Vec<AnalysisResult>> {
        let parts = vec![
            PromptPart::Text(analysis_prompt(vars)?),
            PromptPart::Image(image.clone()),
        ];

        let reply = self.model.generate(parts).await?;
        debug!("Analysis reply: {}", reply);

        Ok(parse_reply(&reply))
    }
}
