use async_trait::async_trait;
use image::DynamicImage;
use mathscribe_server::{
    Error, Result,
    analysis::{AnalysisResult, Analyzer},
    llm::{GenerativeModel, PromptPart},
};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

/// Mock generative model that records every prompt it receives
#[derive(Debug, Clone)]
pub struct MockModel {
    pub calls: Arc<Mutex<Vec<Vec<PromptPart>>>>,
    pub reply: String,
    pub error: Option<String>,
}

impl MockModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            reply: reply.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn get_calls(&self) -> Vec<Vec<PromptPart>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    async fn generate(&self, parts: Vec<PromptPart>) -> Result<String> {
        self.calls.lock().unwrap().push(parts);

        if let Some(ref error) = self.error {
            return Err(Error::llm(error.clone()));
        }

        Ok(self.reply.clone())
    }
}

/// Mock analyzer returning canned results and recording the variables it saw
#[derive(Debug, Clone, Default)]
pub struct MockAnalyzer {
    pub results: Vec<AnalysisResult>,
    pub calls: Arc<Mutex<Vec<Map<String, Value>>>>,
    pub error: Option<String>,
}

impl MockAnalyzer {
    pub fn new(results: Vec<AnalysisResult>) -> Self {
        Self {
            results,
            ..Self::default()
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<Map<String, Value>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze(
        &self,
        _image: &DynamicImage,
        vars: &Map<String, Value>,
    ) -> Result<Vec<AnalysisResult>> {
        self.calls.lock().unwrap().push(vars.clone());

        if let Some(ref error) = self.error {
            return Err(Error::llm(error.clone()));
        }

        Ok(self.results.clone())
    }
}
