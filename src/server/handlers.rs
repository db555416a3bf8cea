use super::types::{
    CalculateRequest, CalculateResponse, RootResponse, SearchPayload, SearchResponse,
};
use crate::{
    Error, Result,
    analysis::{AnalysisResult, Analyzer, ModelAnalyzer},
    canvas::CanvasCommand,
    imaging,
    llm::{GenerativeModel, PromptPart},
};
use axum::{extract::State, response::Json};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

pub const CHAT_SYSTEM_PROMPT: &str = "You are MathScribe, an expert AI assistant for math, science, code, and drawing. \
You can answer questions, solve equations, explain concepts, and write code in any language. \
If the user asks you to edit the canvas (e.g., draw a shape, clear, write text), respond ONLY with a command in the format: \
__canvas_edit__:{...json...} (no explanation, just the command). \
For all other queries, answer as a helpful chatbot with explanations, code, or math as needed.";

/// Shared handler state. `None` collaborators mean no API key was configured.
#[derive(Clone)]
pub struct AppState {
    pub model: Option<Arc<dyn GenerativeModel>>,
    pub analyzer: Option<Arc<dyn Analyzer>>,
    pub system_prompt: Arc<str>,
}

impl AppState {
    /// Builds state around a model, analysing images through that same model.
    pub fn new(model: Option<Arc<dyn GenerativeModel>>) -> Self {
        let analyzer = model
            .clone()
            .map(|m| Arc::new(ModelAnalyzer::new(m)) as Arc<dyn Analyzer>);

        Self {
            model,
            analyzer,
            system_prompt: Arc::from(CHAT_SYSTEM_PROMPT),
        }
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<Arc<str>>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "MathScribe Server is running".to_string(),
        app_name: "MathScribe".to_string(),
        developer: "Raashi and Sandy".to_string(),
    })
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn calculate(
    State(state): State<AppState>,
    Json(request): Json<CalculateRequest>,
) -> Json<CalculateResponse> {
    info!(
        "Received calculate request with {} known variables",
        request.dict_of_vars.len()
    );

    match run_calculation(&state, request).await {
        Ok(data) => {
            info!("Analysis produced {} results", data.len());
            Json(CalculateResponse::success(data))
        }
        Err(e) => {
            if e.is_client_input() {
                warn!("Rejected calculate request: {}", e);
            } else {
                error!("Error in /calculate endpoint: {}", e);
            }
            Json(CalculateResponse::error(e.to_string()))
        }
    }
}

async fn run_calculation(
    state: &AppState,
    request: CalculateRequest,
) -> Result<Vec<AnalysisResult>> {
    let canvas = imaging::load_canvas(request.image).await?;

    let Some(bounds) = canvas.bounds else {
        return Err(Error::BlankImage);
    };
    debug!(
        "Canvas content spans {}x{} at ({}, {})",
        bounds.width(),
        bounds.height(),
        bounds.left,
        bounds.top
    );

    let analyzer = state.analyzer.as_ref().ok_or(Error::NotConfigured)?;
    analyzer.analyze(&canvas.image, &request.dict_of_vars).await
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Json<SearchResponse> {
    match run_search(&state, body).await {
        Ok(text) => {
            match CanvasCommand::detect(&text) {
                Some(Ok(command)) => {
                    debug!("Model issued canvas command: {:?}", command.action())
                }
                Some(Err(e)) => warn!("Model issued malformed canvas command: {}", e),
                None => {}
            }
            Json(SearchResponse::success(text))
        }
        Err(Error::NotConfigured) => {
            warn!("Search requested but no model is configured");
            Json(SearchResponse::error(Error::NotConfigured.to_string()))
        }
        Err(e) => {
            if e.is_client_input() {
                warn!("Rejected search request: {}", e);
            } else {
                error!("Error in /search endpoint: {}", e);
            }
            Json(SearchResponse::error(format!("Error: {}", e)))
        }
    }
}

async fn run_search(state: &AppState, body: Value) -> Result<String> {
    let model = state.model.as_ref().ok_or(Error::NotConfigured)?;
    let payload = SearchPayload::try_from(body)?;

    info!(
        "Received search request (query length {}, image attached: {})",
        payload.query.len(),
        payload.image.is_some()
    );

    let mut parts = vec![
        PromptPart::text(&*state.system_prompt),
        PromptPart::Text(payload.query),
    ];

    if let Some(image) = payload.image {
        parts.push(PromptPart::Image(imaging::load_image(image).await?));
    }

    let text = model.generate(parts).await?;
    debug!("Model raw response: {}", text);

    Ok(text)
}
