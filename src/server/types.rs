use crate::{Error, Result, analysis::AnalysisResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub image: String,
    pub dict_of_vars: Map<String, Value>,
}

/// Chat request. Built from an arbitrary JSON body inside the handler so
/// that wrongly typed fields come back as an error envelope.
#[derive(Debug, Default)]
pub struct SearchPayload {
    pub query: String,
    pub image: Option<String>,
}

impl TryFrom<Value> for SearchPayload {
    type Error = Error;

    fn try_from(body: Value) -> Result<Self> {
        let Value::Object(mut fields) = body else {
            return Err(Error::invalid_payload("expected a JSON object"));
        };

        let query = match fields.remove("query") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(query)) => query,
            Some(_) => return Err(Error::invalid_payload("'query' must be a string")),
        };

        let image = match fields.remove("image") {
            None | Some(Value::Null) => None,
            Some(Value::String(image)) if image.is_empty() => None,
            Some(Value::String(image)) => Some(image),
            Some(_) => return Err(Error::invalid_payload("'image' must be a string")),
        };

        Ok(Self { query, image })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub data: Vec<AnalysisResult>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CalculateResponse {
    pub fn success(data: Vec<AnalysisResult>) -> Self {
        Self {
            data,
            status: Status::Success,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            status: Status::Error,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub result: String,
    pub status: Status,
}

impl SearchResponse {
    pub fn success(result: String) -> Self {
        Self {
            result,
            status: Status::Success,
        }
    }

    pub fn error(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            status: Status::Error,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub app_name: String,
    pub developer: String,
}
