use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use image::{DynamicImage, Rgba, RgbaImage};
use mathscribe_server::imaging;
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

/// Transparent canvas with nothing drawn on it
pub fn blank_canvas() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::new(32, 32))
}

/// Canvas with a short horizontal stroke
pub fn drawn_canvas() -> DynamicImage {
    let mut canvas = RgbaImage::new(32, 32);
    for x in 8..24 {
        canvas.put_pixel(x, 16, Rgba([255, 255, 255, 255]));
    }
    DynamicImage::ImageRgba8(canvas)
}

pub fn data_uri(image: &DynamicImage) -> String {
    imaging::to_data_uri(image).unwrap()
}

/// POST a raw body and return the status plus the JSON body, if any
pub async fn post_raw(
    app: Router,
    uri: &str,
    body: impl Into<Body>,
) -> (StatusCode, Option<Value>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, serde_json::from_slice(&bytes).ok())
}

/// POST a JSON value and expect a JSON reply
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let (status, json) = post_raw(app, uri, body.to_string()).await;
    (status, json.expect("response body is not JSON"))
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 9000
  logs:
    level: "debug"

llm:
  provider: "gemini"
  api_key: "test-api-key"
  model: "gemini-1.5-pro"
  system_prompt: "You are a terse assistant."
  request_timeout_secs: 30
"#;
