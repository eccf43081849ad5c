//! Retry behaviour of image fetches against a scripted transport.

use async_trait::async_trait;
use bytes::Bytes;
use cataas_bot::cataas::{ApiResponse, CatApi, CatClient, CatUrls, FetchError, RetryPolicy};
use std::collections::VecDeque;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Plays back canned answers and records requested URLs
struct ScriptedApi {
    answers: Mutex<VecDeque<Result<ApiResponse, FetchError>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedApi {
    fn new(answers: impl IntoIterator<Item = Result<ApiResponse, FetchError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CatApi for ScriptedApi {
    async fn get(&self, url: &str) -> Result<ApiResponse, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        self.answers
            .lock()
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transport("script exhausted".into())))
    }
}

/// Forwards to a shared [`ScriptedApi`] so the test can inspect it afterwards
struct Shared(Arc<ScriptedApi>);

#[async_trait]
impl CatApi for Shared {
    async fn get(&self, url: &str) -> Result<ApiResponse, FetchError> {
        self.0.get(url).await
    }
}

fn client(api: Arc<ScriptedApi>) -> CatClient {
    CatClient::new(
        Box::new(Shared(api)),
        CatUrls::new("http://cats.test/"),
        RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_millis(1000),
        },
    )
}

#[tokio::test(start_paused = true)]
async fn image_recovers_after_server_errors() -> Result<(), Box<dyn Error>> {
    let api = Arc::new(ScriptedApi::new([
        Ok(ApiResponse::status(500)),
        Ok(ApiResponse::status(500)),
        Ok(ApiResponse::ok("png-bytes")),
    ]));
    let client = client(api.clone());
    let url = client.urls().cat_says("hi", Some("cute"), Some(50), Some("red"));

    let started = tokio::time::Instant::now();
    let image = client.image(&url).await?;

    assert_eq!(image, Bytes::from_static(b"png-bytes"));
    assert!(started.elapsed() >= Duration::from_millis(2000));

    let requests = api.requests.lock().map_err(|e| e.to_string())?;
    assert_eq!(requests.len(), 3);
    assert!(requests
        .iter()
        .all(|r| r == "http://cats.test/cat/cute/says/hi?fontSize=50&fontColor=red"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn image_reports_last_error() -> Result<(), Box<dyn Error>> {
    let api = Arc::new(ScriptedApi::new([
        Err(FetchError::Transport("connection reset".into())),
        Ok(ApiResponse::status(500)),
        Ok(ApiResponse::status(500)),
    ]));
    let client = client(api.clone());

    let result = client.image(&client.urls().cat_gif()).await;

    assert_eq!(result, Err(FetchError::Status(500)));
    assert_eq!(api.requests.lock().map_err(|e| e.to_string())?.len(), 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn client_error_stops_immediately() -> Result<(), Box<dyn Error>> {
    let api = Arc::new(ScriptedApi::new([Ok(ApiResponse::status(404))]));
    let client = client(api.clone());

    let result = client.image(&client.urls().cat(Some("nope"))).await;

    assert_eq!(result, Err(FetchError::Status(404)));
    assert_eq!(result.map_err(|e| e.to_string()), Err("404".to_string()));
    assert_eq!(api.requests.lock().map_err(|e| e.to_string())?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn tag_listing_is_fetched_once() -> Result<(), Box<dyn Error>> {
    let api = Arc::new(ScriptedApi::new([
        Ok(ApiResponse::status(500)),
        Ok(ApiResponse::ok(r#"["cute"]"#)),
    ]));
    let client = client(api.clone());

    assert_eq!(client.tags().await, Err(FetchError::Status(500)));
    assert_eq!(
        api.requests.lock().map_err(|e| e.to_string())?.as_slice(),
        ["http://cats.test/api/tags"]
    );
    Ok(())
}
