#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use scout_config::{EnvironmentConfig, ScoutConfig};
use scout_drivers::scout_browser::session::{BrowserSession, SessionFactory};
use scout_web::Pipeline;
use serde_json::Value;
use tower::ServiceExt;

use scout_app::server::{router, AppState};

/// Browser stand-in that serves canned pages and search results.
#[derive(Clone, Default)]
pub struct StaticBrowser {
    pub pages: HashMap<String, String>,
    pub results: Vec<String>,
    pub opened: Arc<Mutex<usize>>,
    pub closed: Arc<Mutex<usize>>,
}

struct StaticSession {
    browser: StaticBrowser,
    current: Option<String>,
}

#[async_trait]
impl BrowserSession for StaticSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn submit_query(&mut self, _input_selector: &str, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn wait_for_selector(&mut self, _selector: &str, _timeout: Duration) -> Result<bool> {
        Ok(true)
    }

    async fn list_matches(&mut self, _selector: &str, limit: usize) -> Result<Vec<String>> {
        Ok(self.browser.results.iter().take(limit).cloned().collect())
    }

    async fn current_markup(&mut self) -> Result<String> {
        let url = self.current.as_deref().ok_or_else(|| anyhow!("no page"))?;
        self.browser
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("no page for {url}"))
    }

    async fn close(&mut self) -> Result<()> {
        *self.browser.closed.lock().unwrap() += 1;
        Ok(())
    }
}

#[async_trait]
impl SessionFactory for StaticBrowser {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        *self.opened.lock().unwrap() += 1;
        Ok(Box::new(StaticSession {
            browser: self.clone(),
            current: None,
        }))
    }
}

pub fn test_config(probe_template: String) -> ScoutConfig {
    let mut config = ScoutConfig::default();
    config.probe.url_template = probe_template;
    config.probe.timeout_ms = 2_000;
    config.loader.settle_delay_ms = 0;
    config.environment.check_versions = false;
    config
}

pub fn app(config: &ScoutConfig, browser: StaticBrowser) -> Router {
    app_with_environment(config, browser, config.environment.clone())
}

pub fn app_with_environment(
    config: &ScoutConfig,
    browser: StaticBrowser,
    environment: EnvironmentConfig,
) -> Router {
    let pipeline = Pipeline::new(config, Arc::new(browser)).expect("pipeline");
    router(AppState::new(pipeline, environment))
}

pub async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}
