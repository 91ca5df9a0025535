#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use scout_common::observability::{LogConfig, LogFormat};
use scout_drivers::scout_browser::session::{BrowserSession, SessionFactory};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "scout-tests",
            log_dir: Some(std::env::temp_dir().join("scout-tests")),
            emit_stderr: true,
            format: if std::env::var("SCOUT_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };

        scout_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// What the scripted browser saw, shared across every session a factory opens.
#[derive(Debug, Default, Clone)]
pub struct SessionLog {
    pub opened: usize,
    pub closed: usize,
    pub navigations: Vec<String>,
    pub queries: Vec<String>,
}

/// Canned browser behaviour.
#[derive(Debug, Clone)]
pub struct Script {
    pub results: Vec<String>,
    pub results_appear: bool,
    pub pages: HashMap<String, String>,
    pub fail_navigation_to: Option<String>,
    pub fail_open: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            results_appear: true,
            pages: HashMap::new(),
            fail_navigation_to: None,
            fail_open: false,
        }
    }
}

impl Script {
    pub fn with_results(mut self, results: &[&str]) -> Self {
        self.results = results.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_page(mut self, url: impl Into<String>, html: &str) -> Self {
        self.pages.insert(url.into(), html.to_string());
        self
    }

    pub fn results_never_appear(mut self) -> Self {
        self.results_appear = false;
        self
    }

    pub fn failing_navigation_to(mut self, url: &str) -> Self {
        self.fail_navigation_to = Some(url.to_string());
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }
}

pub struct ScriptedSession {
    script: Script,
    log: Arc<Mutex<SessionLog>>,
    current: Option<String>,
    closed: bool,
}

impl ScriptedSession {
    pub fn new(script: Script, log: Arc<Mutex<SessionLog>>) -> Self {
        Self {
            script,
            log,
            current: None,
            closed: false,
        }
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.log.lock().unwrap().navigations.push(url.to_string());
        if self.script.fail_navigation_to.as_deref() == Some(url) {
            return Err(anyhow!("net::ERR_NAME_NOT_RESOLVED"));
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn submit_query(&mut self, _input_selector: &str, text: &str) -> Result<()> {
        self.log.lock().unwrap().queries.push(text.to_string());
        Ok(())
    }

    async fn wait_for_selector(&mut self, _selector: &str, _timeout: Duration) -> Result<bool> {
        Ok(self.script.results_appear)
    }

    async fn list_matches(&mut self, _selector: &str, limit: usize) -> Result<Vec<String>> {
        Ok(self.script.results.iter().take(limit).cloned().collect())
    }

    async fn current_markup(&mut self) -> Result<String> {
        let url = self
            .current
            .as_deref()
            .ok_or_else(|| anyhow!("no page loaded"))?;
        self.script
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("no scripted page for {url}"))
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.log.lock().unwrap().closed += 1;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct ScriptedFactory {
    script: Script,
    log: Arc<Mutex<SessionLog>>,
}

impl ScriptedFactory {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            log: Arc::new(Mutex::new(SessionLog::default())),
        }
    }

    pub fn log(&self) -> SessionLog {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionFactory for ScriptedFactory {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        if self.script.fail_open {
            return Err(anyhow!("connection refused (os error 111)"));
        }
        self.log.lock().unwrap().opened += 1;
        Ok(Box::new(ScriptedSession::new(
            self.script.clone(),
            self.log.clone(),
        )))
    }
}
