use scout_config::BrowserConfig;
use serde_json::json;
use webdriver::capabilities::Capabilities;

/// Construct Chrome command-line arguments for the configured launch flags.
pub fn build_chrome_arguments(config: &BrowserConfig) -> Vec<String> {
    let mut args = Vec::new();
    if config.headless {
        args.push("--headless".to_string());
        args.push("--disable-gpu".to_string());
    }
    if config.no_sandbox {
        args.push("--no-sandbox".to_string());
    }
    if config.disable_dev_shm_usage {
        args.push("--disable-dev-shm-usage".to_string());
    }
    args.extend(config.extra_args.iter().cloned());
    args
}

/// WebDriver capabilities requesting Chrome with [`build_chrome_arguments`].
pub fn build_capabilities(config: &BrowserConfig) -> Capabilities {
    let mut caps = Capabilities::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": build_chrome_arguments(config) }),
    );
    caps
}
