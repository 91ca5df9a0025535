use scout_common::ExtractionMode;
use scout_config::ScoutConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn file_values_merge_over_defaults() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "scout.yaml",
        r#"
server:
  bind: "127.0.0.1:8080"
browser:
  headless: false
  extra_args: ["--lang=en-US"]
search:
  engine_url: "https://duckduckgo.com"
  max_results: 5
extraction:
  mode: text
"#,
    );

    let config = ScoutConfigLoader::new()
        .with_file(p)
        .load()
        .expect("load scout config");

    assert_eq!(config.server.bind, "127.0.0.1:8080");
    assert!(!config.browser.headless);
    assert!(config.browser.no_sandbox);
    assert_eq!(config.browser.extra_args, vec!["--lang=en-US".to_string()]);
    assert_eq!(config.search.engine_url, "https://duckduckgo.com");
    assert_eq!(config.search.max_results, 5);
    assert_eq!(config.search.result_selector, "h3");
    assert_eq!(config.extraction.mode, ExtractionMode::Text);
}

#[test]
#[serial]
fn environment_overrides_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "scout.yaml",
        r#"
browser:
  headless: true
loader:
  settle_delay_ms: 5000
"#,
    );

    temp_env::with_vars(
        [
            ("SCOUT__BROWSER__HEADLESS", Some("false")),
            ("SCOUT__LOADER__SETTLE_DELAY_MS", Some("250")),
        ],
        || {
            let config = ScoutConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load scout config");

            assert!(!config.browser.headless);
            assert_eq!(config.loader.settle_delay_ms, 250);
        },
    );
}

#[test]
#[serial]
fn placeholders_expand_from_environment() {
    temp_env::with_var("SCOUT_TEST_DRIVER", Some("http://driver:4444"), || {
        let config = ScoutConfigLoader::new()
            .with_yaml_str("browser:\n  webdriver_url: \"${SCOUT_TEST_DRIVER}\"\n")
            .load()
            .expect("load scout config");

        assert_eq!(config.browser.webdriver_url, "http://driver:4444");
    });
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = ScoutConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("optional file may be absent");

    assert_eq!(config.server.bind, "0.0.0.0:5000");
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = ScoutConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();

    assert!(result.is_err());
}
