//! Chrome/ChromeDriver version precondition.
//!
//! WebDriver sessions fail in confusing ways when the browser and its driver
//! disagree on the major version, so the service checks both binaries before
//! any request-specific work starts.
use regex::Regex;
use scout_config::EnvironmentConfig;
use tokio::process::Command;
use tracing::{info, warn};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("unable to determine {binary} version: {reason}")]
    VersionUnavailable { binary: String, reason: String },

    #[error("Chrome ({chrome}) and ChromeDriver ({driver}) major versions do not match")]
    VersionMismatch { chrome: String, driver: String },
}

/// Versions found by a successful [`check_versions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentReport {
    pub chrome_version: String,
    pub chromedriver_version: String,
}

/// Run `--version` on both binaries and require matching major versions.
pub async fn check_versions(
    config: &EnvironmentConfig,
) -> Result<EnvironmentReport, EnvironmentError> {
    let chrome_version = binary_version(&config.chrome_binary).await?;
    let chromedriver_version = binary_version(&config.chromedriver_binary).await?;

    info!(
        target: "scout.environment",
        chrome = %chrome_version,
        chromedriver = %chromedriver_version,
        "environment.versions"
    );

    if major(&chrome_version) != major(&chromedriver_version) {
        warn!(
            target: "scout.environment",
            chrome = %chrome_version,
            chromedriver = %chromedriver_version,
            "environment.version_mismatch"
        );
        return Err(EnvironmentError::VersionMismatch {
            chrome: chrome_version,
            driver: chromedriver_version,
        });
    }

    Ok(EnvironmentReport {
        chrome_version,
        chromedriver_version,
    })
}

async fn binary_version(binary: &str) -> Result<String, EnvironmentError> {
    let unavailable = |reason: String| EnvironmentError::VersionUnavailable {
        binary: binary.to_string(),
        reason,
    };

    let output = Command::new(binary)
        .arg("--version")
        .output()
        .await
        .map_err(|e| unavailable(e.to_string()))?;
    if !output.status.success() {
        return Err(unavailable(format!("exited with {}", output.status)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_version(&stdout).ok_or_else(|| unavailable(format!("unrecognised output {:?}", stdout.trim())))
}

/// First dotted version number in `--version` output.
///
/// Handles both `Google Chrome 128.0.6613.86` and
/// `ChromeDriver 128.0.6613.86 (4f0b0f0f...-refs/branch-heads/6613@{#1464})`.
fn parse_version(output: &str) -> Option<String> {
    let re = Regex::new(r"\b\d+(?:\.\d+)+\b").ok()?;
    re.find(output).map(|m| m.as_str().to_string())
}

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chrome_and_driver_output() {
        assert_eq!(
            parse_version("Google Chrome 128.0.6613.86 \n").as_deref(),
            Some("128.0.6613.86")
        );
        assert_eq!(
            parse_version("ChromeDriver 128.0.6613.86 (4f0b0f0f-refs/branch-heads/6613@{#1464})")
                .as_deref(),
            Some("128.0.6613.86")
        );
        assert_eq!(parse_version("command not found"), None);
    }

    #[test]
    fn major_is_first_component() {
        assert_eq!(major("128.0.6613.86"), "128");
        assert_eq!(major("127"), "127");
    }

    #[tokio::test]
    async fn missing_binary_is_unavailable() {
        let config = EnvironmentConfig {
            check_versions: true,
            chrome_binary: "scout-definitely-missing-chrome".into(),
            chromedriver_binary: "scout-definitely-missing-driver".into(),
        };
        let err = check_versions(&config).await.unwrap_err();
        assert!(matches!(
            err,
            EnvironmentError::VersionUnavailable { ref binary, .. } if binary == "scout-definitely-missing-chrome"
        ));
    }
}
