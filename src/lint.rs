//! Static-analysis summary over a submitted snippet.
//!
//! Runs the configured external linters against a temp file and collects
//! their text reports. A missing or failing linter produces a note in the
//! report instead of an error, so one absent tool never sinks the command.

use std::path::Path;

use tokio::process::Command;

use crate::config::LintConfig;

/// Run every configured linter over `code` and return one combined report.
pub async fn analyze(config: &LintConfig, code: &str) -> String {
    let dir = std::env::temp_dir();
    let file = dir.join(format!("mentor_lint_{}.py", std::process::id()));

    if let Err(e) = tokio::fs::write(&file, code).await {
        return format!("Could not write snippet for analysis: {}", e);
    }

    let mut sections = Vec::new();
    for linter in &config.linters {
        sections.push(run_linter(linter, &file, config).await);
    }

    let _ = tokio::fs::remove_file(&file).await;

    if sections.is_empty() {
        "No linters configured.".to_string()
    } else {
        sections.join("\n\n")
    }
}

async fn run_linter(linter: &str, file: &Path, config: &LintConfig) -> String {
    let result = tokio::time::timeout(
        config.timeout,
        Command::new(linter).arg(file).output(),
    )
    .await;

    match result {
        Ok(Ok(output)) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let report = stdout.trim();
            if output.status.success() && report.is_empty() {
                format!("{}: no problems found.", linter)
            } else if report.is_empty() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                format!("{} reported:\n{}", linter, stderr.trim())
            } else {
                format!("{} reported:\n{}", linter, report)
            }
        }
        Ok(Err(e)) => {
            tracing::debug!("linter {} unavailable: {}", linter, e);
            format!("{}: not available ({})", linter, e)
        }
        Err(_) => format!("{}: timed out after {:?}", linter, config.timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    #[tokio::test]
    async fn missing_linter_yields_note_not_error() {
        let config = LintConfig {
            linters: vec!["definitely-not-a-real-linter-xyz".to_string()],
            timeout: Duration::from_secs(5),
        };
        let report = analyze(&config, "x = 1\n").await;
        assert!(report.contains("not available"));
    }

    #[tokio::test]
    async fn no_linters_configured() {
        let config = LintConfig {
            linters: Vec::new(),
            timeout: Duration::from_secs(5),
        };
        let report = analyze(&config, "x = 1\n").await;
        assert_eq!(report, "No linters configured.");
    }
}
