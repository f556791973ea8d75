//! End-to-end session tests with a stubbed primary provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use mentor::config::{
    Config, ContextConfig, DatabaseConfig, LintConfig, LlmConfig, OpenAiCompatibleConfig,
    TranslateConfig,
};
use mentor::error::LlmError;
use mentor::history::HistoryStore;
use mentor::llm::{Aggregator, CompletionProvider, CompletionRequest};
use mentor::context::ContextAssembler;
use mentor::repl::{App, Flow};

/// Replies with a fixed answer regardless of input.
struct StubProvider;

#[async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(&self, _req: CompletionRequest) -> Result<String, LlmError> {
        Ok("a list is an ordered collection".to_string())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

fn test_config() -> Config {
    Config {
        database: DatabaseConfig::with_url(":memory:"),
        llm: LlmConfig {
            primary: OpenAiCompatibleConfig {
                base_url: "http://localhost:0".to_string(),
                model: "stub-model".to_string(),
                api_key: None,
                temperature: 0.7,
                max_tokens: 100,
            },
            cohere: None,
            huggingface: None,
            provider_timeout: Duration::from_secs(5),
        },
        context: ContextConfig::default(),
        translate: TranslateConfig {
            base_url: None,
            api_key: None,
            source_lang: "pt".to_string(),
            target_lang: "en".to_string(),
        },
        lint: LintConfig {
            linters: Vec::new(),
            timeout: Duration::from_secs(5),
        },
    }
}

async fn test_app() -> (tempfile::TempDir, App) {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = dir.path().join("mentor.db").to_string_lossy().to_string();
    let mut config = test_config();
    config.database = DatabaseConfig::with_url(&url);

    let store = HistoryStore::new(&config.database).await.expect("store");
    let assembler = ContextAssembler::new(config.context.clone());
    let aggregator = Aggregator::new(Arc::new(StubProvider), config.llm.provider_timeout);

    let app = App::new(store, assembler, aggregator, &config, "ana".to_string());
    app.register_user().await.expect("register_user");
    (dir, app)
}

#[tokio::test]
async fn question_round_trip_is_recorded_in_history() {
    let (_dir, mut app) = test_app().await;

    let (flow, output) = app.handle_line("what is a list?").await;
    assert_eq!(flow, Flow::Continue);
    assert_eq!(output, "a list is an ordered collection");

    let all = app.store().all_chronological().await.expect("all");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].request, "what is a list?");
    assert_eq!(all[0].response, "a list is an ordered collection");
}

#[tokio::test]
async fn history_command_shows_recorded_interactions() {
    let (_dir, mut app) = test_app().await;

    app.handle_line("what is a list?").await;
    let (_, output) = app.handle_line("history").await;
    assert!(output.contains("what is a list?"));
    assert!(output.contains("a list is an ordered collection"));
}

#[tokio::test]
async fn empty_history_and_empty_search_report_explicitly() {
    let (_dir, mut app) = test_app().await;

    let (_, output) = app.handle_line("history").await;
    assert_eq!(output, "History is empty.");

    let (_, output) = app.handle_line("search nothing-here").await;
    assert_eq!(output, "Nothing found for 'nothing-here'.");
}

#[tokio::test]
async fn clear_command_empties_history() {
    let (_dir, mut app) = test_app().await;

    app.handle_line("first question").await;
    app.handle_line("second question").await;

    let (_, output) = app.handle_line("clear").await;
    assert!(output.contains("2 records removed"));

    let (_, output) = app.handle_line("history").await;
    assert_eq!(output, "History is empty.");
}

#[tokio::test]
async fn score_and_ranking_commands() {
    let (_dir, mut app) = test_app().await;

    let (_, output) = app.handle_line("score 10").await;
    assert!(output.contains("10 points"));
    assert!(output.contains("1 quizzes"));

    let (_, output) = app.handle_line("score 5").await;
    assert!(output.contains("15 points"));
    assert!(output.contains("2 quizzes"));

    let (_, output) = app.handle_line("ranking").await;
    assert!(output.contains("ana"));
    assert!(output.contains("15 points"));
}

#[tokio::test]
async fn quit_ends_the_session() {
    let (_dir, mut app) = test_app().await;
    let (flow, _) = app.handle_line("quit").await;
    assert_eq!(flow, Flow::Quit);
}

#[tokio::test]
async fn failing_provider_reports_without_crashing() {
    struct DownProvider;

    #[async_trait]
    impl CompletionProvider for DownProvider {
        async fn complete(&self, _req: CompletionRequest) -> Result<String, LlmError> {
            Err(LlmError::RequestFailed {
                provider: "down".to_string(),
                reason: "connection refused".to_string(),
            })
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let url = dir.path().join("mentor.db").to_string_lossy().to_string();
    let mut config = test_config();
    config.database = DatabaseConfig::with_url(&url);

    let store = HistoryStore::new(&config.database).await.expect("store");
    let assembler = ContextAssembler::new(config.context.clone());
    let aggregator = Aggregator::new(Arc::new(DownProvider), config.llm.provider_timeout);
    let mut app = App::new(store, assembler, aggregator, &config, "ana".to_string());

    let (flow, output) = app.handle_line("anything").await;
    assert_eq!(flow, Flow::Continue);
    assert!(output.contains("could not answer"));

    // The session keeps going afterwards.
    let (flow, _) = app.handle_line("help").await;
    assert_eq!(flow, Flow::Continue);
}
