//! Interactive command loop.
//!
//! Lines from stdin are parsed into [`Command`]s and dispatched against an
//! explicit [`App`] context (store handle + provider configuration + user).
//! Persistence errors are reported for the failing command; the loop itself
//! only ends on `quit`/EOF.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::config::{Config, LintConfig, OpenAiCompatibleConfig};
use crate::context::ContextAssembler;
use crate::error::DatabaseError;
use crate::history::HistoryStore;
use crate::lint;
use crate::llm::{Aggregator, OpenAiCompatibleProvider};
use crate::prompts;
use crate::stackoverflow;

const TEXT_EXPORT_PATH: &str = "mentor_history.txt";
const NOTEBOOK_EXPORT_PATH: &str = "mentor_history.ipynb";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    History(usize),
    Search(String),
    Clear,
    ExportText,
    ExportNotebook,
    Model(String),
    Ranking,
    Score(i64),
    Quiz,
    Challenge,
    Explain(String),
    Summarize(String),
    ExplainError(String),
    Fix(String),
    Concept(String),
    Library(String),
    Materials,
    Projects(String),
    Analyze(String),
    StackOverflow(String),
    AskAll(String),
    Ask(String),
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    /// Parse one input line. The first word selects the command; anything
    /// unrecognized is treated as a plain question for the primary provider.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };

        let arg = || rest.to_string();
        let require_arg = |cmd: fn(String) -> Command| {
            if rest.is_empty() {
                Command::Unknown(format!("'{}' needs an argument", word))
            } else {
                cmd(rest.to_string())
            }
        };

        match word.to_lowercase().as_str() {
            "help" => Command::Help,
            "history" => Command::History(rest.parse().unwrap_or(10)),
            "search" => require_arg(Command::Search),
            "clear" => Command::Clear,
            "export" => Command::ExportText,
            "notebook" => Command::ExportNotebook,
            "model" => require_arg(Command::Model),
            "ranking" => Command::Ranking,
            "score" => match rest.parse() {
                Ok(points) => Command::Score(points),
                Err(_) => Command::Unknown("'score' needs a point value".to_string()),
            },
            "quiz" => Command::Quiz,
            "challenge" => Command::Challenge,
            "explain" => require_arg(Command::Explain),
            "summarize" => require_arg(Command::Summarize),
            "error" => require_arg(Command::ExplainError),
            "fix" => require_arg(Command::Fix),
            "concept" => require_arg(Command::Concept),
            "library" => require_arg(Command::Library),
            "materials" => Command::Materials,
            "projects" => Command::Projects(if rest.is_empty() {
                "beginner".to_string()
            } else {
                arg()
            }),
            "analyze" => require_arg(Command::Analyze),
            "stackoverflow" => require_arg(Command::StackOverflow),
            "all" => require_arg(Command::AskAll),
            "quit" | "exit" => Command::Quit,
            _ => Command::Ask(line.to_string()),
        }
    }
}

/// Session context: everything a command needs, passed explicitly.
pub struct App {
    store: HistoryStore,
    assembler: ContextAssembler,
    aggregator: Aggregator,
    lint: LintConfig,
    primary_config: OpenAiCompatibleConfig,
    http: reqwest::Client,
    user: String,
}

/// What the loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl App {
    pub fn new(
        store: HistoryStore,
        assembler: ContextAssembler,
        aggregator: Aggregator,
        config: &Config,
        user: String,
    ) -> Self {
        Self {
            store,
            assembler,
            aggregator,
            lint: config.lint.clone(),
            primary_config: config.llm.primary.clone(),
            http: reqwest::Client::new(),
            user,
        }
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Register the session user in the ranking table (idempotent).
    pub async fn register_user(&self) -> Result<(), DatabaseError> {
        self.store.ensure_participant(&self.user).await
    }

    /// Dispatch one line and return the text to display.
    pub async fn handle_line(&mut self, line: &str) -> (Flow, String) {
        match Command::parse(line) {
            Command::Empty => (Flow::Continue, String::new()),
            Command::Quit => (Flow::Quit, "Bye!".to_string()),
            Command::Help => (Flow::Continue, help_text()),
            Command::Unknown(msg) => (Flow::Continue, msg),

            Command::History(limit) => (Flow::Continue, self.show_history(limit).await),
            Command::Search(term) => (Flow::Continue, self.search(&term).await),
            Command::Clear => (Flow::Continue, self.clear().await),
            Command::ExportText => (Flow::Continue, self.export_text().await),
            Command::ExportNotebook => (Flow::Continue, self.export_notebook().await),
            Command::Model(name) => (Flow::Continue, self.switch_model(name)),
            Command::Ranking => (Flow::Continue, self.show_ranking().await),
            Command::Score(points) => (Flow::Continue, self.add_score(points).await),

            Command::Quiz => self.ask_primary(line, prompts::quiz()).await,
            Command::Challenge => self.ask_primary(line, prompts::challenge()).await,
            Command::Explain(code) => self.ask_primary(line, prompts::explain_code(&code)).await,
            Command::Summarize(text) => {
                self.ask_primary(line, prompts::summarize_text(&text)).await
            }
            Command::ExplainError(msg) => {
                self.ask_primary(line, prompts::explain_error(&msg)).await
            }
            Command::Fix(code) => self.ask_primary(line, prompts::fix_code(&code)).await,
            Command::Concept(topic) => self.ask_primary(line, prompts::concept(&topic)).await,
            Command::Library(name) => self.ask_primary(line, prompts::library(&name)).await,
            Command::Materials => self.ask_primary(line, prompts::materials()).await,
            Command::Projects(level) => self.ask_primary(line, prompts::projects(&level)).await,
            Command::Ask(question) => self.ask_primary(line, prompts::persona(&question)).await,

            Command::Analyze(code) => self.analyze(line, &code).await,
            Command::StackOverflow(query) => {
                let response = stackoverflow::search(&self.http, &query).await;
                self.record(line, response).await
            }
            Command::AskAll(question) => self.ask_all(line, &question).await,
        }
    }

    /// Query the primary provider with context; record the round-trip.
    async fn ask_primary(&mut self, raw: &str, prompt: String) -> (Flow, String) {
        let context = match self.assembler.assemble_messages(&self.store, prompt).await {
            Ok(ctx) => ctx,
            Err(e) => return (Flow::Continue, format!("History unavailable: {}", e)),
        };

        let response = match self.aggregator.query_primary(context).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("primary provider failed: {}", e);
                format!("The provider could not answer: {}", e)
            }
        };

        self.record(raw, response).await
    }

    /// Fan the question out to every provider; record the combined answer.
    async fn ask_all(&mut self, raw: &str, question: &str) -> (Flow, String) {
        let prompt = prompts::persona(question);
        let context = match self
            .assembler
            .assemble_messages(&self.store, prompt)
            .await
        {
            Ok(ctx) => ctx,
            Err(e) => return (Flow::Continue, format!("History unavailable: {}", e)),
        };

        let response = self.aggregator.query_all(question, context).await;
        self.record(raw, response).await
    }

    async fn analyze(&mut self, raw: &str, code: &str) -> (Flow, String) {
        let report = lint::analyze(&self.lint, code).await;

        // Linter findings also get a model review when the provider is up.
        let prompt = prompts::review_analysis(code, &report);
        let review = match self
            .assembler
            .assemble_messages(&self.store, prompt)
            .await
        {
            Ok(ctx) => self.aggregator.query_primary(ctx).await.ok(),
            Err(_) => None,
        };

        let response = match review {
            Some(review) => format!("{}\n\n{}", report, review),
            None => report,
        };
        self.record(raw, response).await
    }

    /// Persist a completed round-trip. A failed append is reported but does
    /// not drop the response.
    async fn record(&self, raw: &str, response: String) -> (Flow, String) {
        match self.store.append(raw, &response).await {
            Ok(_) => (Flow::Continue, response),
            Err(e) => (
                Flow::Continue,
                format!("{}\n\n(warning: could not save to history: {})", response, e),
            ),
        }
    }

    async fn show_history(&self, limit: usize) -> String {
        match self.store.recent_chronological(limit).await {
            Ok(records) if records.is_empty() => "History is empty.".to_string(),
            Ok(records) => records
                .iter()
                .map(|r| format!("#{} — {}\n{}", r.id, r.request, r.response))
                .collect::<Vec<_>>()
                .join("\n\n"),
            Err(e) => format!("History unavailable: {}", e),
        }
    }

    async fn search(&self, term: &str) -> String {
        match self.store.search_substring(term).await {
            Ok(records) if records.is_empty() => format!("Nothing found for '{}'.", term),
            Ok(records) => records
                .iter()
                .map(|r| format!("#{} — {}\n{}", r.id, r.request, r.response))
                .collect::<Vec<_>>()
                .join("\n\n"),
            Err(e) => format!("History unavailable: {}", e),
        }
    }

    async fn clear(&self) -> String {
        match self.store.clear_all().await {
            Ok(n) => format!("History cleared ({} records removed).", n),
            Err(e) => format!("Could not clear history: {}", e),
        }
    }

    async fn export_text(&self) -> String {
        match crate::export::export_text(&self.store, &PathBuf::from(TEXT_EXPORT_PATH)).await {
            Ok(0) => "History is empty, nothing to export.".to_string(),
            Ok(n) => format!("Exported {} records to '{}'.", n, TEXT_EXPORT_PATH),
            Err(e) => format!("Export failed: {}", e),
        }
    }

    async fn export_notebook(&self) -> String {
        match crate::export::export_notebook(&self.store, &PathBuf::from(NOTEBOOK_EXPORT_PATH))
            .await
        {
            Ok(n) => format!("Exported {} records to '{}'.", n, NOTEBOOK_EXPORT_PATH),
            Err(e) => format!("Export failed: {}", e),
        }
    }

    fn switch_model(&mut self, name: String) -> String {
        self.primary_config.model = name.clone();
        let provider = OpenAiCompatibleProvider::new(self.primary_config.clone());
        self.aggregator.set_primary(Arc::new(provider));
        format!("Model switched to '{}'.", name)
    }

    async fn show_ranking(&self) -> String {
        match self.store.ranking().await {
            Ok(entries) if entries.is_empty() => "Ranking is empty.".to_string(),
            Ok(entries) => entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    format!("{}. {} — {} points ({} quizzes)", i + 1, e.name, e.points, e.quiz_count)
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => format!("Ranking unavailable: {}", e),
        }
    }

    async fn add_score(&self, points: i64) -> String {
        if points < 0 {
            return "Points must be non-negative.".to_string();
        }
        match self.store.add_score(&self.user, points).await {
            Ok(()) => match self.store.get_participant(&self.user).await {
                Ok(Some(e)) => format!(
                    "{} now has {} points over {} quizzes.",
                    e.name, e.points, e.quiz_count
                ),
                _ => "Score recorded.".to_string(),
            },
            Err(e) => format!("Could not record score: {}", e),
        }
    }
}

fn help_text() -> String {
    "Available commands:
  help                 show this message
  history [n]          show the last n interactions (default 10)
  search <term>        search the history
  clear                delete the whole history
  export               export the history to a text file
  notebook             export the history to a notebook file
  model <name>         switch the primary provider model
  all <question>       ask every configured provider
  explain <code>       explain a code snippet
  summarize <text>     summarize a long text
  error <message>      explain an error message
  fix <code>           review and fix a code snippet
  concept <topic>      explain a programming concept
  library <name>       explain what a library is for
  materials            suggest free learning materials
  projects [level]     suggest project ideas by level
  quiz                 get a multiple-choice question
  challenge            get a programming challenge
  score <points>       record quiz points for your user
  ranking              show the quiz ranking
  analyze <code>       run linters and a model review over a snippet
  stackoverflow <q>    search Stack Overflow
  quit                 leave

Anything else is sent to the primary provider as a question."
        .to_string()
}

/// Read lines from stdin and dispatch until `quit` or EOF.
pub async fn run(app: &mut App) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(b">>> ").await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let (flow, output) = app.handle_line(&line).await;
        if !output.is_empty() {
            stdout.write_all(output.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
        if flow == Flow::Quit {
            break;
        }
        stdout.write_all(b">>> ").await?;
        stdout.flush().await?;
    }

    Ok(())
}
