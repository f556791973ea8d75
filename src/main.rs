//! mentor - Main entry point.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mentor::{
    config::{Config, DatabaseConfig},
    context::ContextAssembler,
    history::HistoryStore,
    llm::create_aggregator,
    repl::{self, App},
    translate::{HttpTranslator, Translator},
};

/// Conversational programming tutor with persistent history.
#[derive(Parser, Debug)]
#[command(name = "mentor", version)]
struct Cli {
    /// SQLite database path (overrides MENTOR_DB).
    #[arg(long)]
    db: Option<String>,

    /// Name used for the quiz ranking.
    #[arg(long, default_value = "anonymous")]
    user: String,

    /// Handle a single input line and exit (no interactive loop).
    #[arg(short, long)]
    message: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mentor=info")),
        )
        .with_target(false)
        .init();

    let mut config = Config::from_env().map_err(|e| anyhow::anyhow!("{}", e))?;
    if let Some(db) = cli.db {
        config.database = DatabaseConfig::with_url(db);
    }

    let store = HistoryStore::new(&config.database).await?;
    tracing::info!("History store ready at {}", config.database.url);

    let translator: Option<Arc<dyn Translator>> = HttpTranslator::from_config(&config.translate)
        .map(|t| Arc::new(t) as Arc<dyn Translator>);
    if translator.is_none() {
        tracing::info!("No translation endpoint configured; secondary providers get raw prompts");
    }

    let aggregator = create_aggregator(
        &config.llm,
        translator,
        &config.translate.source_lang,
        &config.translate.target_lang,
    );
    tracing::info!("Primary model: {}", config.llm.primary.model);

    let assembler = ContextAssembler::new(config.context.clone());

    let mut app = App::new(store, assembler, aggregator, &config, cli.user);
    app.register_user().await?;

    if let Some(message) = cli.message {
        let (_, output) = app.handle_line(&message).await;
        println!("{}", output);
        return Ok(());
    }

    println!("mentor — programming tutor. Type 'help' for commands, 'quit' to leave.");
    repl::run(&mut app).await
}
