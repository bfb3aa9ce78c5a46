//! Resumo CLI - document analysis from the terminal
//!
//! The client logic is contained in lib.rs, and this file is responsible
//! for parsing arguments, printing results and handling top-level errors.

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use resumo::export::{self, ResultKind};
use resumo::hooks::{
    BulletsHook, CompareHook, EntitiesHook, KeywordsHook, QuestionHook, SummarizeHook, TopicsHook,
};
use resumo::types::{SummarizeResponse, DEFAULT_MAX_TOKENS, DEFAULT_NUM_TOPICS};
use resumo::{
    endpoints, health, validation, ApiClient, Config, FileUpload, HealthPoller, HealthStatus, HookError,
    SummaryType,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "resumo")]
#[command(author, version, about = "Document analysis from the terminal", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Use this config file instead of resumo.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Text to analyze
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,
    /// PDF, DOCX or TXT file to analyze
    #[arg(long)]
    file: Option<PathBuf>,
    /// Save the result as a Markdown file
    #[arg(long)]
    save: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check once whether the backend is reachable
    Health,
    /// Keep polling the backend and print status changes
    Watch {
        /// Seconds between checks
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Summarize a PDF or DOCX document
    Summarize {
        /// Document to summarize
        file: PathBuf,
        /// general, bullets, tldr, business or academic
        #[arg(long = "type", default_value_t = SummaryType::General)]
        summary_type: SummaryType,
        /// Token budget for the summary (256-2048)
        #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
        max_tokens: u32,
        /// Save the summary as a Markdown file
        #[arg(long)]
        save: bool,
    },
    /// Extract keywords
    Keywords(InputArgs),
    /// Extract named entities
    Entities(InputArgs),
    /// Convert text to bullet points
    Bullets(InputArgs),
    /// List the main topics
    Topics {
        #[command(flatten)]
        input: InputArgs,
        /// Number of topics (1-10)
        #[arg(long, default_value_t = DEFAULT_NUM_TOPICS)]
        num_topics: u32,
    },
    /// Ask a question about a text or document
    Ask {
        #[command(flatten)]
        input: InputArgs,
        /// The question
        #[arg(short, long)]
        question: String,
    },
    /// Compare two to five texts
    Compare {
        /// Texts to compare
        texts: Vec<String>,
        /// Save the comparison as a Markdown file
        #[arg(long)]
        save: bool,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config and build the client; every command but `completions` needs both.
fn open(config_path: Option<&Path>) -> anyhow::Result<(Config, ApiClient)> {
    let config = match config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let client = ApiClient::new(&config.api)?;
    Ok((config, client))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "resumo", &mut std::io::stdout());
        }
        Commands::Health => {
            let (_, client) = open(config_path)?;
            let outcome = endpoints::health_check(&client).await;
            let status = HealthStatus::from_check(&outcome);
            match outcome {
                Ok(health) => println!("{} {}", paint(status), health.service),
                Err(e) => println!("{} {}", paint(status), e.message),
            }
        }
        Commands::Watch { interval } => {
            let (config, client) = open(config_path)?;
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.health.interval());
            watch(client, interval).await;
        }
        Commands::Summarize {
            file,
            summary_type,
            max_tokens,
            save,
        } => {
            let (config, client) = open(config_path)?;
            let upload = FileUpload::from_path(&file).await?;
            validation::check_document(&upload)?;
            println!("Summarising {} ({} bytes)...\n", upload.filename, upload.size());

            let hook = SummarizeHook::new(client, config.hooks.overlap);
            let outcome = hook.summarize(Some(upload), summary_type, max_tokens).await;
            let summary = settle(outcome, hook.state().error)?;
            print_summary(&summary);
            if save {
                let name = export::summary_filename(&summary.original_filename);
                save_result(&config, &name, &summary.summary)?;
            }
        }
        Commands::Keywords(input) => {
            let (config, client) = open(config_path)?;
            let (text, file) = read_input(&input).await?;
            let hook = KeywordsHook::new(client, config.hooks.overlap);
            let outcome = hook.extract(text, file).await;
            let result = settle(outcome, hook.state().error)?;
            emit(&config, "🔑 Keywords", ResultKind::Keywords, &result, input.save)?;
        }
        Commands::Entities(input) => {
            let (config, client) = open(config_path)?;
            let (text, file) = read_input(&input).await?;
            let hook = EntitiesHook::new(client, config.hooks.overlap);
            let outcome = hook.extract(text, file).await;
            let result = settle(outcome, hook.state().error)?;
            emit(&config, "🏷️  Entities", ResultKind::Entities, &result, input.save)?;
        }
        Commands::Bullets(input) => {
            let (config, client) = open(config_path)?;
            let (text, file) = read_input(&input).await?;
            let hook = BulletsHook::new(client, config.hooks.overlap);
            let outcome = hook.convert(text, file).await;
            let result = settle(outcome, hook.state().error)?;
            emit(&config, "📌 Bullets", ResultKind::Bullets, &result, input.save)?;
        }
        Commands::Topics { input, num_topics } => {
            let (config, client) = open(config_path)?;
            let (text, file) = read_input(&input).await?;
            let hook = TopicsHook::new(client, config.hooks.overlap);
            let outcome = hook.analyze(text, file, Some(num_topics)).await;
            let result = settle(outcome, hook.state().error)?;
            emit(&config, "🧭 Topics", ResultKind::Topics, &result, input.save)?;
        }
        Commands::Ask { input, question } => {
            let (config, client) = open(config_path)?;
            let (text, file) = read_input(&input).await?;
            validation::check_question(&question)?;
            let hook = QuestionHook::new(client, config.hooks.overlap);
            let outcome = hook.ask(text, file, &question).await;
            let result = settle(outcome, hook.state().error)?;
            emit(&config, "💬 Answer", ResultKind::Answer, &result, input.save)?;
        }
        Commands::Compare { texts, save } => {
            let (config, client) = open(config_path)?;
            validation::check_compare_texts(&texts)?;
            let hook = CompareHook::new(client, config.hooks.overlap);
            let outcome = hook.compare(texts).await;
            let result = settle(outcome, hook.state().error)?;
            emit(&config, "⚖️  Comparison", ResultKind::Comparison, &result, save)?;
        }
    }

    Ok(())
}

/// Collect and check the text/file pair. Supplying neither is left to the
/// hook, which reports it without calling the backend.
async fn read_input(args: &InputArgs) -> anyhow::Result<(Option<String>, Option<FileUpload>)> {
    if let Some(text) = &args.text {
        validation::check_text(text)?;
    }
    let file = match &args.file {
        Some(path) => {
            let upload = FileUpload::from_path(path).await?;
            validation::check_text_file(&upload)?;
            Some(upload)
        }
        None => None,
    };
    Ok((args.text.clone(), file))
}

/// Turn a hook outcome into the value or the message the hook recorded
fn settle<T>(outcome: Result<T, HookError>, recorded: Option<String>) -> anyhow::Result<T> {
    outcome.map_err(|e| anyhow::anyhow!(recorded.unwrap_or_else(|| e.to_string())))
}

fn emit(
    config: &Config,
    title: &str,
    kind: ResultKind,
    result: &str,
    save: bool,
) -> anyhow::Result<()> {
    println!("=== {} ===\n", title);
    println!("{}", result);
    if save {
        save_result(config, &export::markdown_filename(kind), result)?;
    }
    Ok(())
}

fn save_result(config: &Config, filename: &str, content: &str) -> anyhow::Result<()> {
    let path = export::save_markdown(&config.output.dir, filename, content)?;
    println!("\n💾 Saved to {}", path.display());
    Ok(())
}

fn print_summary(summary: &SummarizeResponse) {
    println!("📁 File:      {}", summary.original_filename);
    println!("🎯 Type:      {}", summary.summary_type);
    println!(
        "📜 Length:    {} → {} characters",
        summary.length_original, summary.length_summary
    );
    println!("✨ Reduction: {:.1}%\n", summary.reduction_percentage());
    println!("=== 📝 Summary ===\n");
    println!("{}", summary.summary);
}

fn paint(status: HealthStatus) -> colored::ColoredString {
    let label = format!("● {}", status);
    match status {
        HealthStatus::Online => label.as_str().green(),
        HealthStatus::Offline => label.as_str().red(),
        HealthStatus::Checking => label.as_str().yellow(),
    }
}

async fn watch(client: ApiClient, interval: Duration) {
    let handle = HealthPoller::start(Arc::new(client), interval);
    let mut status = handle.subscribe();
    let mut last = *status.borrow_and_update();
    println!("{}", paint(last));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = health::next_change(&mut status, last) => match next {
                Some(next) => {
                    println!("{}", paint(next));
                    last = next;
                }
                None => break,
            },
        }
    }

    handle.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING: &str = "/nonexistent/resumo.toml";

    #[tokio::test]
    async fn completions_do_not_need_a_config() {
        let cli =
            Cli::try_parse_from(["resumo", "--config", MISSING, "completions", "bash"]).unwrap();
        assert!(run(cli).await.is_ok());
    }

    #[tokio::test]
    async fn backend_commands_fail_on_missing_config() {
        let cli = Cli::try_parse_from(["resumo", "--config", MISSING, "health"]).unwrap();
        assert!(run(cli).await.is_err());
    }
}
