mod analyze;
mod config;
mod format;
mod gemini;
mod providers;
mod region;
mod search;
mod session;

pub const USER_AGENT: &str = concat!("steelwatch/", env!("CARGO_PKG_VERSION"));

use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::Client;
use tracing::info;

use analyze::AnalysisOptions;
use config::Config;
use gemini::GeminiClient;
use providers::{BraveClient, SerperClient};
use search::{Providers, SearchResult, TimeFilter};
use session::{Dashboard, SessionSettings};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound for any request; provider and model calls set tighter per-request limits.
const HTTP_TIMEOUT: Duration = Duration::from_secs(90);
const MAX_REDIRECTS: usize = 5;

#[derive(Parser)]
#[command(version, about = "European steel market intelligence from multilingual web search")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a full session: translate, search, enrich, report
    Run {
        query: String,
        /// Recency window for every search
        #[arg(long, value_enum, default_value_t = TimeFilter::Month)]
        time: TimeFilter,
        /// Regenerate the report with emphasis on this topic
        #[arg(long)]
        focus: Option<String>,
        /// Output language (overrides STEELWATCH_LANGUAGE)
        #[arg(long)]
        language: Option<String>,
        /// Number of top signals listed under the report
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Print the session as JSON instead of Markdown
        #[arg(long)]
        json: bool,
    },
    /// Show the query localized into every target-market language
    Translate { query: String },
    /// Deep-dive analysis of a single article
    Dive {
        #[arg(long)]
        title: String,
        #[arg(long)]
        link: String,
        #[arg(long, default_value = "")]
        snippet: String,
        #[arg(long, default_value = "Manual")]
        source: String,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

fn providers(http: &Client, config: &Config) -> Providers {
    let providers = Providers {
        serper: config
            .serper_key
            .clone()
            .map(|key| SerperClient::new(http.clone(), key)),
        brave: config
            .brave_key
            .clone()
            .map(|key| BraveClient::new(http.clone(), key)),
    };
    providers.warn_if_unconfigured();
    providers
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("steelwatch=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()?;
    let gemini = GeminiClient::from_config(http.clone(), &config)
        .inspect_err(|e| tracing::error!("{e}"))?;

    match cli.command {
        Command::Run {
            query,
            time,
            focus,
            language,
            top,
            json,
        } => {
            let settings = SessionSettings {
                time,
                strict_safety: config.strict_safety,
                analysis: AnalysisOptions {
                    language: language.unwrap_or_else(|| config.language.clone()),
                    report_model: Some(config.report_model.clone()),
                },
            };
            let dashboard = Dashboard::new(gemini, providers(&http, &config), settings);

            info!(%query, ?time, "starting session");
            let mut outcome = dashboard.run(&query).await?;
            if let Some(focus) = focus.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
                info!(focus, "refining report");
                outcome.report = dashboard.refine(&outcome, focus).await;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", format::format_outcome(&outcome, top));
            }
        }
        Command::Translate { query } => {
            let localized = search::translate(&gemini, query.trim()).await;
            print!("{}", format::format_localized(&query, &localized));
        }
        Command::Dive {
            title,
            link,
            snippet,
            source,
            language,
            json,
        } => {
            let article = SearchResult::new(title, link, snippet, source);
            let language = language.unwrap_or_else(|| config.language.clone());
            let dive = analyze::deep_dive(&gemini, &article, &language).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&dive)?);
            } else {
                print!("{}", format::format_dive(&article, &dive));
            }
        }
    }
    Ok(())
}
