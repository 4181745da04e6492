use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stonks_core::client::error::{FetchError, FetchErrorKind};
use stonks_core::client::http::HttpMarketDataClient;
use stonks_core::domain::valuation::{ValidationError, ValuationInputs};
use stonks_core::session::sequence::Sequenced;
use stonks_core::session::AnalysisSession;

mod render;

#[derive(Debug, Parser)]
#[command(name = "stonks")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a ticker and print the recommendation and action plan.
    Analyze {
        ticker: String,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Value a company from manually entered figures. Needs no backend.
    #[command(allow_negative_numbers = true)]
    Valuate {
        #[arg(long)]
        company: String,

        #[arg(long)]
        price: f64,

        #[arg(long)]
        eps: f64,

        /// Sector name, e.g. "Technology". Unknown names use the market defaults.
        #[arg(long)]
        sector: String,

        #[arg(long)]
        book_value: Option<f64>,

        /// Expected growth as a decimal (0.08 = 8%). Defaults to the sector's typical growth.
        #[arg(long)]
        growth: Option<f64>,

        /// Required return as a decimal. Defaults to 0.10.
        #[arg(long)]
        required_return: Option<f64>,

        /// Free cash flow per share.
        #[arg(long)]
        fcf: Option<f64>,

        #[arg(long)]
        json: bool,
    },

    /// Look up tickers by symbol or company name.
    Search { query: String },

    /// Print the current market fear & greed reading.
    Sentiment,

    /// Read stdin: each line is a ticker to analyze, `?query` searches.
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stonks_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    if let Err(err) = run(args.command, &settings).await {
        if !is_user_error(&err) {
            sentry_anyhow::capture_anyhow(&err);
        }
        return Err(err);
    }
    Ok(())
}

async fn run(command: Command, settings: &stonks_core::config::Settings) -> anyhow::Result<()> {
    match command {
        Command::Valuate {
            company,
            price,
            eps,
            sector,
            book_value,
            growth,
            required_return,
            fcf,
            json,
        } => {
            let inputs = ValuationInputs {
                company_name: Some(company),
                stock_price: Some(price),
                eps: Some(eps),
                book_value,
                growth_rate: growth,
                required_return,
                sector: Some(sector),
                fcf,
            };
            let result = stonks_core::engine::valuation::valuate(inputs)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", render::valuation(&result));
            }
        }
        Command::Analyze { ticker, json } => {
            let session = connect(settings, true).await?;
            let report = session
                .analyze_ticker(&ticker)
                .await
                .with_context(|| format!("analysis of {ticker} failed"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", render::report(&report));
            }
        }
        Command::Search { query } => {
            let session = connect(settings, false).await?;
            let found = session.client().search(&query).await?;
            println!("{}", render::matches(&query, &found));
        }
        Command::Sentiment => {
            let session = connect(settings, false).await?;
            let index = session.refresh_sentiment().await?;
            println!("{}", render::sentiment(&index));
        }
        Command::Watch => {
            let session = Arc::new(connect(settings, true).await?);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            watch(session, stdin).await?;
        }
    }
    Ok(())
}

async fn connect(
    settings: &stonks_core::config::Settings,
    load_sentiment: bool,
) -> anyhow::Result<AnalysisSession> {
    let client = Arc::new(HttpMarketDataClient::from_settings(settings)?);
    let session = if load_sentiment {
        AnalysisSession::start(client, settings.search_debounce()).await
    } else {
        AnalysisSession::new(client, settings.search_debounce())
    };
    Ok(session)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct WatchStats {
    lines: usize,
    peak_in_flight: usize,
}

/// Lines race each other; only the newest analysis and the newest search get printed.
/// Finished lookups are reaped while waiting for input, so a long session stays flat.
async fn watch<R>(session: Arc<AnalysisSession>, input: R) -> anyhow::Result<WatchStats>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut tasks = tokio::task::JoinSet::new();
    let mut stats = WatchStats::default();

    loop {
        tokio::select! {
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(err) = joined {
                    tracing::error!(error = %err, "watch task panicked");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("read stdin failed")? else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                dispatch(&session, &mut tasks, line);
                stats.lines += 1;
                stats.peak_in_flight = stats.peak_in_flight.max(tasks.len());
            }
        }
    }

    while tasks.join_next().await.is_some() {}
    tracing::debug!(lines = stats.lines, peak_in_flight = stats.peak_in_flight, "watch finished");
    Ok(stats)
}

fn dispatch(session: &Arc<AnalysisSession>, tasks: &mut tokio::task::JoinSet<()>, line: &str) {
    let session = Arc::clone(session);

    if let Some(query) = line.strip_prefix('?') {
        let query = query.trim().to_string();
        tasks.spawn(async move {
            match session.search(&query).await {
                Ok(Sequenced::Current(found)) => println!("{}", render::matches(&query, &found)),
                Ok(Sequenced::Superseded) => {}
                Err(err) => tracing::warn!(%query, error = %err, "search failed"),
            }
        });
    } else {
        let ticker = line.to_string();
        tasks.spawn(async move {
            match session.analyze_latest(&ticker).await {
                Ok(Sequenced::Current(report)) => println!("{}\n", render::report(&report)),
                Ok(Sequenced::Superseded) => {}
                Err(err) if err.is_not_found() => eprintln!("{err}"),
                Err(err) => tracing::error!(%ticker, error = %err, "analysis failed"),
            }
        });
    }
}

/// Bad input and unknown tickers are the user's to fix, not incidents.
fn is_user_error(err: &anyhow::Error) -> bool {
    if err.downcast_ref::<ValidationError>().is_some() {
        return true;
    }
    matches!(
        err.downcast_ref::<FetchError>().map(FetchError::kind),
        Some(FetchErrorKind::NotFound | FetchErrorKind::InvalidInput)
    )
}

fn init_sentry(settings: &stonks_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use stonks_core::client::MarketDataClient;
    use stonks_core::domain::market::{SentimentIndex, StockSnapshot, TickerMatch};
    use tokio::io::AsyncWriteExt;

    struct InstantBackend;

    #[async_trait::async_trait]
    impl MarketDataClient for InstantBackend {
        fn provider_name(&self) -> &'static str {
            "instant"
        }

        async fn fetch_stock(&self, ticker: &str) -> Result<StockSnapshot, FetchError> {
            Ok(StockSnapshot {
                symbol: ticker.to_string(),
                current_price: Some(10.0),
                ..Default::default()
            })
        }

        async fn search(&self, _query: &str) -> Result<Vec<TickerMatch>, FetchError> {
            Ok(Vec::new())
        }

        async fn fetch_sentiment(&self) -> Result<SentimentIndex, FetchError> {
            Err(FetchError::Backend("no sentiment".into()))
        }
    }

    #[tokio::test]
    async fn watch_reaps_finished_lookups_between_lines() {
        let session = Arc::new(AnalysisSession::new(
            Arc::new(InstantBackend),
            Duration::from_millis(1),
        ));
        let (mut tx, rx) = tokio::io::duplex(64);
        let feeder = tokio::spawn(async move {
            for line in ["AAPL\n", "\n", "?micro\n", "MSFT\n", "NVDA\n"] {
                tx.write_all(line.as_bytes()).await.unwrap();
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        });

        let stats = watch(session, tokio::io::BufReader::new(rx)).await.unwrap();
        feeder.await.unwrap();

        assert_eq!(stats.lines, 4);
        assert_eq!(stats.peak_in_flight, 1);
    }
}
