//! Curex CLI
//!
//! Terminal front end for the curex conversion pipeline.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use curex_client::{
    ConverterSession, FallbackSource, FlagSide, Presentation, RateSource, Selection, SourceConfig,
};
use curex_common::{flag_url, Conversion, CurrencyCode, HistoricalSeries};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Curex CLI
#[derive(Parser, Debug)]
#[command(name = "curex")]
#[command(about = "Currency conversion against the open currency-rate API")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available currencies
    Currencies,

    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert
        amount: String,

        /// Source currency code
        from: String,

        /// Target currency code
        to: String,

        /// Also convert in the opposite direction
        #[arg(long)]
        swap: bool,
    },

    /// Show the trailing 7-day rate history for a pair
    History {
        /// Source currency code
        from: String,

        /// Target currency code
        to: String,
    },
}

/// Presentation port that renders to the terminal.
struct TerminalPort;

impl Presentation for TerminalPort {
    fn set_result(&self, conversion: &Conversion) {
        println!("{conversion}");
        println!("{}", conversion.reverse_text());
        println!("Last updated: {}", conversion.as_of);
    }

    fn set_error(&self, message: &str) {
        eprintln!("error: {message}");
    }

    fn set_loading(&self, _loading: bool) {}

    fn set_flag(&self, side: FlagSide, code: &CurrencyCode) {
        let slot = match side {
            FlagSide::From => "from",
            FlagSide::To => "to",
        };
        info!(slot, code = %code, url = flag_url(code), "Flag updated");
    }

    fn set_series(&self, series: &HistoricalSeries) {
        if series.is_empty() {
            println!("No historical data for {}/{}", series.from, series.to);
            return;
        }
        for point in series.points() {
            println!("{}  {}", point.date, point.rate);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = SourceConfig::from_env();
    config.validate().map_err(anyhow::Error::msg)?;

    let source: Arc<dyn RateSource> = Arc::new(FallbackSource::from_config(&config));
    let session = ConverterSession::new(source.clone(), TerminalPort);

    match args.command {
        Command::Currencies => {
            let catalog = source.catalog().await?;
            for (code, name) in catalog.iter() {
                println!("{code}  {name}");
            }
        }
        Command::Convert {
            amount,
            from,
            to,
            swap,
        } => {
            session.replace_selection(Selection {
                amount,
                from: from.as_str().into(),
                to: to.as_str().into(),
            });

            if let Err(e) = session.submit().await {
                anyhow::bail!("invalid input: {e}");
            }

            if swap {
                println!();
                session
                    .swap()
                    .await
                    .map_err(|e| anyhow::anyhow!("invalid input: {e}"))?;
            }
        }
        Command::History { from, to } => {
            session.replace_selection(Selection {
                amount: "1".to_string(),
                from: from.as_str().into(),
                to: to.as_str().into(),
            });
            session.show_history().await;
        }
    }

    Ok(())
}
