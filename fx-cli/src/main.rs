//! FX CLI
//!
//! Command-line currency converter:
//! - Load configuration from environment (and `.env`)
//! - Build the rate client and the favorites storage
//! - Run one command, or the interactive `watch` converter

mod config;
mod output;
mod watch;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fx_client::ExchangeRateClient;
use fx_hex::{ConvertOutcome, ConverterSession, FavoritesStore, RateStore};
use fx_repo::{FileSlotStorage, build_storage};
use fx_types::{CurrencyCode, FxError, catalog};

use config::Config;

#[derive(Parser)]
#[command(name = "fx")]
#[command(author, version, about = "Currency converter", long_about = None)]
struct Cli {
    /// Rate service endpoint (overrides FX_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding saved favorites (overrides FX_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an amount between two currencies
    Convert {
        amount: f64,
        from: CurrencyCode,
        to: CurrencyCode,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show every quote against one base currency
    Rates {
        base: CurrencyCode,
        #[arg(long)]
        json: bool,
    },
    /// Search the currency catalog
    Currencies {
        /// Matches code or name, case-insensitively
        query: Option<String>,
        /// Only list popular currencies
        #[arg(long)]
        popular: bool,
        #[arg(long)]
        json: bool,
    },
    /// Manage favorite currency pairs
    Favorites {
        #[command(subcommand)]
        action: FavoriteCommands,
    },
    /// Interactive converter reading amounts and commands from stdin
    Watch {
        #[arg(long, default_value = "USD")]
        from: CurrencyCode,
        #[arg(long, default_value = "EUR")]
        to: CurrencyCode,
        /// Quiet period before converting, in milliseconds (overrides FX_DEBOUNCE_MS)
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
}

#[derive(Subcommand)]
enum FavoriteCommands {
    /// List saved pairs
    List {
        #[arg(long)]
        json: bool,
    },
    /// Save a pair
    Add { from: CurrencyCode, to: CurrencyCode },
    /// Forget a pair
    Remove { from: CurrencyCode, to: CurrencyCode },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,fx_hex=debug".into());
    let json = std::env::var("FX_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Commands::Watch {
        debounce_ms: Some(ms),
        ..
    } = &cli.command
    {
        config.debounce = Duration::from_millis(*ms);
    }
    config
}

fn rate_client(config: &Config) -> Result<ExchangeRateClient> {
    Ok(ExchangeRateClient::with_timeout(
        &config.api_url,
        config.http_timeout,
    )?)
}

fn favorites_store(config: &Config) -> Result<FavoritesStore<FileSlotStorage>> {
    let storage = build_storage(&config.data_dir)?;
    Ok(FavoritesStore::load(storage))
}

/// Logs the detailed error and turns it into the user-facing message.
fn user_error(err: FxError) -> anyhow::Error {
    tracing::debug!(error = %err, "Command failed");
    anyhow::anyhow!(err.user_message())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = apply_overrides(Config::from_env()?, &cli);
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Convert {
            amount,
            from,
            to,
            json,
        } => {
            let store = RateStore::new(rate_client(&config)?);
            let outcome = store
                .convert_fresh(amount, &from, &to)
                .await
                .map_err(user_error)?;
            let ConvertOutcome::Converted(result) = outcome else {
                anyhow::bail!("Conversion was interrupted, please try again.");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", output::conversion_line(&result));
            }
        }

        Commands::Rates { base, json } => {
            let client = rate_client(&config)?;
            let snapshot = client
                .latest(&base)
                .await
                .map_err(|e| user_error(e.into()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", output::rates_table(&snapshot));
            }
        }

        Commands::Currencies {
            query,
            popular,
            json,
        } => {
            let matches: Vec<_> = catalog::search(query.as_deref().unwrap_or(""))
                .into_iter()
                .filter(|c| !popular || c.popular)
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else if matches.is_empty() {
                println!("No currencies found");
            } else {
                for currency in matches {
                    println!("{}", output::currency_row(currency));
                }
            }
        }

        Commands::Favorites { action } => {
            let favorites = favorites_store(&config)?;
            match action {
                FavoriteCommands::List { json } => {
                    let list = favorites.list();
                    if json {
                        println!("{}", serde_json::to_string_pretty(&list)?);
                    } else {
                        print!("{}", output::favorites_list(&list));
                    }
                }
                FavoriteCommands::Add { from, to } => {
                    if favorites.add(&from, &to)? {
                        println!("★ {from}/{to} added to favorites");
                    } else {
                        println!("{from}/{to} is already a favorite");
                    }
                }
                FavoriteCommands::Remove { from, to } => {
                    if favorites.remove(&from, &to)? {
                        println!("☆ {from}/{to} removed from favorites");
                    } else {
                        println!("{from}/{to} was not a favorite");
                    }
                }
            }
        }

        Commands::Watch { from, to, .. } => {
            let rates = Arc::new(RateStore::new(rate_client(&config)?));
            let favorites = Arc::new(favorites_store(&config)?);
            let (session, events) = ConverterSession::new(rates, favorites, config.debounce);
            session.set_from(from);
            session.set_to(to);
            if let Err(e) = session.warm_up().await {
                eprintln!("{}", e.user_message());
            }
            watch::run(session, events).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_parse_convert() {
        let cli = parse(&["fx", "convert", "100", "usd", "eur", "--json"]);
        match cli.command {
            Commands::Convert {
                amount,
                from,
                to,
                json,
            } => {
                assert_eq!(amount, 100.0);
                assert_eq!(from, "USD");
                assert_eq!(to, "EUR");
                assert!(json);
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_invalid_code_is_rejected_by_parser() {
        assert!(Cli::try_parse_from(["fx", "rates", "U/SD"]).is_err());
    }

    #[test]
    fn test_watch_defaults() {
        let cli = parse(&["fx", "watch"]);
        match cli.command {
            Commands::Watch {
                from,
                to,
                debounce_ms,
            } => {
                assert_eq!(from, "USD");
                assert_eq!(to, "EUR");
                assert_eq!(debounce_ms, None);
            }
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&[
            "fx",
            "watch",
            "--debounce-ms",
            "50",
            "--data-dir",
            "/tmp/favs",
            "--api-url",
            "http://127.0.0.1:9/latest",
        ]);
        let config = apply_overrides(Config::from_lookup(|_| None).unwrap(), &cli);
        assert_eq!(config.debounce, Duration::from_millis(50));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/favs"));
        assert_eq!(config.api_url, "http://127.0.0.1:9/latest");
    }

    #[test]
    fn test_parse_favorites_add() {
        let cli = parse(&["fx", "favorites", "add", "gbp", "jpy"]);
        assert!(matches!(
            cli.command,
            Commands::Favorites {
                action: FavoriteCommands::Add { ref from, ref to }
            } if from == "GBP" && to == "JPY"
        ));
    }
}
