//! Interactive converter driven by stdin lines.
//!
//! Each line is either a command or a new amount. Amount edits and currency
//! changes go through the session's debounce, so pasting or typing several
//! lines quickly converts only the last state.

use std::time::Duration;

use fx_hex::{ConvertOutcome, ConverterSession, SessionEvent};
use fx_types::{CurrencyCode, FxError, RateFetcher, SlotStorage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::output;

const HELP: &str = "\
commands:
  <amount>        set the amount
  from <CODE>     set the source currency
  to <CODE>       set the target currency
  swap            exchange source and target
  convert         convert now
  refresh         refetch rates for the source currency
  fav             toggle the current pair as a favorite
  favs            list favorites
  use <N>         load favorite number N
  auto on|off     switch automatic conversion
  quit            exit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchCommand {
    Amount(String),
    From(CurrencyCode),
    To(CurrencyCode),
    Swap,
    Convert,
    Refresh,
    ToggleFavorite,
    ListFavorites,
    UseFavorite(usize),
    Auto(bool),
    Help,
    Quit,
}

/// Parses one line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<WatchCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    if words.next().is_some() {
        return Err(format!("too many arguments: {}", line.trim()));
    }

    let command = match (head.to_ascii_lowercase().as_str(), arg) {
        ("from", Some(code)) => WatchCommand::From(parse_code(code)?),
        ("to", Some(code)) => WatchCommand::To(parse_code(code)?),
        ("swap", None) => WatchCommand::Swap,
        ("convert", None) => WatchCommand::Convert,
        ("refresh", None) => WatchCommand::Refresh,
        ("fav", None) => WatchCommand::ToggleFavorite,
        ("favs", None) => WatchCommand::ListFavorites,
        ("use", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => WatchCommand::UseFavorite(n),
            _ => return Err(format!("not a favorite number: {n}")),
        },
        ("auto", Some("on")) => WatchCommand::Auto(true),
        ("auto", Some("off")) => WatchCommand::Auto(false),
        ("help" | "?", None) => WatchCommand::Help,
        ("quit" | "exit", None) => WatchCommand::Quit,
        (_, None) if fx_hex::parse_amount(head).is_some() => WatchCommand::Amount(head.to_string()),
        _ => return Err(format!("unrecognized input: {}", line.trim())),
    };
    Ok(Some(command))
}

fn parse_code(raw: &str) -> Result<CurrencyCode, String> {
    CurrencyCode::new(raw).map_err(|e| e.to_string())
}

/// Runs the read-eval-print loop until EOF or `quit`.
///
/// At EOF, a conversion still waiting in the debounce is allowed to finish
/// and is printed before returning.
pub async fn run<F, S>(
    session: ConverterSession<F, S>,
    mut events: UnboundedReceiver<SessionEvent>,
) -> anyhow::Result<()>
where
    F: RateFetcher,
    S: SlotStorage,
{
    let form = session.form();
    println!(
        "{} {} -> {} (type `help` for commands)",
        form.amount, form.from, form.to
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Some(WatchCommand::Quit)) => return Ok(()),
                    Ok(Some(command)) => apply(&session, command).await,
                    Ok(None) => {}
                    Err(message) => eprintln!("{message}"),
                }
            }
            Some(event) = events.recv() => print_event(&event),
        }
    }

    while session.is_converting() {
        tokio::select! {
            Some(event) = events.recv() => print_event(&event),
            _ = tokio::time::sleep(Duration::from_millis(25)) => {}
        }
    }
    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }
    Ok(())
}

async fn apply<F, S>(session: &ConverterSession<F, S>, command: WatchCommand)
where
    F: RateFetcher,
    S: SlotStorage,
{
    match command {
        WatchCommand::Amount(text) => session.set_amount(text),
        WatchCommand::From(code) => session.set_from(code),
        WatchCommand::To(code) => session.set_to(code),
        WatchCommand::Swap => {
            session.swap();
            let form = session.form();
            println!("{} -> {}", form.from, form.to);
        }
        WatchCommand::Convert => match session.convert_now().await {
            Ok(ConvertOutcome::Converted(result)) => println!("{}", output::conversion_line(&result)),
            Ok(_) => eprintln!("Rates changed before the conversion finished; try again"),
            Err(e) => print_failure(&e),
        },
        WatchCommand::Refresh => match session.refresh().await {
            Ok(_) => {
                if let Some(snapshot) = session.rates().snapshot() {
                    println!("{}", output::snapshot_summary(&snapshot));
                }
            }
            Err(e) => print_failure(&e),
        },
        WatchCommand::ToggleFavorite => {
            let form = session.form();
            match session.toggle_favorite() {
                Ok(true) => println!("★ {}/{} added to favorites", form.from, form.to),
                Ok(false) => println!("☆ {}/{} removed from favorites", form.from, form.to),
                Err(e) => eprintln!("Unable to save favorites: {e}"),
            }
        }
        WatchCommand::ListFavorites => {
            print!("{}", output::favorites_list(&session.favorites().list()));
        }
        WatchCommand::UseFavorite(n) => match session.favorites().list().get(n - 1) {
            Some(pair) => {
                session.select_favorite(pair);
                println!("{}", pair.name());
            }
            None => eprintln!("No favorite number {n}"),
        },
        WatchCommand::Auto(enabled) => {
            session.set_auto_convert(enabled);
            println!("auto-convert {}", if enabled { "on" } else { "off" });
        }
        WatchCommand::Help => println!("{HELP}"),
        WatchCommand::Quit => {}
    }
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Converted(result) => println!("{}", output::conversion_line(result)),
        SessionEvent::Failed(e) => print_failure(e),
        SessionEvent::Skipped { from, to } => {
            eprintln!("Rates changed before {from} -> {to} could convert; type `convert` to retry")
        }
    }
}

fn print_failure(err: &FxError) {
    tracing::debug!(error = %err, "Conversion failed");
    eprintln!("{}", err.user_message());
}
