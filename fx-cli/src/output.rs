//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use fx_types::catalog::{self, Currency, format_amount};
use fx_types::{ConversionResult, FavoritePair, RateSnapshot};

/// `$100.00 = €90.00  (1 USD = 0.900000 EUR, as of 2024-01-01)`
pub fn conversion_line(result: &ConversionResult) -> String {
    format!(
        "{} = {}  (1 {} = {:.6} {}, as of {})",
        format_amount(result.amount, result.from.as_str()),
        format_amount(result.result, result.to.as_str()),
        result.from,
        result.rate,
        result.to,
        result.as_of,
    )
}

/// One header line describing where and when the snapshot came from.
pub fn snapshot_summary(snapshot: &RateSnapshot) -> String {
    format!(
        "{} rates for {} currencies, as of {} (updated {})",
        snapshot.base(),
        snapshot.len(),
        snapshot.as_of(),
        snapshot.updated_at().format("%Y-%m-%d %H:%M UTC"),
    )
}

/// The summary line followed by one `CODE  rate  name` row per quote.
pub fn rates_table(snapshot: &RateSnapshot) -> String {
    let mut out = snapshot_summary(snapshot);
    out.push('\n');
    for (code, rate) in snapshot.rates() {
        let name = catalog::find(code.as_str()).map_or("", |c| c.name);
        let _ = writeln!(out, "{code:<5}{rate:>16.6}  {name}");
    }
    out
}

pub fn currency_row(currency: &Currency) -> String {
    let marker = if currency.popular { "*" } else { " " };
    format!(
        "{marker} {:<5}{:<5}{}",
        currency.code,
        currency.symbol.unwrap_or(""),
        currency.name
    )
}

/// Numbered favorites, one per line, matching `use <N>` in watch mode.
pub fn favorites_list(favorites: &[FavoritePair]) -> String {
    if favorites.is_empty() {
        return "No favorites yet\n".to_string();
    }
    let mut out = String::new();
    for (i, pair) in favorites.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", i + 1, pair.name());
    }
    out
}
