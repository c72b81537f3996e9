//! Static Currency Catalog with Macro-Based Table Generation
//!
//! The catalog is reference data only: currency codes, display names, symbols
//! and a "popular" flag used to float common picks to the top of a picker.
//! Nothing here is fetched; the remote rate service stays authoritative for
//! which codes actually have quotes.
//!
//! # Adding a New Currency
//! Add a line to the `define_currencies!` invocation:
//! ```ignore
//! define_currencies! {
//!     // ... existing currencies ...
//!     ISK => ("Icelandic Krona", Some("kr"), 0, false),
//! }
//! ```
//!
//! # Example
//! ```
//! use fx_catalog::{codes, find, format_amount, search};
//!
//! let usd = find("usd").unwrap();
//! assert_eq!(usd.code, codes::USD);
//!
//! let dollars: Vec<_> = search("dollar").iter().map(|c| c.code).collect();
//! assert!(dollars.contains(&"CAD"));
//!
//! assert_eq!(format_amount(1234.5, "USD"), "$1,234.50");
//! ```

use serde::Serialize;

// ─────────────────────────────────────────────────────────────────────────────
// Currency Entry
// ─────────────────────────────────────────────────────────────────────────────

/// One row of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: Option<&'static str>,
    /// Decimal places used when formatting amounts for display.
    pub decimals: u8,
    /// Whether the picker suggests this currency before the rest.
    pub popular: bool,
}

impl Currency {
    fn matches(&self, needle: &str) -> bool {
        self.code.to_lowercase().contains(needle) || self.name.to_lowercase().contains(needle)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: Defines the catalog table and one code constant per currency
// ─────────────────────────────────────────────────────────────────────────────

/// Macro to define the catalog table plus the `codes` and `currencies`
/// constant modules.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     CODE => ("Display name", Some("symbol") | None, decimals, popular),
/// }
/// ```
#[macro_export]
macro_rules! define_currencies {
    (
        $(
            $code:ident => ($name:literal, $symbol:expr, $decimals:literal, $popular:literal)
        ),* $(,)?
    ) => {
        /// String constants for every catalogued currency code.
        pub mod codes {
            $(
                pub const $code: &str = stringify!($code);
            )*
        }

        /// One constant catalog row per currency.
        pub mod currencies {
            use super::Currency;

            $(
                pub const $code: Currency = Currency {
                    code: stringify!($code),
                    name: $name,
                    symbol: $symbol,
                    decimals: $decimals,
                    popular: $popular,
                };
            )*
        }

        static CATALOG: &[Currency] = &[$(currencies::$code),*];
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS - Add new currencies here!
// ─────────────────────────────────────────────────────────────────────────────

define_currencies! {
    USD => ("US Dollar", Some("$"), 2, true),
    EUR => ("Euro", Some("€"), 2, true),
    GBP => ("British Pound", Some("£"), 2, true),
    JPY => ("Japanese Yen", Some("¥"), 0, true),
    AUD => ("Australian Dollar", Some("A$"), 2, true),
    CAD => ("Canadian Dollar", Some("C$"), 2, true),
    CHF => ("Swiss Franc", Some("CHF"), 2, true),
    CNY => ("Chinese Yuan", Some("¥"), 2, true),
    INR => ("Indian Rupee", Some("₹"), 2, true),
    AED => ("UAE Dirham", None, 2, false),
    ARS => ("Argentine Peso", None, 2, false),
    BRL => ("Brazilian Real", Some("R$"), 2, false),
    CZK => ("Czech Koruna", Some("Kč"), 2, false),
    DKK => ("Danish Krone", Some("kr"), 2, false),
    EGP => ("Egyptian Pound", None, 2, false),
    HKD => ("Hong Kong Dollar", Some("HK$"), 2, false),
    HUF => ("Hungarian Forint", Some("Ft"), 2, false),
    IDR => ("Indonesian Rupiah", Some("Rp"), 2, false),
    ILS => ("Israeli New Shekel", Some("₪"), 2, false),
    KRW => ("South Korean Won", Some("₩"), 0, false),
    MXN => ("Mexican Peso", Some("MX$"), 2, false),
    MYR => ("Malaysian Ringgit", Some("RM"), 2, false),
    NOK => ("Norwegian Krone", Some("kr"), 2, false),
    NZD => ("New Zealand Dollar", Some("NZ$"), 2, false),
    PHP => ("Philippine Peso", Some("₱"), 2, false),
    PLN => ("Polish Zloty", Some("zł"), 2, false),
    RUB => ("Russian Ruble", Some("₽"), 2, false),
    SAR => ("Saudi Riyal", None, 2, false),
    SEK => ("Swedish Krona", Some("kr"), 2, false),
    SGD => ("Singapore Dollar", Some("S$"), 2, false),
    THB => ("Thai Baht", Some("฿"), 2, false),
    TRY => ("Turkish Lira", Some("₺"), 2, false),
    TWD => ("New Taiwan Dollar", Some("NT$"), 2, false),
    UAH => ("Ukrainian Hryvnia", Some("₴"), 2, false),
    VND => ("Vietnamese Dong", Some("₫"), 0, false),
    ZAR => ("South African Rand", Some("R"), 2, false),
}

// ─────────────────────────────────────────────────────────────────────────────
// Lookup & Search
// ─────────────────────────────────────────────────────────────────────────────

/// Every catalogued currency, in catalog order.
pub fn all() -> &'static [Currency] {
    CATALOG
}

/// The popular subset, in catalog order.
pub fn popular() -> impl Iterator<Item = &'static Currency> {
    CATALOG.iter().filter(|c| c.popular)
}

/// Finds a currency by code, ignoring case and surrounding whitespace.
pub fn find(code: &str) -> Option<&'static Currency> {
    let code = code.trim();
    CATALOG.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Case-insensitive substring search over code and name jointly.
///
/// Results keep catalog order; they are not ranked. An empty (or blank)
/// query matches everything.
pub fn search(query: &str) -> Vec<&'static Currency> {
    let needle = query.trim().to_lowercase();
    CATALOG.iter().filter(|c| c.matches(&needle)).collect()
}

/// Search results split the way a picker shows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedMatches {
    pub popular: Vec<&'static Currency>,
    pub others: Vec<&'static Currency>,
}

/// Runs [`search`] and separates popular matches from the rest.
pub fn search_grouped(query: &str) -> GroupedMatches {
    let (popular, others) = search(query).into_iter().partition(|c| c.popular);
    GroupedMatches { popular, others }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display Formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Formats an amount for display using the currency's symbol and precision.
///
/// Unknown codes fall back to two decimals followed by the code.
pub fn format_amount(amount: f64, code: &str) -> String {
    match find(code) {
        Some(currency) => {
            let digits = group_thousands(amount.abs(), currency.decimals as usize);
            let sign = if amount < 0.0 { "-" } else { "" };
            match currency.symbol {
                Some(symbol) => format!("{sign}{symbol}{digits}"),
                None => format!("{sign}{digits} {}", currency.code),
            }
        }
        None => {
            let digits = group_thousands(amount.abs(), 2);
            let sign = if amount < 0.0 { "-" } else { "" };
            format!("{sign}{digits} {}", code.trim().to_uppercase())
        }
    }
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let fixed = format!("{value:.decimals$}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{grouped}.{frac}"),
        None => grouped,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<_> = all().iter().map(|c| c.code).collect();
        assert_eq!(codes.len(), all().len());
    }

    #[test]
    fn test_code_constants_match_table() {
        assert_eq!(codes::USD, "USD");
        assert_eq!(find(codes::EUR).unwrap().name, "Euro");
        assert_eq!(find("INR"), Some(&currencies::INR));
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("gbp").unwrap().code, "GBP");
        assert_eq!(find("  jPy ").unwrap().code, "JPY");
        assert!(find("XYZ").is_none());
    }

    #[test]
    fn test_search_matches_code_and_name() {
        let by_code: Vec<_> = search("chf").iter().map(|c| c.code).collect();
        assert_eq!(by_code, vec!["CHF"]);

        let by_name: Vec<_> = search("KRONA").iter().map(|c| c.code).collect();
        assert_eq!(by_name, vec!["SEK"]);
    }

    #[test]
    fn test_search_keeps_catalog_order() {
        let dollars: Vec<_> = search("dollar").iter().map(|c| c.code).collect();
        assert_eq!(
            dollars,
            vec!["USD", "AUD", "CAD", "HKD", "NZD", "SGD", "TWD"]
        );
    }

    #[test]
    fn test_empty_query_returns_everything() {
        assert_eq!(search("").len(), all().len());
        assert_eq!(search("   ").len(), all().len());
    }

    #[test]
    fn test_search_grouped_puts_popular_first() {
        let grouped = search_grouped("dollar");
        let popular: Vec<_> = grouped.popular.iter().map(|c| c.code).collect();
        let others: Vec<_> = grouped.others.iter().map(|c| c.code).collect();
        assert_eq!(popular, vec!["USD", "AUD", "CAD"]);
        assert_eq!(others, vec!["HKD", "NZD", "SGD", "TWD"]);
    }

    #[test]
    fn test_popular_subset() {
        assert!(popular().all(|c| c.popular));
        assert!(popular().any(|c| c.code == "EUR"));
        assert!(!popular().any(|c| c.code == "ZAR"));
    }

    #[test]
    fn test_format_amount_with_symbol() {
        assert_eq!(format_amount(90.0, "EUR"), "€90.00");
        assert_eq!(format_amount(1234567.891, "USD"), "$1,234,567.89");
        assert_eq!(format_amount(-12.5, "GBP"), "-£12.50");
    }

    #[test]
    fn test_format_amount_respects_decimals() {
        assert_eq!(format_amount(15000.4, "JPY"), "¥15,000");
    }

    #[test]
    fn test_format_amount_without_symbol() {
        assert_eq!(format_amount(10.0, "AED"), "10.00 AED");
        assert_eq!(format_amount(999.999, "xyz"), "1,000.00 XYZ");
    }

    #[test]
    fn test_currency_serializes() {
        let json = serde_json::to_value(find("USD").unwrap()).unwrap();
        assert_eq!(json["code"], "USD");
        assert_eq!(json["symbol"], "$");
        assert_eq!(json["popular"], true);
    }
}
