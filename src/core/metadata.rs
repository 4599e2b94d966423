//! Static currency metadata: display names, symbols and flags.

use crate::core::rate::Currency;

pub const UNKNOWN_FLAG: &str = "🏳️";
pub const CRYPTO_GLYPH: &str = "🪙";
pub const GOLD_GLYPH: &str = "🥇";
pub const SILVER_GLYPH: &str = "🥈";

fn fiat_meta(code: &str) -> Option<(&'static str, &'static str, &'static str)> {
    let meta = match code {
        "USD" => ("US Dollar", "$", "🇺🇸"),
        "EUR" => ("Euro", "€", "🇪🇺"),
        "RUB" => ("Russian Ruble", "₽", "🇷🇺"),
        "GBP" => ("Pound Sterling", "£", "🇬🇧"),
        "JPY" => ("Japanese Yen", "¥", "🇯🇵"),
        "CHF" => ("Swiss Franc", "₣", "🇨🇭"),
        "CNY" => ("Chinese Yuan", "¥", "🇨🇳"),
        "PLN" => ("Polish Zloty", "zł", "🇵🇱"),
        "KZT" => ("Kazakhstani Tenge", "₸", "🇰🇿"),
        "TRY" => ("Turkish Lira", "₺", "🇹🇷"),
        "BYN" => ("Belarusian Ruble", "Br", "🇧🇾"),
        _ => return None,
    };
    Some(meta)
}

pub fn crypto_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "BTC" => "Bitcoin",
        "ETH" => "Ethereum",
        "USDT" => "Tether",
        "BNB" => "BNB",
        "XRP" => "XRP",
        "ADA" => "Cardano",
        "DOGE" => "Dogecoin",
        "SOL" => "Solana",
        "TRX" => "TRON",
        "DOT" => "Polkadot",
        _ => return None,
    };
    Some(name)
}

pub fn fiat_name(code: &str) -> Option<&'static str> {
    fiat_meta(code).map(|(name, _, _)| name)
}

/// Flag emoji for a fiat code, falling back to a neutral flag.
pub fn flag(code: &str) -> String {
    fiat_meta(code)
        .map(|(_, _, flag)| flag)
        .unwrap_or(UNKNOWN_FLAG)
        .to_string()
}

/// Builds a fiat `Currency`. Unknown codes keep the raw code as both name
/// and symbol.
pub fn fiat_currency(code: &str) -> Currency {
    match fiat_meta(code) {
        Some((name, symbol, flag)) => Currency {
            code: code.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            flag: flag.to_string(),
        },
        None => Currency {
            code: code.to_string(),
            name: code.to_string(),
            symbol: code.to_string(),
            flag: UNKNOWN_FLAG.to_string(),
        },
    }
}

/// Builds a crypto `Currency`; the symbol column is the ticker itself.
pub fn crypto_currency(code: &str) -> Currency {
    Currency {
        code: code.to_string(),
        name: crypto_name(code).unwrap_or(code).to_string(),
        symbol: code.to_string(),
        flag: CRYPTO_GLYPH.to_string(),
    }
}
