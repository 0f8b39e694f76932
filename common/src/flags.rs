//! Flag-image helpers: currency code to representative country code.

use crate::currency::CurrencyCode;

/// Currencies whose code's first two letters do not name their
/// representative country.
const OVERRIDES: &[(&str, &str)] = &[
    ("eur", "EU"),
    ("ang", "NL"),
    ("xcd", "AG"),
    ("xaf", "CM"),
    ("xof", "SN"),
    ("cup", "CU"),
    ("ggp", "GG"),
    ("imp", "IM"),
    ("jep", "JE"),
    ("kid", "KI"),
    ("tvd", "TV"),
];

/// ISO 3166 alpha-2 country code shown for a currency.
pub fn country_code(currency: &CurrencyCode) -> String {
    if let Some((_, country)) = OVERRIDES
        .iter()
        .find(|(code, _)| *code == currency.code())
    {
        return (*country).to_string();
    }

    currency
        .code()
        .chars()
        .take(2)
        .collect::<String>()
        .to_uppercase()
}

/// URL of the 64px flat flag image for a currency. A failed image load is
/// a display concern; it never enters the data path.
pub fn flag_url(currency: &CurrencyCode) -> String {
    format!("https://flagsapi.com/{}/flat/64.png", country_code(currency))
}
