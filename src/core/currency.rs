//! Currency catalog

/// Three letter currency code. Any string is accepted by the converter.
pub type CurrencyCode = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
}

const fn currency(code: &'static str, name: &'static str) -> Currency {
    Currency { code, name }
}

/// Currencies offered for selection.
pub const CURRENCIES: &[Currency] = &[
    currency("USD", "US Dollar"),
    currency("EUR", "Euro"),
    currency("GBP", "Pound Sterling"),
    currency("JPY", "Japanese Yen"),
    currency("CNY", "Chinese Yuan"),
    currency("INR", "Indian Rupee"),
    currency("CAD", "Canadian Dollar"),
    currency("AUD", "Australian Dollar"),
    currency("CHF", "Swiss Franc"),
    currency("NZD", "New Zealand Dollar"),
    currency("SEK", "Swedish Krona"),
    currency("NOK", "Norwegian Krone"),
    currency("DKK", "Danish Krone"),
    currency("SGD", "Singapore Dollar"),
    currency("HKD", "Hong Kong Dollar"),
    currency("KRW", "South Korean Won"),
    currency("TRY", "Turkish Lira"),
    currency("BRL", "Brazilian Real"),
    currency("ZAR", "South African Rand"),
    currency("MXN", "Mexican Peso"),
    currency("RUB", "Russian Ruble"),
    currency("AED", "UAE Dirham"),
    currency("SAR", "Saudi Riyal"),
    currency("THB", "Thai Baht"),
    currency("MYR", "Malaysian Ringgit"),
    currency("IDR", "Indonesian Rupiah"),
    currency("PHP", "Philippine Peso"),
    currency("ILS", "Israeli Shekel"),
    currency("PLN", "Polish Zloty"),
    currency("CZK", "Czech Koruna"),
    currency("HUF", "Hungarian Forint"),
    currency("RON", "Romanian Leu"),
    currency("HRK", "Croatian Kuna"),
    currency("BGN", "Bulgarian Lev"),
    currency("ISK", "Icelandic Krona"),
    currency("UAH", "Ukrainian Hryvnia"),
    currency("KZT", "Kazakhstani Tenge"),
    currency("BYN", "Belarusian Ruble"),
    currency("CLP", "Chilean Peso"),
    currency("EGP", "Egyptian Pound"),
    currency("PKR", "Pakistani Rupee"),
    currency("BDT", "Bangladeshi Taka"),
];

/// Looks up a currency in the catalog, ignoring case.
pub fn find(code: &str) -> Option<&'static Currency> {
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Display name for a code, falling back to the code itself.
pub fn display_name(code: &str) -> &str {
    find(code).map_or(code, |c| c.name)
}

/// Normalizes user input into the conventional uppercase form.
pub fn normalize(code: &str) -> CurrencyCode {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_codes_are_unique() {
        let codes: HashSet<_> = CURRENCIES.iter().map(|c| c.code).collect();
        assert_eq!(codes.len(), CURRENCIES.len());
        assert_eq!(CURRENCIES.len(), 42);
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("usd").map(|c| c.name), Some("US Dollar"));
        assert!(find("XXX").is_none());
    }

    #[test]
    fn test_display_name_falls_back_to_code() {
        assert_eq!(display_name("EUR"), "Euro");
        assert_eq!(display_name("XAU"), "XAU");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(" gbp "), "GBP");
    }
}
