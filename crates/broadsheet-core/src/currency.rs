use serde::Serialize;

use crate::analytics::{AnalysesListing, AnalysisOwner};

pub const DEFAULT_CURRENCY: &str = "USD";

/// Display symbol for an ISO currency code. Unknown codes display as-is.
pub fn currency_symbol(code: &str) -> &str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "AUD" => "A$",
        "CAD" => "C$",
        "CHF" => "CHF",
        "CNY" => "CN¥",
        "INR" => "₹",
        "SGD" => "S$",
        "ZAR" => "R",
        "AED" => "د.إ",
        other => other,
    }
}

/// A single offer currency is taken as the site's base currency; anything
/// else falls back to [`DEFAULT_CURRENCY`].
pub fn resolve_currency(offers: &[String]) -> String {
    match offers {
        [only] if !only.trim().is_empty() => only.trim().to_ascii_uppercase(),
        _ => DEFAULT_CURRENCY.to_string(),
    }
}

/// Company name when set, otherwise the first word of the owner's first name.
pub fn customer_name(owner: Option<&AnalysisOwner>) -> Option<String> {
    let owner = owner?;
    let company = owner
        .company_name
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    if let Some(company) = company {
        return Some(company.to_string());
    }
    owner
        .first_name
        .as_deref()
        .and_then(|n| n.split_whitespace().next())
        .map(str::to_string)
}

/// Currency and display name for one tenant, taken from its latest analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerProfile {
    pub currency_code: String,
    pub currency_symbol: String,
    pub customer_name: String,
}

impl CustomerProfile {
    /// `fallback_name` is used when the owner record carries no usable name.
    pub fn from_listing(listing: &AnalysesListing, fallback_name: &str) -> Self {
        let latest = listing.results.first();
        let currency_code = resolve_currency(latest.map(|a| a.offer_currencies()).unwrap_or(&[]));
        let currency_symbol = currency_symbol(&currency_code).to_string();
        let customer_name = customer_name(latest.and_then(|a| a.owner.as_ref()))
            .unwrap_or_else(|| fallback_name.to_string());
        Self {
            currency_code,
            currency_symbol,
            customer_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(first: Option<&str>, company: Option<&str>) -> AnalysisOwner {
        AnalysisOwner {
            first_name: first.map(str::to_string),
            company_name: company.map(str::to_string),
        }
    }

    #[test]
    fn known_and_unknown_symbols() {
        assert_eq!(currency_symbol("EUR"), "€");
        assert_eq!(currency_symbol("AED"), "د.إ");
        assert_eq!(currency_symbol("SEK"), "SEK");
    }

    #[test]
    fn only_a_single_offer_currency_is_trusted() {
        assert_eq!(resolve_currency(&["EUR".to_string()]), "EUR");
        assert_eq!(resolve_currency(&["EUR".to_string(), "GBP".to_string()]), "USD");
        assert_eq!(resolve_currency(&[]), "USD");
    }

    #[test]
    fn company_name_wins_over_first_name() {
        assert_eq!(
            customer_name(Some(&owner(Some("Jo Ann"), Some("Acme Ltd")))),
            Some("Acme Ltd".to_string())
        );
        assert_eq!(
            customer_name(Some(&owner(Some("Jo Ann"), Some("  ")))),
            Some("Jo".to_string())
        );
        assert_eq!(customer_name(Some(&owner(None, None))), None);
        assert_eq!(customer_name(None), None);
    }

    #[test]
    fn profile_from_empty_listing_uses_defaults() {
        let profile = CustomerProfile::from_listing(&AnalysesListing::default(), "acme");
        assert_eq!(profile.currency_symbol, "$");
        assert_eq!(profile.customer_name, "acme");
    }
}
