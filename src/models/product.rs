//! Catalog product as returned by the remote makeup API.
//!
//! Products are transient: they are rebuilt from every fetch and never owned or
//! mutated locally.

use serde::{Deserialize, Serialize};
use url::Url;

/// Conversion rate from catalog dollars to tenge
pub const TENGE_RATE: f64 = 510.0;
/// Display symbol for tenge prices
pub const TENGE_SYMBOL: &str = "₸";

/// A product listing from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog-assigned identifier
    pub id: i64,
    /// Brand name, if the catalog knows it
    #[serde(default)]
    pub brand: Option<String>,
    /// Display name
    pub name: String,
    /// Price as a decimal string (e.g. `"9.99"`)
    #[serde(default)]
    pub price: Option<String>,
    /// Product image link
    #[serde(default)]
    pub image_link: Option<String>,
    /// Long description
    #[serde(default)]
    pub description: Option<String>,
    /// Category such as `"lipstick"` or `"mascara"`
    #[serde(default)]
    pub product_type: Option<String>,
    /// Average rating
    #[serde(default)]
    pub rating: Option<f64>,
}

impl Product {
    /// Formats the price converted at `rate`, rounded to whole units and prefixed with `symbol`.
    ///
    /// Missing or non-numeric prices render as `"<symbol> --"`.
    #[must_use]
    pub fn price_in_currency(&self, rate: f64, symbol: &str) -> String {
        match self.numeric_price() {
            Some(price) => format!("{symbol} {:.0}", (price * rate).round()),
            None => format!("{symbol} --"),
        }
    }

    /// Price in tenge at the fixed store rate.
    #[must_use]
    pub fn price_in_tenge(&self) -> String {
        self.price_in_currency(TENGE_RATE, TENGE_SYMBOL)
    }

    fn numeric_price(&self) -> Option<f64> {
        self.price
            .as_deref()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .filter(|p| p.is_finite())
    }

    /// Parsed image URL; `None` when the link is absent, empty or unparsable.
    #[must_use]
    pub fn image_url(&self) -> Option<Url> {
        self.image_link
            .as_deref()
            .filter(|link| !link.is_empty())
            .and_then(|link| Url::parse(link).ok())
    }

    /// Rating for display, defaulting to zero like the product card does.
    #[must_use]
    pub fn display_rating(&self) -> String {
        format!("{:.1}", self.rating.unwrap_or(0.0))
    }
}
