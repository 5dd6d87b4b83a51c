//! Paywall and product models.

use crate::ProductId;
use serde::{Deserialize, Serialize};

/// How a placement's content is rendered by the host app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Full paywall screen.
    #[default]
    Paywall,
    /// Compact promotional banner.
    Banner,
    /// Host-rendered view driven entirely by remote config.
    Custom,
    /// Unrecognized tag from a newer backend revision.
    #[serde(other)]
    Unknown,
}

/// A remotely configured subscription offer screen definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paywall {
    /// Backend identifier of this paywall.
    pub id: String,
    /// Display name assigned in the backend dashboard.
    pub name: String,
    /// Revision counter bumped on each dashboard edit.
    pub revision: u32,
    /// A/B-test variation this paywall belongs to, if any.
    pub variation_id: Option<String>,
    /// How the host should render this paywall.
    pub view: ViewKind,
    /// Raw remote-config payload (serialized JSON), if configured.
    pub remote_config: Option<String>,
    /// Products offered by this paywall, in display order.
    pub product_ids: Vec<ProductId>,
}

impl Paywall {
    /// Create a paywall with the given id and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            revision: 1,
            variation_id: None,
            view: ViewKind::default(),
            remote_config: None,
            product_ids: Vec::new(),
        }
    }

    /// Set the revision.
    pub fn with_revision(mut self, revision: u32) -> Self {
        self.revision = revision;
        self
    }

    /// Set the view kind.
    pub fn with_view(mut self, view: ViewKind) -> Self {
        self.view = view;
        self
    }

    /// Set the raw remote-config payload.
    pub fn with_remote_config(mut self, raw: impl Into<String>) -> Self {
        self.remote_config = Some(raw.into());
        self
    }

    /// Add an offered product.
    pub fn with_product(mut self, product: impl Into<ProductId>) -> Self {
        self.product_ids.push(product.into());
        self
    }

    /// Whether a remote-config payload is attached.
    pub fn has_remote_config(&self) -> bool {
        self.remote_config.is_some()
    }
}

/// Price of a product as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPrice {
    /// Amount in millionths of the currency unit.
    pub amount_micros: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Store-formatted display string, when available.
    pub localized: Option<String>,
}

/// A purchasable product referenced by a paywall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Identifier of the product in the underlying store catalog.
    pub store_product_id: String,
    pub title: String,
    pub price: ProductPrice,
}

impl Product {
    /// Create a product with a zero price placeholder.
    pub fn new(id: impl Into<ProductId>, store_product_id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            store_product_id: store_product_id.into(),
            title: id.as_str().to_string(),
            id,
            price: ProductPrice {
                amount_micros: 0,
                currency: "USD".to_string(),
                localized: None,
            },
        }
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the price.
    pub fn with_price(mut self, amount_micros: i64, currency: impl Into<String>) -> Self {
        self.price.amount_micros = amount_micros;
        self.price.currency = currency.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paywall_builder() {
        let paywall = Paywall::new("pw_1", "Summer offer")
            .with_revision(3)
            .with_view(ViewKind::Banner)
            .with_remote_config(r#"{"headline":"Go premium"}"#)
            .with_product("monthly")
            .with_product("yearly");

        assert_eq!(paywall.revision, 3);
        assert_eq!(paywall.product_ids.len(), 2);
        assert!(paywall.has_remote_config());
    }

    #[test]
    fn unknown_view_kind_deserializes() {
        let view: ViewKind = serde_json::from_str("\"hologram\"").unwrap();
        assert_eq!(view, ViewKind::Unknown);

        let view: ViewKind = serde_json::from_str("\"banner\"").unwrap();
        assert_eq!(view, ViewKind::Banner);
    }
}
