use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// How the payment form is presented to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integration {
    #[default]
    PaymentPage,
    Iframe,
    Lightbox,
}

/// Effective settings of one sales channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub space_id: u64,
    pub user_id: u64,
    pub application_key: String,
    pub space_view_id: Option<u64>,
    /// Storefront presentation of the payment form. Read by the host, not by payloads.
    pub integration: Integration,
    /// Host-side flag for order confirmation mails.
    pub email_enabled: bool,
    /// Reject orders whose line items do not add up to the order total instead
    /// of adding an adjustment line item.
    pub line_item_consistency_enabled: bool,
    // The storefront_* switches are resolved here and consumed by the host storefront.
    pub storefront_invoice_download_enabled: bool,
    pub storefront_webhooks_update_enabled: bool,
    pub storefront_payments_update_enabled: bool,
    /// Tax rate for percentage promotions that carry no tax rules.
    pub default_tax_rate: Decimal,
    /// Absolute base URL of the storefront, without trailing slash.
    pub storefront_url: String,
}

/// Translated labels used inside generated line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadLabels {
    pub taxes: String,
    pub shipping_name: String,
    pub shipping_line_item: String,
    pub adjustment_line_item: String,
}

impl Default for PayloadLabels {
    fn default() -> Self {
        Self {
            taxes: "Taxes".to_string(),
            shipping_name: "Shipping".to_string(),
            shipping_line_item: "Shipping".to_string(),
            adjustment_line_item: "Adjustment Line Item".to_string(),
        }
    }
}

pub const DEFAULT_TAX_RATE: Decimal = dec!(21);
