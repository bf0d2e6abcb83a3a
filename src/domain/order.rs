//! Read-only view of the host platform's checkout data.
//!
//! These structures mirror what the shop hands over when a payment is started:
//! the order with its line items and shipping costs, the customer with their
//! addresses, and the sales-channel context the checkout runs in.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// How prices of an order relate to taxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxStatus {
    /// Prices include taxes.
    #[default]
    Gross,
    /// Prices exclude taxes; taxes are added on top.
    Net,
    TaxFree,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedTax {
    pub tax: Decimal,
    pub tax_rate: Decimal,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRule {
    pub tax_rate: Decimal,
    /// Share of the price this rule applies to.
    #[serde(default = "full_share")]
    pub percentage: Decimal,
}

fn full_share() -> Decimal {
    dec!(100)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedPrice {
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub total_price: Decimal,
    #[serde(default)]
    pub calculated_taxes: Vec<CalculatedTax>,
    #[serde(default)]
    pub tax_rules: Vec<TaxRule>,
}

fn one() -> u32 {
    1
}

impl Default for CalculatedPrice {
    fn default() -> Self {
        Self {
            unit_price: Decimal::ZERO,
            quantity: one(),
            total_price: Decimal::ZERO,
            calculated_taxes: Vec::new(),
            tax_rules: Vec::new(),
        }
    }
}

impl CalculatedPrice {
    /// Sum of all calculated taxes.
    pub fn tax_amount(&self) -> Decimal {
        self.calculated_taxes.iter().map(|tax| tax.tax).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceDefinition {
    Absolute,
    Percentage,
    Quantity,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineItemKind {
    #[default]
    Product,
    Promotion,
    CustomizedProducts,
    CustomizedProductsOption,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOption {
    pub group: String,
    pub option: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPayload {
    #[serde(default)]
    pub product_number: Option<String>,
    #[serde(default)]
    pub options: Vec<ProductOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: LineItemKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub price: CalculatedPrice,
    #[serde(default)]
    pub price_definition: Option<PriceDefinition>,
    #[serde(default)]
    pub payload: LineItemPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub currency_iso: String,
    #[serde(default)]
    pub tax_status: TaxStatus,
    pub amount_total: Decimal,
    #[serde(default)]
    pub shipping_total: Decimal,
    #[serde(default)]
    pub shipping_costs: CalculatedPrice,
    #[serde(default)]
    pub line_items: Vec<OrderLineItem>,
    #[serde(default)]
    pub customer_comment: Option<String>,
    /// Ids of the order transactions, oldest first.
    #[serde(default)]
    pub transaction_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salutation {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub iso: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryState {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub short_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerAddress {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub department: Option<String>,
    pub street: Option<String>,
    pub zipcode: Option<String>,
    pub city: Option<String>,
    pub phone_number: Option<String>,
    pub additional_address_line1: Option<String>,
    pub additional_address_line2: Option<String>,
    pub country: Option<Country>,
    pub country_state: Option<CountryState>,
    pub salutation: Option<Salutation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub customer_number: Option<String>,
    #[serde(default)]
    pub guest: bool,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub salutation: Option<Salutation>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub vat_ids: Vec<String>,
    pub active_billing_address: CustomerAddress,
    pub active_shipping_address: CustomerAddress,
    #[serde(default)]
    pub default_billing_address: Option<CustomerAddress>,
    #[serde(default)]
    pub default_shipping_address: Option<CustomerAddress>,
}

impl Customer {
    pub fn default_billing_address(&self) -> &CustomerAddress {
        self.default_billing_address
            .as_ref()
            .unwrap_or(&self.active_billing_address)
    }

    pub fn default_shipping_address(&self) -> &CustomerAddress {
        self.default_shipping_address
            .as_ref()
            .unwrap_or(&self.active_shipping_address)
    }
}

/// The sales channel a checkout runs in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesChannelContext {
    pub sales_channel_id: String,
    pub payment_method_id: String,
    #[serde(default)]
    pub shipping_method_name: Option<String>,
    #[serde(default)]
    pub locale_code: Option<String>,
}
