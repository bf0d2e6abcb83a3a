//! Object model of the payment API.
//!
//! Request objects (`*Create`, [`TransactionPending`]) implement [`Validate`]
//! with the same constraints the API enforces. Response objects
//! ([`Transaction`], [`Refund`], [`PaymentMethodConfiguration`]) are what the
//! gateway port hands back.

use crate::domain::validation::{Validate, Violations};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineItemType {
    Shipping,
    Discount,
    Product,
    Fee,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCreate {
    pub rate: Decimal,
    pub title: String,
}

impl Validate for TaxCreate {
    const ENTITY: &'static str = "Tax";

    fn list_invalid_properties(&self) -> Vec<String> {
        let mut violations = Violations::new();
        violations
            .required("title", Some(&self.title))
            .max_length("title", Some(&self.title), 40)
            .min_length("title", Some(&self.title), 2);
        violations.into_inner()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemAttributeCreate {
    pub label: String,
    pub value: String,
}

impl Validate for LineItemAttributeCreate {
    const ENTITY: &'static str = "LineItemAttributeCreate";

    fn list_invalid_properties(&self) -> Vec<String> {
        let mut violations = Violations::new();
        violations
            .required("label", Some(&self.label))
            .max_length("label", Some(&self.label), 512)
            .required("value", Some(&self.value))
            .max_length("value", Some(&self.value), 512);
        violations.into_inner()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemCreate {
    pub amount_including_tax: Decimal,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, LineItemAttributeCreate>,
    pub name: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxes: Vec<TaxCreate>,
    #[serde(rename = "type")]
    pub kind: LineItemType,
    pub unique_id: String,
}

impl Validate for LineItemCreate {
    const ENTITY: &'static str = "LineItem";

    fn list_invalid_properties(&self) -> Vec<String> {
        let mut violations = Violations::new();
        violations
            .required("name", Some(&self.name))
            .max_length("name", Some(&self.name), 150)
            .max_length("sku", self.sku.as_deref(), 200)
            .required("unique_id", Some(&self.unique_id))
            .max_length("unique_id", Some(&self.unique_id), 200);
        violations.into_inner()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AddressCreate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_tax_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salutation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
}

impl Validate for AddressCreate {
    const ENTITY: &'static str = "Address";

    fn list_invalid_properties(&self) -> Vec<String> {
        let mut violations = Violations::new();
        violations
            .max_length("city", self.city.as_deref(), 100)
            .max_length("email_address", self.email_address.as_deref(), 254)
            .max_length("family_name", self.family_name.as_deref(), 100)
            .max_length("given_name", self.given_name.as_deref(), 100)
            .max_length("organization_name", self.organization_name.as_deref(), 100)
            .max_length("phone_number", self.phone_number.as_deref(), 100)
            .max_length("postcode", self.postcode.as_deref(), 40)
            .max_length("sales_tax_number", self.sales_tax_number.as_deref(), 100)
            .max_length("salutation", self.salutation.as_deref(), 20)
            .max_length("street", self.street.as_deref(), 300);
        violations.into_inner()
    }
}

/// Update of a pending transaction created at checkout start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPending {
    pub id: u64,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_payment_method_configurations: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<AddressCreate>,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub line_items: Vec<LineItemCreate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_reference: Option<String>,
    #[serde(default)]
    pub meta_data: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<AddressCreate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_view_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
}

impl Validate for TransactionPending {
    const ENTITY: &'static str = "Transaction";

    fn list_invalid_properties(&self) -> Vec<String> {
        let mut violations = Violations::new();
        violations
            .check(self.id > 0, "'id' can't be null")
            .required("currency", Some(&self.currency))
            .max_length("customer_email_address", self.customer_email_address.as_deref(), 254)
            .max_length("customer_id", self.customer_id.as_deref(), 100)
            .max_length("failed_url", self.failed_url.as_deref(), 2000)
            .min_length("failed_url", self.failed_url.as_deref(), 9)
            .max_length("merchant_reference", self.merchant_reference.as_deref(), 100)
            .max_length("shipping_method", self.shipping_method.as_deref(), 200)
            .max_length("success_url", self.success_url.as_deref(), 2000)
            .min_length("success_url", self.success_url.as_deref(), 9);
        violations.into_inner()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundType {
    MerchantInitiatedOnline,
    MerchantInitiatedOffline,
    CustomerInitiatedAutomatic,
    CustomerInitiatedManual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemReductionCreate {
    pub line_item_unique_id: String,
    pub quantity_reduction: u32,
    pub unit_price_reduction: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundCreate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    pub external_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reductions: Vec<LineItemReductionCreate>,
    pub transaction: u64,
    #[serde(rename = "type")]
    pub kind: RefundType,
}

impl Validate for RefundCreate {
    const ENTITY: &'static str = "Refund";

    fn list_invalid_properties(&self) -> Vec<String> {
        let mut violations = Violations::new();
        violations
            .required("external_id", Some(&self.external_id))
            .max_length("external_id", Some(&self.external_id), 100)
            .max_length("merchant_reference", self.merchant_reference.as_deref(), 100)
            .check(self.transaction > 0, "'transaction' can't be null");
        for reduction in &self.reductions {
            violations.required("line_item_unique_id", Some(&reduction.line_item_unique_id));
        }
        violations.into_inner()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
    Create,
    Pending,
    Confirmed,
    Processing,
    Failed,
    Authorized,
    Voided,
    Completed,
    Fulfill,
    Decline,
}

/// A line item as stored on a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub unique_id: String,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub quantity: u32,
    pub unit_price_including_tax: Decimal,
    pub amount_including_tax: Decimal,
    #[serde(rename = "type")]
    pub kind: LineItemType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    pub linked_space_id: u64,
    pub state: TransactionState,
    #[serde(default)]
    pub merchant_reference: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub authorization_amount: Decimal,
    #[serde(default)]
    pub completed_amount: Decimal,
    #[serde(default)]
    pub refunded_amount: Decimal,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    /// Whether the processor behind the payment method accepts online refunds.
    #[serde(default = "supported")]
    pub online_refund_supported: bool,
}

fn supported() -> bool {
    true
}

impl Transaction {
    pub fn line_item(&self, unique_id: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|item| item.unique_id == unique_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundState {
    Create,
    Scheduled,
    Pending,
    ManualCheck,
    Failed,
    Successful,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub id: u64,
    /// Space of the refunded transaction. Transaction ids are only unique within a space.
    #[serde(default)]
    pub linked_space_id: u64,
    pub transaction: u64,
    pub state: RefundState,
    pub amount: Decimal,
    pub external_id: String,
    #[serde(default)]
    pub reductions: Vec<LineItemReductionCreate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreationEntityState {
    Create,
    Active,
    Inactive,
    Deleting,
    Deleted,
}

/// A payment method as configured in a space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodConfiguration {
    pub id: u64,
    pub linked_space_id: u64,
    pub name: String,
    pub state: CreationEntityState,
    #[serde(default)]
    pub sort_order: i32,
}
