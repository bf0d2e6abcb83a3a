use crate::domain::money::{fix_length, format_rate, round};
use crate::domain::order::{
    CalculatedTax, Customer, CustomerAddress, LineItemKind, Order, OrderLineItem, PriceDefinition,
    SalesChannelContext, TaxStatus,
};
use crate::domain::payment_method::PaymentMethodConfigurationEntity;
use crate::domain::settings::{PayloadLabels, Settings};
use crate::domain::validation::Validate;
use crate::domain::vendor::{
    AddressCreate, LineItemAttributeCreate, LineItemCreate, LineItemType, TaxCreate,
    TransactionPending,
};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const METADATA_ORDER_ID: &str = "orderId";
pub const METADATA_ORDER_TRANSACTION_ID: &str = "orderTransactionId";
pub const METADATA_SALES_CHANNEL_ID: &str = "salesChannelId";
pub const METADATA_CUSTOMER_NAME: &str = "customerName";

const ADJUSTMENT_LINE_ITEM_ID: &str = "Adjustment-Line-Item";

/// The pending transaction created when the checkout started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub id: u64,
    pub version: u32,
    /// URL the shopper returns to after a successful payment.
    pub return_url: String,
}

/// Maps an order into a [`TransactionPending`] update.
pub struct TransactionPayload<'a> {
    order: &'a Order,
    customer: &'a Customer,
    context: &'a SalesChannelContext,
    settings: &'a Settings,
    labels: &'a PayloadLabels,
}

impl<'a> TransactionPayload<'a> {
    pub fn new(
        order: &'a Order,
        customer: &'a Customer,
        context: &'a SalesChannelContext,
        settings: &'a Settings,
        labels: &'a PayloadLabels,
    ) -> Self {
        Self {
            order,
            customer,
            context,
            settings,
            labels,
        }
    }

    /// Builds and validates the transaction update.
    pub fn get(
        &self,
        pending: &PendingTransaction,
        configuration: &PaymentMethodConfigurationEntity,
    ) -> Result<TransactionPending> {
        let line_items = self.line_items()?;
        let billing_address = self.address(&self.customer.active_billing_address, true)?;
        let shipping_address = self.address(&self.customer.active_shipping_address, false)?;

        let (customer_id, customer_name) = if self.customer.guest {
            (None, None)
        } else {
            let salutation = self
                .customer
                .salutation
                .as_ref()
                .and_then(|s| s.display_name.as_deref())
                .unwrap_or_default();
            let name = format!(
                "{} {} {}",
                salutation,
                self.customer.first_name.as_deref().unwrap_or_default(),
                self.customer.last_name.as_deref().unwrap_or_default()
            );
            (self.customer.customer_number.clone(), Some(name))
        };

        let payload = TransactionPending {
            id: pending.id,
            version: pending.version,
            allowed_payment_method_configurations: vec![
                configuration.payment_method_configuration_id,
            ],
            billing_address: Some(billing_address),
            currency: self.order.currency_iso.clone(),
            customer_email_address: Some(self.customer.email.clone()),
            customer_id,
            failed_url: Some(format!("{}&status=fail", self.fail_url())),
            language: self.context.locale_code.clone(),
            line_items,
            merchant_reference: Some(fix_length(&self.order.order_number, 100)),
            meta_data: self.meta_data(customer_name),
            shipping_address: Some(shipping_address),
            shipping_method: self
                .context
                .shipping_method_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .map(|name| fix_length(name, 200)),
            space_view_id: self.settings.space_view_id,
            success_url: Some(format!("{}&status=paid", pending.return_url)),
        };

        payload.ensure_valid()
    }

    fn meta_data(&self, customer_name: Option<String>) -> BTreeMap<String, Value> {
        let mut meta = BTreeMap::new();
        meta.insert(METADATA_ORDER_ID.to_string(), Value::from(self.order.id.clone()));
        meta.insert(
            METADATA_ORDER_TRANSACTION_ID.to_string(),
            self.order
                .transaction_ids
                .first()
                .map_or(Value::Null, |id| Value::from(id.clone())),
        );
        meta.insert(
            METADATA_SALES_CHANNEL_ID.to_string(),
            Value::from(self.context.sales_channel_id.clone()),
        );
        meta.insert(
            METADATA_CUSTOMER_NAME.to_string(),
            customer_name.map_or(Value::Null, Value::from),
        );

        // Optional shop fields are only sent when filled in.
        let billing = self.customer.default_billing_address();
        let shipping = self.customer.default_shipping_address();
        let optional = [
            ("additionalAddress1", billing.additional_address_line1.as_deref()),
            ("additionalAddress2", billing.additional_address_line2.as_deref()),
            ("customer_comment", self.order.customer_comment.as_deref()),
            ("taxNumber", self.customer.vat_ids.first().map(String::as_str)),
            ("billingCompanyDepartment", billing.department.as_deref()),
            ("shippingCompanyDepartment", shipping.department.as_deref()),
        ];
        for (key, value) in optional {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                meta.insert(key.to_string(), Value::from(value));
            }
        }
        meta
    }

    fn fail_url(&self) -> String {
        format!(
            "{}/weareplanet/checkout/recreate-cart?orderId={}",
            self.settings.storefront_url.trim_end_matches('/'),
            self.order.id
        )
    }

    fn tax_free(&self) -> bool {
        self.order.tax_status == TaxStatus::TaxFree
    }

    fn net(&self) -> bool {
        self.order.tax_status == TaxStatus::Net
    }

    /// All line items of the transaction: products and discounts sorted by
    /// name, then shipping, then an adjustment when totals disagree.
    pub fn line_items(&self) -> Result<Vec<LineItemCreate>> {
        let mut line_items = Vec::with_capacity(self.order.line_items.len());

        for shop_item in &self.order.line_items {
            if matches!(
                shop_item.kind,
                LineItemKind::CustomizedProducts | LineItemKind::Promotion
            ) {
                continue;
            }
            let label = if shop_item.kind == LineItemKind::CustomizedProductsOption {
                format!(
                    "{}: {}",
                    self.custom_product_option_label(shop_item.parent_id.as_deref()),
                    shop_item.label.as_deref().unwrap_or_default()
                )
            } else {
                shop_item.label.clone().unwrap_or_default()
            };
            line_items.push(self.line_item(shop_item, &label)?.ensure_valid()?);
        }

        for discount in self
            .order
            .line_items
            .iter()
            .filter(|item| item.kind == LineItemKind::Promotion)
        {
            line_items.extend(self.discount_line_items(discount));
        }

        line_items.sort_by(|a, b| a.name.cmp(&b.name));

        if self.order.shipping_costs.calculated_taxes.len() == 1 {
            line_items.extend(self.shipping_line_item());
        } else {
            line_items.extend(self.multiple_shipping_line_items());
        }

        if let Some(adjustment) = self.adjustment_line_item(&line_items)? {
            line_items.push(adjustment);
        }

        Ok(line_items)
    }

    /// Label of the product a custom-product option belongs to.
    fn custom_product_option_label(&self, parent_id: Option<&str>) -> String {
        self.order
            .line_items
            .iter()
            .find(|item| {
                item.kind == LineItemKind::Product
                    && parent_id.is_some()
                    && item.parent_id.as_deref() == parent_id
            })
            .and_then(|item| item.label.clone())
            .unwrap_or_default()
    }

    fn line_item(&self, shop_item: &OrderLineItem, label: &str) -> Result<LineItemCreate> {
        let sku = shop_item
            .payload
            .product_number
            .as_deref()
            .filter(|number| !number.is_empty())
            .or(shop_item.product_id.as_deref().filter(|id| !id.is_empty()))
            .unwrap_or(shop_item.id.as_str());

        let total_price = shop_item.total_price.unwrap_or_default();
        let mut amount = round(total_price);
        if self.net() {
            amount = round(amount + shop_item.price.tax_amount());
        }

        let taxes = if self.tax_free() {
            Vec::new()
        } else {
            self.taxes(&shop_item.price.calculated_taxes, &self.labels.taxes)?
        };

        Ok(LineItemCreate {
            amount_including_tax: amount,
            attributes: self.product_attributes(shop_item)?,
            name: fix_length(label, 150),
            quantity: shop_item.quantity,
            shipping_required: None,
            sku: Some(fix_length(sku, 200)),
            taxes,
            kind: if total_price >= Decimal::ZERO {
                LineItemType::Product
            } else {
                LineItemType::Discount
            },
            unique_id: shop_item.id.clone(),
        })
    }

    fn taxes(&self, calculated_taxes: &[CalculatedTax], title: &str) -> Result<Vec<TaxCreate>> {
        calculated_taxes
            .iter()
            .map(|tax| {
                TaxCreate {
                    rate: tax.tax_rate,
                    title: fix_length(&format!("{title} : {}", format_rate(tax.tax_rate)), 40),
                }
                .ensure_valid()
            })
            .collect()
    }

    fn product_attributes(
        &self,
        shop_item: &OrderLineItem,
    ) -> Result<BTreeMap<String, LineItemAttributeCreate>> {
        let mut attributes = BTreeMap::new();
        for option in &shop_item.payload.options {
            let attribute = LineItemAttributeCreate {
                label: fix_length(&option.group, 512),
                value: fix_length(&option.option, 512),
            }
            .ensure_valid()?;
            let key = fix_length(
                &format!("option_{:x}", md5::compute(option.group.as_bytes())),
                40,
            );
            attributes.insert(key, attribute);
        }
        Ok(attributes)
    }

    fn discount_line_items(&self, discount: &OrderLineItem) -> Vec<LineItemCreate> {
        let name = discount.label.as_deref().unwrap_or("Unnamed");
        let price = &discount.price;

        if self.net() || discount.price_definition == Some(PriceDefinition::Absolute) {
            price
                .calculated_taxes
                .iter()
                .map(|tax| {
                    let mut amount = round(tax.price);
                    if self.net() {
                        amount = round(amount + tax.tax);
                    }
                    self.discount_line_item(name, amount, tax.tax_rate)
                })
                .collect()
        } else if price.tax_rules.is_empty() {
            vec![self.discount_line_item(
                name,
                round(price.total_price),
                self.settings.default_tax_rate,
            )]
        } else {
            // each rule carries its own share of the total, not the whole total
            price
                .tax_rules
                .iter()
                .map(|rule| {
                    let amount = round(price.total_price * rule.percentage / dec!(100));
                    self.discount_line_item(name, amount, rule.tax_rate)
                })
                .collect()
        }
    }

    fn discount_line_item(&self, name: &str, amount: Decimal, rate: Decimal) -> LineItemCreate {
        let rate_label = format_rate(rate);
        let (sku, title) = if self.tax_free() {
            (format!("sku-discount-{name}"), format!("DISCOUNT: {name}"))
        } else {
            (
                format!("sku-discount-{rate_label}-{name}"),
                format!("DISCOUNT: {name} ({rate_label}% tax)"),
            )
        };
        let sku = fix_length(&sku, 200);
        let taxes = if self.tax_free() {
            Vec::new()
        } else {
            vec![TaxCreate {
                rate,
                title: fix_length(&format!("Discount Tax: {rate_label}"), 40),
            }]
        };

        LineItemCreate {
            amount_including_tax: amount,
            attributes: BTreeMap::new(),
            name: fix_length(&title, 150),
            quantity: 1,
            shipping_required: Some(false),
            unique_id: fix_length(&format!("coupon-{sku}"), 200),
            sku: Some(sku),
            taxes,
            kind: LineItemType::Discount,
        }
    }

    fn shipping_name(&self) -> &str {
        self.context
            .shipping_method_name
            .as_deref()
            .unwrap_or(&self.labels.shipping_name)
    }

    /// Single shipping item for shipping costs taxed at one rate.
    ///
    /// Failures are logged and leave shipping to the adjustment line item.
    fn shipping_line_item(&self) -> Option<LineItemCreate> {
        self.try_shipping_line_item()
            .inspect_err(|e| tracing::error!(error = %e, "failed to build shipping line item"))
            .ok()
            .flatten()
    }

    fn try_shipping_line_item(&self) -> Result<Option<LineItemCreate>> {
        let mut amount = round(self.order.shipping_total);
        if amount <= Decimal::ZERO {
            return Ok(None);
        }
        let costs = &self.order.shipping_costs;
        let shipping_name = self.shipping_name();

        let taxes = self.taxes(&costs.calculated_taxes, shipping_name)?;
        if self.net() {
            amount = round(amount + costs.tax_amount());
        }
        let id = fix_length(&format!("{shipping_name}-Shipping"), 200);

        LineItemCreate {
            amount_including_tax: amount,
            attributes: BTreeMap::new(),
            name: fix_length(
                &format!("{shipping_name} {}", self.labels.shipping_line_item),
                150,
            ),
            quantity: costs.quantity,
            shipping_required: None,
            sku: Some(id.clone()),
            taxes: if self.tax_free() { Vec::new() } else { taxes },
            kind: LineItemType::Shipping,
            unique_id: id,
        }
        .ensure_valid()
        .map(Some)
    }

    /// One shipping item per tax rate: the first as shipping, the rest as fees.
    fn multiple_shipping_line_items(&self) -> Vec<LineItemCreate> {
        self.try_multiple_shipping_line_items()
            .inspect_err(|e| tracing::error!(error = %e, "failed to build shipping line items"))
            .unwrap_or_default()
    }

    fn try_multiple_shipping_line_items(&self) -> Result<Vec<LineItemCreate>> {
        if self.order.shipping_total <= Decimal::ZERO {
            return Ok(Vec::new());
        }
        let costs = &self.order.shipping_costs;
        let shipping_name = self.shipping_name();

        let mut items = Vec::with_capacity(costs.calculated_taxes.len());
        for (index, tax) in costs.calculated_taxes.iter().enumerate() {
            let mut amount = round(tax.price);
            if self.net() {
                amount = round(amount + tax.tax);
            }
            let rate = format_rate(tax.tax_rate);
            let name = format!("{rate}%-{shipping_name}");
            let id = fix_length(&format!("{name}-Shipping"), 200);
            let taxes = if self.tax_free() {
                Vec::new()
            } else {
                vec![TaxCreate {
                    rate: tax.tax_rate,
                    title: format!("Tax rate: {rate}"),
                }]
            };
            let item = LineItemCreate {
                amount_including_tax: amount,
                attributes: BTreeMap::new(),
                name: fix_length(&format!("{name} {}", self.labels.shipping_line_item), 150),
                quantity: costs.quantity,
                shipping_required: None,
                sku: Some(id.clone()),
                taxes,
                kind: if index == 0 {
                    LineItemType::Shipping
                } else {
                    LineItemType::Fee
                },
                unique_id: id,
            };
            items.push(item.ensure_valid()?);
        }
        Ok(items)
    }

    fn adjustment_line_item(&self, line_items: &[LineItemCreate]) -> Result<Option<LineItemCreate>> {
        let line_item_total: Decimal = line_items
            .iter()
            .map(|item| item.amount_including_tax)
            .sum();
        let adjustment = round(self.order.amount_total - line_item_total);

        if adjustment.is_zero() {
            return Ok(None);
        }

        if self.settings.line_item_consistency_enabled {
            let error = PaymentError::LineItemTotalMismatch {
                line_item_total,
                order_total: self.order.amount_total,
            };
            tracing::error!("{error}");
            return Err(error);
        }

        LineItemCreate {
            amount_including_tax: adjustment,
            attributes: BTreeMap::new(),
            name: self.labels.adjustment_line_item.clone(),
            quantity: 1,
            shipping_required: None,
            sku: Some(ADJUSTMENT_LINE_ITEM_ID.to_string()),
            taxes: Vec::new(),
            kind: if adjustment > Decimal::ZERO {
                LineItemType::Fee
            } else {
                LineItemType::Discount
            },
            unique_id: ADJUSTMENT_LINE_ITEM_ID.to_string(),
        }
        .ensure_valid()
        .map(Some)
    }

    fn address(&self, address: &CustomerAddress, with_sales_tax_number: bool) -> Result<AddressCreate> {
        let customer = self.customer;

        let family_name = non_empty(address.last_name.as_deref())
            .or(non_empty(customer.last_name.as_deref()))
            .map(|name| fix_length(name, 100));
        let given_name = non_empty(address.first_name.as_deref())
            .or(non_empty(customer.first_name.as_deref()))
            .map(|name| fix_length(name, 100));
        let salutation = non_empty(
            address
                .salutation
                .as_ref()
                .and_then(|s| s.display_name.as_deref()),
        )
        .or(non_empty(
            customer
                .salutation
                .as_ref()
                .and_then(|s| s.display_name.as_deref()),
        ))
        .map(|salutation| fix_length(salutation, 20));

        let state = address.country_state.as_ref();
        let postal_state = non_empty(state.and_then(|s| s.name.as_deref()))
            .or(non_empty(state.and_then(|s| s.short_code.as_deref())))
            .unwrap_or_default()
            .to_string();

        let sales_tax_number = if with_sales_tax_number {
            customer.vat_ids.first().cloned()
        } else {
            None
        };

        AddressCreate {
            city: non_empty(address.city.as_deref()).map(|v| fix_length(v, 100)),
            country: address.country.as_ref().and_then(|c| c.iso.clone()),
            date_of_birth: customer.birthday,
            email_address: non_empty(Some(customer.email.as_str())).map(|v| fix_length(v, 254)),
            family_name,
            given_name,
            organization_name: non_empty(address.company.as_deref()).map(|v| fix_length(v, 100)),
            phone_number: non_empty(address.phone_number.as_deref()).map(|v| fix_length(v, 100)),
            postal_state: Some(postal_state),
            postcode: non_empty(address.zipcode.as_deref()).map(|v| fix_length(v, 40)),
            sales_tax_number,
            salutation,
            street: non_empty(address.street.as_deref()).map(|v| fix_length(v, 300)),
        }
        .ensure_valid()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
