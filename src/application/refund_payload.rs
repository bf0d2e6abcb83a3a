use crate::domain::money::{fix_length, round};
use crate::domain::validation::Validate;
use crate::domain::vendor::{
    LineItem, LineItemReductionCreate, RefundCreate, RefundType, Transaction, TransactionState,
};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;

/// Builds refund requests against a fulfilled transaction.
///
/// Each builder returns `Ok(None)` when the transaction is not refundable for
/// the requested amount, and an error when the request itself is malformed.
pub struct RefundPayload;

impl RefundPayload {
    /// Refund `quantity` units of a line item. A quantity of zero refunds the
    /// whole line item.
    pub fn get(transaction: &Transaction, line_item_id: &str, quantity: u32) -> Result<Option<RefundCreate>> {
        let line_item = Self::find_line_item(transaction, line_item_id)?;

        let (quantity, unit_price_reduction) = if quantity == 0 {
            (line_item.quantity, line_item.unit_price_including_tax)
        } else {
            (quantity, Decimal::ZERO)
        };
        let amount = Decimal::from(quantity) * line_item.unit_price_including_tax;

        if !Self::refundable(transaction, amount, transaction.authorization_amount) {
            return Ok(None);
        }

        let reduction = LineItemReductionCreate {
            line_item_unique_id: line_item.unique_id.clone(),
            quantity_reduction: quantity,
            unit_price_reduction,
        };
        Self::refund(transaction, None, vec![reduction]).map(Some)
    }

    /// Refund a plain amount of the transaction.
    pub fn get_by_amount(transaction: &Transaction, amount: Decimal) -> Result<Option<RefundCreate>> {
        if !Self::refundable(transaction, amount, transaction.authorization_amount) {
            return Ok(None);
        }
        Self::refund(transaction, Some(round(amount)), Vec::new()).map(Some)
    }

    /// Refund part of a line item's value by lowering its unit price.
    pub fn get_for_partial(
        transaction: &Transaction,
        line_item_id: &str,
        amount: Decimal,
    ) -> Result<Option<RefundCreate>> {
        let line_item = Self::find_line_item(transaction, line_item_id)?;
        if line_item.quantity == 0 {
            return Ok(None);
        }

        let quantity = Decimal::from(line_item.quantity);
        let total_item_amount = line_item.unit_price_including_tax * quantity;
        if !Self::refundable(transaction, amount, total_item_amount) {
            return Ok(None);
        }

        let reduction = LineItemReductionCreate {
            line_item_unique_id: line_item_id.to_string(),
            quantity_reduction: 0,
            unit_price_reduction: amount / quantity,
        };
        Self::refund(transaction, None, vec![reduction]).map(Some)
    }

    fn refundable(transaction: &Transaction, amount: Decimal, ceiling: Decimal) -> bool {
        transaction.state == TransactionState::Fulfill && amount <= ceiling
    }

    fn find_line_item<'t>(transaction: &'t Transaction, unique_id: &str) -> Result<&'t LineItem> {
        transaction.line_item(unique_id).ok_or_else(|| {
            let error = PaymentError::LineItemNotFound(unique_id.to_string());
            tracing::error!("{error}");
            error
        })
    }

    fn refund(
        transaction: &Transaction,
        amount: Option<Decimal>,
        reductions: Vec<LineItemReductionCreate>,
    ) -> Result<RefundCreate> {
        RefundCreate {
            amount,
            external_id: fix_length(&format!("refund_{}", uuid::Uuid::new_v4().simple()), 100),
            merchant_reference: transaction
                .merchant_reference
                .as_deref()
                .map(|reference| fix_length(reference, 100)),
            reductions,
            transaction: transaction.id,
            kind: RefundType::MerchantInitiatedOnline,
        }
        .ensure_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vendor::LineItemType;
    use rust_decimal_macros::dec;

    fn transaction(state: TransactionState) -> Transaction {
        Transaction {
            id: 42,
            linked_space_id: 1,
            state,
            merchant_reference: Some("10001".into()),
            currency: "CHF".into(),
            authorization_amount: dec!(50),
            completed_amount: dec!(50),
            refunded_amount: dec!(0),
            line_items: vec![LineItem {
                unique_id: "li-1".into(),
                name: "Hat".into(),
                sku: Some("HAT".into()),
                quantity: 2,
                unit_price_including_tax: dec!(20),
                amount_including_tax: dec!(40),
                kind: LineItemType::Product,
            }],
            online_refund_supported: true,
        }
    }

    #[test]
    fn test_quantity_refund() {
        let refund = RefundPayload::get(&transaction(TransactionState::Fulfill), "li-1", 1)
            .unwrap()
            .unwrap();
        assert_eq!(refund.transaction, 42);
        assert_eq!(refund.kind, RefundType::MerchantInitiatedOnline);
        assert_eq!(refund.amount, None);
        assert_eq!(refund.reductions[0].quantity_reduction, 1);
        assert_eq!(refund.reductions[0].unit_price_reduction, dec!(0));
        assert!(refund.external_id.starts_with("refund_"));
        assert_eq!(refund.merchant_reference.as_deref(), Some("10001"));
    }

    #[test]
    fn test_zero_quantity_refunds_whole_line_item() {
        let refund = RefundPayload::get(&transaction(TransactionState::Fulfill), "li-1", 0)
            .unwrap()
            .unwrap();
        assert_eq!(refund.reductions[0].quantity_reduction, 2);
        assert_eq!(refund.reductions[0].unit_price_reduction, dec!(20));
    }

    #[test]
    fn test_refund_requires_fulfill_state() {
        let tx = transaction(TransactionState::Authorized);
        assert!(RefundPayload::get(&tx, "li-1", 1).unwrap().is_none());
        assert!(RefundPayload::get_by_amount(&tx, dec!(5)).unwrap().is_none());
        assert!(RefundPayload::get_for_partial(&tx, "li-1", dec!(5)).unwrap().is_none());
    }

    #[test]
    fn test_refund_bounded_by_authorization() {
        let mut tx = transaction(TransactionState::Fulfill);
        tx.authorization_amount = dec!(30);
        assert!(RefundPayload::get(&tx, "li-1", 2).unwrap().is_none());
        assert!(RefundPayload::get_by_amount(&tx, dec!(30.01)).unwrap().is_none());
        assert!(RefundPayload::get_by_amount(&tx, dec!(30)).unwrap().is_some());
    }

    #[test]
    fn test_unknown_line_item() {
        let tx = transaction(TransactionState::Fulfill);
        assert!(matches!(
            RefundPayload::get(&tx, "missing", 1),
            Err(PaymentError::LineItemNotFound(id)) if id == "missing"
        ));
        assert!(matches!(
            RefundPayload::get_for_partial(&tx, "missing", dec!(1)),
            Err(PaymentError::LineItemNotFound(_))
        ));
    }

    #[test]
    fn test_amount_refund_is_rounded() {
        let refund = RefundPayload::get_by_amount(&transaction(TransactionState::Fulfill), dec!(12.345))
            .unwrap()
            .unwrap();
        assert_eq!(refund.amount, Some(dec!(12.35)));
        assert!(refund.reductions.is_empty());
    }

    #[test]
    fn test_partial_refund_spreads_over_quantity() {
        let tx = transaction(TransactionState::Fulfill);
        let refund = RefundPayload::get_for_partial(&tx, "li-1", dec!(10)).unwrap().unwrap();
        assert_eq!(refund.reductions[0].quantity_reduction, 0);
        assert_eq!(refund.reductions[0].unit_price_reduction, dec!(5));

        // bounded by the line item value, not the authorization
        assert!(RefundPayload::get_for_partial(&tx, "li-1", dec!(40.01)).unwrap().is_none());
    }
}
