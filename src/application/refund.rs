use crate::application::refund_payload::RefundPayload;
use crate::domain::money::{Amount, round};
use crate::domain::ports::TransactionGatewayBox;
use crate::domain::vendor::{Refund, RefundCreate, RefundState, Transaction};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Serialize;

/// Refundable share of one transaction line item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefundableLineItem {
    pub unique_id: String,
    pub name: String,
    pub quantity: u32,
    pub refundable_quantity: u32,
    pub unit_price_including_tax: Decimal,
    pub refundable_amount: Decimal,
}

/// Refund operations against the payment API.
pub struct RefundService {
    gateway: TransactionGatewayBox,
}

impl RefundService {
    pub fn new(gateway: TransactionGatewayBox) -> Self {
        Self { gateway }
    }

    pub async fn read_transaction(&self, space_id: u64, transaction_id: u64) -> Result<Transaction> {
        self.gateway
            .read_transaction(space_id, transaction_id)
            .await?
            .ok_or(PaymentError::TransactionNotFound(transaction_id))
    }

    /// Units of a line item not yet covered by a refund. Zero for unknown items.
    pub async fn max_refundable_quantity(
        &self,
        space_id: u64,
        transaction: &Transaction,
        line_item_id: &str,
    ) -> Result<u32> {
        let Some(line_item) = transaction.line_item(line_item_id) else {
            return Ok(0);
        };
        let refunds = self.gateway.refunds(space_id, transaction.id).await?;
        Ok(line_item
            .quantity
            .saturating_sub(refunded_quantity(&refunds, line_item_id)))
    }

    /// Amount captured and not refunded yet.
    pub fn max_refundable_amount(transaction: &Transaction) -> Decimal {
        round(transaction.completed_amount - transaction.refunded_amount)
    }

    pub async fn refundable_line_items(
        &self,
        space_id: u64,
        transaction: &Transaction,
    ) -> Result<Vec<RefundableLineItem>> {
        let refunds = self.gateway.refunds(space_id, transaction.id).await?;
        let max_amount = Self::max_refundable_amount(transaction);
        Ok(transaction
            .line_items
            .iter()
            .map(|item| {
                let refundable_quantity = item
                    .quantity
                    .saturating_sub(refunded_quantity(&refunds, &item.unique_id));
                let remaining = Decimal::from(refundable_quantity) * item.unit_price_including_tax
                    - refunded_price_reduction(&refunds, item.quantity, &item.unique_id);
                RefundableLineItem {
                    unique_id: item.unique_id.clone(),
                    name: item.name.clone(),
                    quantity: item.quantity,
                    refundable_quantity,
                    unit_price_including_tax: item.unit_price_including_tax,
                    refundable_amount: round(remaining.max(Decimal::ZERO)).min(max_amount),
                }
            })
            .collect())
    }

    pub async fn create(
        &self,
        space_id: u64,
        transaction: &Transaction,
        line_item_id: &str,
        quantity: u32,
    ) -> Result<Option<Refund>> {
        let payload = RefundPayload::get(transaction, line_item_id, quantity)?;
        self.submit(space_id, transaction, payload).await
    }

    pub async fn create_by_amount(
        &self,
        space_id: u64,
        transaction: &Transaction,
        amount: Amount,
    ) -> Result<Option<Refund>> {
        let payload = RefundPayload::get_by_amount(transaction, amount.value())?;
        self.submit(space_id, transaction, payload).await
    }

    pub async fn create_partial(
        &self,
        space_id: u64,
        transaction: &Transaction,
        line_item_id: &str,
        amount: Amount,
    ) -> Result<Option<Refund>> {
        let payload = RefundPayload::get_for_partial(transaction, line_item_id, amount.value())?;
        self.submit(space_id, transaction, payload).await
    }

    async fn submit(
        &self,
        space_id: u64,
        transaction: &Transaction,
        payload: Option<RefundCreate>,
    ) -> Result<Option<Refund>> {
        let Some(payload) = payload else {
            tracing::info!(transaction = transaction.id, "refund not applicable");
            return Ok(None);
        };
        let refund = self.gateway.create_refund(space_id, payload).await?;
        tracing::info!(
            transaction = transaction.id,
            refund = refund.id,
            amount = %refund.amount,
            "refund created"
        );
        Ok(Some(refund))
    }
}

fn refunded_quantity(refunds: &[Refund], line_item_id: &str) -> u32 {
    refunds
        .iter()
        .filter(|refund| refund.state != RefundState::Failed)
        .flat_map(|refund| &refund.reductions)
        .filter(|reduction| reduction.line_item_unique_id == line_item_id)
        .map(|reduction| reduction.quantity_reduction)
        .sum()
}

/// Value already refunded through unit price reductions on the units left in place.
fn refunded_price_reduction(refunds: &[Refund], quantity: u32, line_item_id: &str) -> Decimal {
    refunds
        .iter()
        .filter(|refund| refund.state != RefundState::Failed)
        .flat_map(|refund| &refund.reductions)
        .filter(|reduction| reduction.line_item_unique_id == line_item_id)
        .map(|reduction| {
            Decimal::from(quantity.saturating_sub(reduction.quantity_reduction))
                * reduction.unit_price_reduction
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vendor::{LineItem, LineItemType, TransactionState};
    use crate::infrastructure::in_memory::InMemoryGateway;
    use rust_decimal_macros::dec;

    fn transaction() -> Transaction {
        Transaction {
            id: 42,
            linked_space_id: 1,
            state: TransactionState::Fulfill,
            merchant_reference: Some("10001".into()),
            currency: "CHF".into(),
            authorization_amount: dec!(60),
            completed_amount: dec!(60),
            refunded_amount: dec!(0),
            line_items: vec![LineItem {
                unique_id: "li-1".into(),
                name: "Hat".into(),
                sku: None,
                quantity: 3,
                unit_price_including_tax: dec!(20),
                amount_including_tax: dec!(60),
                kind: LineItemType::Product,
            }],
            online_refund_supported: true,
        }
    }

    async fn service() -> RefundService {
        let gateway = InMemoryGateway::new();
        gateway.insert_transaction(transaction()).await;
        RefundService::new(Box::new(gateway))
    }

    #[tokio::test]
    async fn test_refunded_quantity_lowers_max() {
        let service = service().await;
        let tx = service.read_transaction(1, 42).await.unwrap();
        assert_eq!(service.max_refundable_quantity(1, &tx, "li-1").await.unwrap(), 3);

        service.create(1, &tx, "li-1", 2).await.unwrap().unwrap();
        assert_eq!(service.max_refundable_quantity(1, &tx, "li-1").await.unwrap(), 1);
        assert_eq!(service.max_refundable_quantity(1, &tx, "nope").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_max_refundable_amount_tracks_refunds() {
        let service = service().await;
        let tx = service.read_transaction(1, 42).await.unwrap();
        service
            .create_by_amount(1, &tx, Amount::new(dec!(15.5)).unwrap())
            .await
            .unwrap()
            .unwrap();

        let tx = service.read_transaction(1, 42).await.unwrap();
        assert_eq!(RefundService::max_refundable_amount(&tx), dec!(44.5));
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let service = service().await;
        assert!(matches!(
            service.read_transaction(1, 7).await,
            Err(PaymentError::TransactionNotFound(7))
        ));
        // transactions are scoped to their space
        assert!(service.read_transaction(2, 42).await.is_err());
    }

    #[tokio::test]
    async fn test_refundable_line_items() {
        let service = service().await;
        let tx = service.read_transaction(1, 42).await.unwrap();
        service.create(1, &tx, "li-1", 1).await.unwrap();

        let items = service.refundable_line_items(1, &tx).await.unwrap();
        assert_eq!(items[0].refundable_quantity, 2);
        assert_eq!(items[0].refundable_amount, dec!(40));
    }

    #[tokio::test]
    async fn test_refundable_amount_after_partial_and_amount_refunds() {
        let service = service().await;
        let tx = service.read_transaction(1, 42).await.unwrap();
        service
            .create_partial(1, &tx, "li-1", Amount::new(dec!(6)).unwrap())
            .await
            .unwrap()
            .unwrap();

        let items = service.refundable_line_items(1, &tx).await.unwrap();
        assert_eq!(items[0].refundable_quantity, 3);
        assert_eq!(items[0].refundable_amount, dec!(54));

        service
            .create_by_amount(1, &tx, Amount::new(dec!(44)).unwrap())
            .await
            .unwrap()
            .unwrap();
        let tx = service.read_transaction(1, 42).await.unwrap();
        let items = service.refundable_line_items(1, &tx).await.unwrap();
        assert_eq!(items[0].refundable_amount, dec!(10));
    }
}
