use crate::domain::money::round;
use crate::domain::payment_method::PaymentMethodConfigurationEntity;
use crate::domain::ports::{ConfigurationStore, TransactionGateway};
use crate::domain::vendor::{
    PaymentMethodConfiguration, Refund, RefundCreate, RefundState, Transaction,
};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Amount a refund request moves, priced against the transaction's line items.
///
/// Each reduction refunds `quantity_reduction` full units plus
/// `unit_price_reduction` on every remaining unit.
pub fn refund_amount(transaction: &Transaction, refund: &RefundCreate) -> Result<Decimal> {
    if let Some(amount) = refund.amount {
        return Ok(round(amount));
    }
    let mut total = Decimal::ZERO;
    for reduction in &refund.reductions {
        let item = transaction
            .line_item(&reduction.line_item_unique_id)
            .ok_or_else(|| PaymentError::LineItemNotFound(reduction.line_item_unique_id.clone()))?;
        let removed = reduction.quantity_reduction.min(item.quantity);
        total += Decimal::from(removed) * item.unit_price_including_tax
            + Decimal::from(item.quantity - removed) * reduction.unit_price_reduction;
    }
    Ok(round(total))
}

/// Applies a refund request to a transaction the way the payment API does:
/// the refund is booked against the captured amount and marked successful.
pub(crate) fn book_refund(transaction: &mut Transaction, refund: RefundCreate, id: u64) -> Result<Refund> {
    if !transaction.online_refund_supported {
        return Err(PaymentError::RefundNotSupported(transaction.id));
    }
    let amount = refund_amount(transaction, &refund)?;
    let available = transaction.completed_amount - transaction.refunded_amount;
    if amount > available {
        return Err(PaymentError::Gateway(format!(
            "refund amount {amount} exceeds refundable amount {available} of transaction {}",
            transaction.id
        )));
    }
    transaction.refunded_amount += amount;
    Ok(Refund {
        id,
        linked_space_id: transaction.linked_space_id,
        transaction: transaction.id,
        state: RefundState::Successful,
        amount,
        external_id: refund.external_id,
        reductions: refund.reductions,
    })
}

#[derive(Default)]
struct Sandbox {
    transactions: HashMap<(u64, u64), Transaction>,
    refunds: HashMap<(u64, u64), Vec<Refund>>,
    payment_method_configurations: HashMap<u64, Vec<PaymentMethodConfiguration>>,
    refund_sequence: u64,
}

/// A thread-safe sandbox of the payment API.
///
/// Transactions and configurations are scoped to their space. Refunds are
/// booked immediately.
#[derive(Default, Clone)]
pub struct InMemoryGateway {
    sandbox: Arc<RwLock<Sandbox>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_transaction(&self, transaction: Transaction) {
        let mut sandbox = self.sandbox.write().await;
        sandbox
            .transactions
            .insert((transaction.linked_space_id, transaction.id), transaction);
    }

    pub async fn set_payment_method_configurations(
        &self,
        space_id: u64,
        configurations: Vec<PaymentMethodConfiguration>,
    ) {
        let mut sandbox = self.sandbox.write().await;
        sandbox.payment_method_configurations.insert(space_id, configurations);
    }
}

#[async_trait]
impl TransactionGateway for InMemoryGateway {
    async fn read_transaction(&self, space_id: u64, transaction_id: u64) -> Result<Option<Transaction>> {
        let sandbox = self.sandbox.read().await;
        Ok(sandbox.transactions.get(&(space_id, transaction_id)).cloned())
    }

    async fn refunds(&self, space_id: u64, transaction_id: u64) -> Result<Vec<Refund>> {
        let sandbox = self.sandbox.read().await;
        Ok(sandbox
            .refunds
            .get(&(space_id, transaction_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn create_refund(&self, space_id: u64, refund: RefundCreate) -> Result<Refund> {
        let mut sandbox = self.sandbox.write().await;
        let key = (space_id, refund.transaction);
        let id = sandbox.refund_sequence + 1;
        let transaction = sandbox
            .transactions
            .get_mut(&key)
            .ok_or(PaymentError::TransactionNotFound(refund.transaction))?;
        let refund = book_refund(transaction, refund, id)?;
        sandbox.refund_sequence = id;
        sandbox.refunds.entry(key).or_default().push(refund.clone());
        Ok(refund)
    }

    async fn payment_method_configurations(&self, space_id: u64) -> Result<Vec<PaymentMethodConfiguration>> {
        let sandbox = self.sandbox.read().await;
        Ok(sandbox
            .payment_method_configurations
            .get(&space_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// A thread-safe in-memory store for payment method configurations.
#[derive(Default, Clone)]
pub struct InMemoryConfigurationStore {
    configurations: Arc<RwLock<HashMap<String, PaymentMethodConfigurationEntity>>>,
}

impl InMemoryConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigurationStore for InMemoryConfigurationStore {
    async fn store(&self, configuration: PaymentMethodConfigurationEntity) -> Result<()> {
        let mut configurations = self.configurations.write().await;
        configurations.insert(configuration.id.clone(), configuration);
        Ok(())
    }

    async fn get(&self, payment_method_id: &str) -> Result<Option<PaymentMethodConfigurationEntity>> {
        let configurations = self.configurations.read().await;
        Ok(configurations.get(payment_method_id).cloned())
    }

    async fn get_all(&self, space_id: u64) -> Result<Vec<PaymentMethodConfigurationEntity>> {
        let configurations = self.configurations.read().await;
        let mut all: Vec<_> = configurations
            .values()
            .filter(|configuration| configuration.space_id == space_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }
}

/// JSON snapshot of the sandbox, used to carry state between CLI runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxState {
    pub transactions: Vec<Transaction>,
    pub refunds: Vec<Refund>,
    pub payment_method_configurations: Vec<PaymentMethodConfiguration>,
    pub configurations: Vec<PaymentMethodConfigurationEntity>,
    pub refund_sequence: u64,
}

impl SandboxState {
    /// Reads a snapshot. A missing file is an empty sandbox.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the snapshot atomically next to its final location.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, self)?;
        file.write_all(b"\n")?;
        file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    pub async fn into_stores(self) -> (InMemoryGateway, InMemoryConfigurationStore) {
        let gateway = InMemoryGateway::new();
        {
            let mut sandbox = gateway.sandbox.write().await;
            for transaction in self.transactions {
                sandbox
                    .transactions
                    .insert((transaction.linked_space_id, transaction.id), transaction);
            }
            for refund in self.refunds {
                sandbox
                    .refunds
                    .entry((refund.linked_space_id, refund.transaction))
                    .or_default()
                    .push(refund);
            }
            for configuration in self.payment_method_configurations {
                sandbox
                    .payment_method_configurations
                    .entry(configuration.linked_space_id)
                    .or_default()
                    .push(configuration);
            }
            sandbox.refund_sequence = self.refund_sequence;
        }

        let store = InMemoryConfigurationStore::new();
        {
            let mut configurations = store.configurations.write().await;
            for configuration in self.configurations {
                configurations.insert(configuration.id.clone(), configuration);
            }
        }
        (gateway, store)
    }

    pub async fn capture(gateway: &InMemoryGateway, store: &InMemoryConfigurationStore) -> Self {
        let sandbox = gateway.sandbox.read().await;
        let mut transactions: Vec<_> = sandbox.transactions.values().cloned().collect();
        transactions.sort_by_key(|t| (t.linked_space_id, t.id));
        let mut refunds: Vec<_> = sandbox.refunds.values().flatten().cloned().collect();
        refunds.sort_by_key(|r| (r.linked_space_id, r.id));
        let mut payment_method_configurations: Vec<_> = sandbox
            .payment_method_configurations
            .values()
            .flatten()
            .cloned()
            .collect();
        payment_method_configurations.sort_by_key(|c| (c.linked_space_id, c.id));

        let mut configurations: Vec<_> = store.configurations.read().await.values().cloned().collect();
        configurations.sort_by(|a, b| a.id.cmp(&b.id));

        Self {
            transactions,
            refunds,
            payment_method_configurations,
            configurations,
            refund_sequence: sandbox.refund_sequence,
        }
    }
}
