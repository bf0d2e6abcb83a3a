use crate::domain::payment_method::PaymentMethodConfigurationEntity;
use crate::domain::ports::{ConfigurationStore, TransactionGateway};
use crate::domain::vendor::{PaymentMethodConfiguration, Refund, RefundCreate, Transaction};
use crate::error::{PaymentError, Result};
use crate::infrastructure::in_memory::{SandboxState, book_refund};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Transactions keyed by space and transaction id.
pub const CF_TRANSACTIONS: &str = "transactions";
/// Refunds keyed by space, transaction id and refund id.
pub const CF_REFUNDS: &str = "refunds";
/// Remote payment method configurations keyed by space and configuration id.
pub const CF_PAYMENT_METHOD_CONFIGURATIONS: &str = "payment_method_configurations";
/// Local configuration entities keyed by payment method id.
pub const CF_CONFIGURATIONS: &str = "configurations";
pub const CF_META: &str = "meta";

const REFUND_SEQUENCE: &[u8] = b"refund_sequence";

fn key(parts: &[u64]) -> Vec<u8> {
    parts.iter().flat_map(|part| part.to_be_bytes()).collect()
}

/// A persistent sandbox and configuration store backed by RocksDB.
///
/// Every entity kind lives in its own column family. Composite keys are
/// big-endian so a space (or a transaction) can be scanned by prefix.
///
/// `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    // serialises read-modify-write of a transaction and the refund sequence
    refund_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a database at `path` with all column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [
            CF_TRANSACTIONS,
            CF_REFUNDS,
            CF_PAYMENT_METHOD_CONFIGURATIONS,
            CF_CONFIGURATIONS,
            CF_META,
        ]
        .into_iter()
        .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)?;
        Ok(Self {
            db: Arc::new(db),
            refund_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Copies a sandbox snapshot into the database, overwriting matching keys.
    pub fn import(&self, state: &SandboxState) -> Result<()> {
        let mut batch = WriteBatch::default();
        let transactions = self.cf(CF_TRANSACTIONS)?;
        for transaction in &state.transactions {
            batch.put_cf(
                transactions,
                key(&[transaction.linked_space_id, transaction.id]),
                serde_json::to_vec(transaction)?,
            );
        }
        let refunds = self.cf(CF_REFUNDS)?;
        for refund in &state.refunds {
            batch.put_cf(
                refunds,
                key(&[refund.linked_space_id, refund.transaction, refund.id]),
                serde_json::to_vec(refund)?,
            );
        }
        let remote = self.cf(CF_PAYMENT_METHOD_CONFIGURATIONS)?;
        for configuration in &state.payment_method_configurations {
            batch.put_cf(
                remote,
                key(&[configuration.linked_space_id, configuration.id]),
                serde_json::to_vec(configuration)?,
            );
        }
        let local = self.cf(CF_CONFIGURATIONS)?;
        for configuration in &state.configurations {
            batch.put_cf(local, configuration.id.as_bytes(), serde_json::to_vec(configuration)?);
        }
        if state.refund_sequence > self.refund_sequence()? {
            batch.put_cf(self.cf(CF_META)?, REFUND_SEQUENCE, state.refund_sequence.to_be_bytes());
        }
        self.db.write(batch)?;
        Ok(())
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            PaymentError::IoError(std::io::Error::other(format!(
                "{name} column family not found"
            )))
        })
    }

    fn put_json<T: Serialize>(&self, cf: &str, key: &[u8], value: &T) -> Result<()> {
        self.db.put_cf(self.cf(cf)?, key, serde_json::to_vec(value)?)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_cf(self.cf(cf)?, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_json<T: DeserializeOwned>(&self, cf: &str, prefix: &[u8]) -> Result<Vec<T>> {
        let iter = self
            .db
            .iterator_cf(self.cf(cf)?, IteratorMode::From(prefix, Direction::Forward));
        let mut values = Vec::new();
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }

    fn refund_sequence(&self) -> Result<u64> {
        let bytes = self.db.get_cf(self.cf(CF_META)?, REFUND_SEQUENCE)?;
        Ok(bytes
            .and_then(|b| <[u8; 8]>::try_from(b.as_slice()).ok())
            .map(u64::from_be_bytes)
            .unwrap_or_default())
    }
}

#[async_trait]
impl TransactionGateway for RocksDBStore {
    async fn read_transaction(&self, space_id: u64, transaction_id: u64) -> Result<Option<Transaction>> {
        self.get_json(CF_TRANSACTIONS, &key(&[space_id, transaction_id]))
    }

    async fn refunds(&self, space_id: u64, transaction_id: u64) -> Result<Vec<Refund>> {
        self.scan_json(CF_REFUNDS, &key(&[space_id, transaction_id]))
    }

    async fn create_refund(&self, space_id: u64, refund: RefundCreate) -> Result<Refund> {
        let _guard = self.refund_lock.lock().await;
        let transaction_key = key(&[space_id, refund.transaction]);
        let mut transaction: Transaction = self
            .get_json(CF_TRANSACTIONS, &transaction_key)?
            .ok_or(PaymentError::TransactionNotFound(refund.transaction))?;

        let id = self.refund_sequence()? + 1;
        let refund = book_refund(&mut transaction, refund, id)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_TRANSACTIONS)?, &transaction_key, serde_json::to_vec(&transaction)?);
        batch.put_cf(
            self.cf(CF_REFUNDS)?,
            key(&[space_id, transaction.id, id]),
            serde_json::to_vec(&refund)?,
        );
        batch.put_cf(self.cf(CF_META)?, REFUND_SEQUENCE, id.to_be_bytes());
        self.db.write(batch)?;
        Ok(refund)
    }

    async fn payment_method_configurations(&self, space_id: u64) -> Result<Vec<PaymentMethodConfiguration>> {
        self.scan_json(CF_PAYMENT_METHOD_CONFIGURATIONS, &key(&[space_id]))
    }
}

#[async_trait]
impl ConfigurationStore for RocksDBStore {
    async fn store(&self, configuration: PaymentMethodConfigurationEntity) -> Result<()> {
        self.put_json(CF_CONFIGURATIONS, configuration.id.as_bytes(), &configuration)
    }

    async fn get(&self, payment_method_id: &str) -> Result<Option<PaymentMethodConfigurationEntity>> {
        self.get_json(CF_CONFIGURATIONS, payment_method_id.as_bytes())
    }

    async fn get_all(&self, space_id: u64) -> Result<Vec<PaymentMethodConfigurationEntity>> {
        let mut all: Vec<PaymentMethodConfigurationEntity> = self
            .scan_json::<PaymentMethodConfigurationEntity>(CF_CONFIGURATIONS, &[])?
            .into_iter()
            .filter(|configuration| configuration.space_id == space_id)
            .collect();
        all.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }
}
