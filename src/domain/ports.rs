use super::payment_method::PaymentMethodConfigurationEntity;
use super::vendor::{PaymentMethodConfiguration, Refund, RefundCreate, Transaction};
use crate::error::Result;
use async_trait::async_trait;

/// The payment API as seen by this crate. Every call is scoped to a space.
#[async_trait]
pub trait TransactionGateway: Send + Sync {
    async fn read_transaction(&self, space_id: u64, transaction_id: u64) -> Result<Option<Transaction>>;
    async fn refunds(&self, space_id: u64, transaction_id: u64) -> Result<Vec<Refund>>;
    async fn create_refund(&self, space_id: u64, refund: RefundCreate) -> Result<Refund>;
    async fn payment_method_configurations(&self, space_id: u64) -> Result<Vec<PaymentMethodConfiguration>>;
}

/// Local store of payment method configurations synchronised from a space.
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    async fn store(&self, configuration: PaymentMethodConfigurationEntity) -> Result<()>;
    async fn get(&self, payment_method_id: &str) -> Result<Option<PaymentMethodConfigurationEntity>>;
    async fn get_all(&self, space_id: u64) -> Result<Vec<PaymentMethodConfigurationEntity>>;
}

pub type TransactionGatewayBox = Box<dyn TransactionGateway>;
pub type ConfigurationStoreBox = Box<dyn ConfigurationStore>;
