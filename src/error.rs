use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("{entity} payload invalid: {}", properties.join(", "))]
    InvalidPayload {
        entity: &'static str,
        properties: Vec<String>,
    },
    #[error("Line item doesn't exist: {0}")]
    LineItemNotFound(String),
    #[error("LineItems total {line_item_total} does not add up to order total {order_total}")]
    LineItemTotalMismatch {
        line_item_total: Decimal,
        order_total: Decimal,
    },
    #[error("Payment method does not support online refunds for transaction: {0}")]
    RefundNotSupported(u64),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(u64),
    #[error("No payment method configuration for payment method: {0}")]
    PaymentConfigurationNotFound(String),
    #[error("Settings error: {0}")]
    Settings(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Gateway error: {0}")]
    Gateway(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_payload_lists_properties() {
        let error = PaymentError::InvalidPayload {
            entity: "LineItem",
            properties: vec!["'name' can't be null".into(), "'unique_id' can't be null".into()],
        };
        assert_eq!(
            error.to_string(),
            "LineItem payload invalid: 'name' can't be null, 'unique_id' can't be null"
        );
    }

    #[test]
    fn test_line_item_not_found() {
        let error = PaymentError::LineItemNotFound("abc".into());
        assert!(error.to_string().contains("Line item doesn't exist: abc"));
    }
}
