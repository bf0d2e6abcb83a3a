use serde::{Deserialize, Serialize};

/// Link between a shop payment method and a payment method configuration of a space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodConfigurationEntity {
    /// Id of the payment method in the shop.
    pub id: String,
    pub payment_method_configuration_id: u64,
    pub space_id: u64,
    pub name: String,
    pub sort_order: i32,
    pub active: bool,
}

impl PaymentMethodConfigurationEntity {
    /// Deterministic shop payment method id for a configuration of a space.
    pub fn payment_method_id(space_id: u64, configuration_id: u64) -> String {
        format!("{:x}", md5::compute(format!("{space_id}_{configuration_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_id_is_stable() {
        let first = PaymentMethodConfigurationEntity::payment_method_id(1, 42);
        let second = PaymentMethodConfigurationEntity::payment_method_id(1, 42);
        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
        assert_ne!(first, PaymentMethodConfigurationEntity::payment_method_id(2, 42));
    }
}
