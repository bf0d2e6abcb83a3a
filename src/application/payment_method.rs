use crate::domain::payment_method::PaymentMethodConfigurationEntity;
use crate::domain::ports::{ConfigurationStoreBox, TransactionGatewayBox};
use crate::domain::vendor::CreationEntityState;
use crate::error::{PaymentError, Result};

/// Outcome of a synchronisation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub activated: usize,
    pub deactivated: usize,
}

/// Keeps the local payment method configurations in line with a space.
pub struct PaymentMethodConfigurationService {
    gateway: TransactionGatewayBox,
    store: ConfigurationStoreBox,
}

impl PaymentMethodConfigurationService {
    pub fn new(gateway: TransactionGatewayBox, store: ConfigurationStoreBox) -> Self {
        Self { gateway, store }
    }

    /// Stores every active configuration of the space and deactivates local
    /// entries the space no longer offers.
    pub async fn synchronize(&self, space_id: u64) -> Result<SyncReport> {
        let remote = self.gateway.payment_method_configurations(space_id).await?;
        let mut report = SyncReport::default();
        let mut seen = Vec::with_capacity(remote.len());

        for configuration in remote
            .into_iter()
            .filter(|c| c.state == CreationEntityState::Active)
        {
            let entity = PaymentMethodConfigurationEntity {
                id: PaymentMethodConfigurationEntity::payment_method_id(space_id, configuration.id),
                payment_method_configuration_id: configuration.id,
                space_id,
                name: configuration.name,
                sort_order: configuration.sort_order,
                active: true,
            };
            seen.push(entity.id.clone());
            self.store.store(entity).await?;
            report.activated += 1;
        }

        for mut local in self.store.get_all(space_id).await? {
            if local.active && !seen.contains(&local.id) {
                local.active = false;
                self.store.store(local).await?;
                report.deactivated += 1;
            }
        }

        tracing::info!(
            space_id,
            activated = report.activated,
            deactivated = report.deactivated,
            "payment method configurations synchronized"
        );
        Ok(report)
    }

    /// Active configuration linked to a shop payment method.
    pub async fn configuration_for(&self, payment_method_id: &str) -> Result<PaymentMethodConfigurationEntity> {
        self.store
            .get(payment_method_id)
            .await?
            .filter(|configuration| configuration.active)
            .ok_or_else(|| PaymentError::PaymentConfigurationNotFound(payment_method_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ConfigurationStore;
    use crate::domain::vendor::PaymentMethodConfiguration;
    use crate::infrastructure::in_memory::{InMemoryConfigurationStore, InMemoryGateway};

    fn remote(id: u64, state: CreationEntityState) -> PaymentMethodConfiguration {
        PaymentMethodConfiguration {
            id,
            linked_space_id: 1,
            name: format!("Method {id}"),
            state,
            sort_order: id as i32,
        }
    }

    #[tokio::test]
    async fn test_synchronize_activates_and_deactivates() {
        let gateway = InMemoryGateway::new();
        gateway.set_payment_method_configurations(
            1,
            vec![
                remote(10, CreationEntityState::Active),
                remote(11, CreationEntityState::Inactive),
            ],
        )
        .await;
        let store = InMemoryConfigurationStore::new();
        let stale = PaymentMethodConfigurationEntity {
            id: PaymentMethodConfigurationEntity::payment_method_id(1, 99),
            payment_method_configuration_id: 99,
            space_id: 1,
            name: "Gone".into(),
            sort_order: 0,
            active: true,
        };
        store.store(stale.clone()).await.unwrap();

        let service =
            PaymentMethodConfigurationService::new(Box::new(gateway), Box::new(store.clone()));
        let report = service.synchronize(1).await.unwrap();
        assert_eq!(report, SyncReport { activated: 1, deactivated: 1 });

        let id = PaymentMethodConfigurationEntity::payment_method_id(1, 10);
        let configuration = service.configuration_for(&id).await.unwrap();
        assert_eq!(configuration.payment_method_configuration_id, 10);
        assert!(matches!(
            service.configuration_for(&stale.id).await,
            Err(PaymentError::PaymentConfigurationNotFound(_))
        ));
    }
}
