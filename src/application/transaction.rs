use crate::application::payment_method::PaymentMethodConfigurationService;
use crate::application::settings::SettingsService;
use crate::application::transaction_payload::{PendingTransaction, TransactionPayload};
use crate::domain::order::{Customer, Order, SalesChannelContext};
use crate::domain::vendor::TransactionPending;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Everything the host hands over when a checkout is confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkout {
    pub order: Order,
    pub customer: Customer,
    pub context: SalesChannelContext,
    pub pending: PendingTransaction,
}

/// Resolves settings and the payment method configuration of a checkout and
/// builds its transaction update.
pub struct TransactionService<'a> {
    settings: &'a SettingsService,
    configurations: &'a PaymentMethodConfigurationService,
}

impl<'a> TransactionService<'a> {
    pub fn new(
        settings: &'a SettingsService,
        configurations: &'a PaymentMethodConfigurationService,
    ) -> Self {
        Self {
            settings,
            configurations,
        }
    }

    pub async fn prepare(&self, checkout: &Checkout) -> Result<TransactionPending> {
        let settings = self
            .settings
            .get_settings(Some(&checkout.context.sales_channel_id))?;
        let configuration = self
            .configurations
            .configuration_for(&checkout.context.payment_method_id)
            .await?;

        let payload = TransactionPayload::new(
            &checkout.order,
            &checkout.customer,
            &checkout.context,
            &settings,
            self.settings.labels(),
        )
        .get(&checkout.pending, &configuration)?;

        tracing::info!(
            order = %checkout.order.order_number,
            transaction = payload.id,
            line_items = payload.line_items.len(),
            "transaction payload built"
        );
        Ok(payload)
    }
}
