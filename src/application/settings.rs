use crate::domain::settings::{DEFAULT_TAX_RATE, Integration, PayloadLabels, Settings};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Settings as stored: every field optional so a sales channel can inherit
/// from the default section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsValues {
    pub space_id: Option<u64>,
    pub user_id: Option<u64>,
    pub application_key: Option<String>,
    pub space_view_id: Option<u64>,
    pub integration: Option<Integration>,
    pub email_enabled: Option<bool>,
    pub line_item_consistency_enabled: Option<bool>,
    pub storefront_invoice_download_enabled: Option<bool>,
    pub storefront_webhooks_update_enabled: Option<bool>,
    pub storefront_payments_update_enabled: Option<bool>,
    pub default_tax_rate: Option<Decimal>,
    pub storefront_url: Option<String>,
}

impl SettingsValues {
    /// Fills unset values from `fallback`. Empty strings count as unset.
    fn inherit(&self, fallback: &SettingsValues) -> SettingsValues {
        let text = |own: &Option<String>, other: &Option<String>| {
            own.clone()
                .filter(|v| !v.is_empty())
                .or_else(|| other.clone())
        };
        SettingsValues {
            space_id: self.space_id.or(fallback.space_id),
            user_id: self.user_id.or(fallback.user_id),
            application_key: text(&self.application_key, &fallback.application_key),
            space_view_id: self.space_view_id.or(fallback.space_view_id),
            integration: self.integration.or(fallback.integration),
            email_enabled: self.email_enabled.or(fallback.email_enabled),
            line_item_consistency_enabled: self
                .line_item_consistency_enabled
                .or(fallback.line_item_consistency_enabled),
            storefront_invoice_download_enabled: self
                .storefront_invoice_download_enabled
                .or(fallback.storefront_invoice_download_enabled),
            storefront_webhooks_update_enabled: self
                .storefront_webhooks_update_enabled
                .or(fallback.storefront_webhooks_update_enabled),
            storefront_payments_update_enabled: self
                .storefront_payments_update_enabled
                .or(fallback.storefront_payments_update_enabled),
            default_tax_rate: self.default_tax_rate.or(fallback.default_tax_rate),
            storefront_url: text(&self.storefront_url, &fallback.storefront_url),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub default: SettingsValues,
    pub sales_channels: HashMap<String, SettingsValues>,
    pub labels: PayloadLabels,
}

/// Resolves the effective [`Settings`] of a sales channel.
#[derive(Debug, Clone, Default)]
pub struct SettingsService {
    file: SettingsFile,
}

impl SettingsService {
    pub fn new(file: SettingsFile) -> Self {
        Self { file }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(serde_json::from_str(&content)?))
    }

    pub fn labels(&self) -> &PayloadLabels {
        &self.file.labels
    }

    /// Settings of `sales_channel_id`, or of the default section when `None`.
    pub fn get_settings(&self, sales_channel_id: Option<&str>) -> Result<Settings> {
        let values = match sales_channel_id.and_then(|id| self.file.sales_channels.get(id)) {
            Some(channel) => channel.inherit(&self.file.default),
            None => self.file.default.clone(),
        };

        let space_id = values
            .space_id
            .ok_or_else(|| PaymentError::Settings("space id is not configured".to_string()))?;
        let user_id = values
            .user_id
            .ok_or_else(|| PaymentError::Settings("user id is not configured".to_string()))?;
        let application_key = values
            .application_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                PaymentError::Settings("application key is not configured".to_string())
            })?;

        Ok(Settings {
            space_id,
            user_id,
            application_key,
            space_view_id: values.space_view_id,
            integration: values.integration.unwrap_or_default(),
            email_enabled: values.email_enabled.unwrap_or(true),
            line_item_consistency_enabled: values.line_item_consistency_enabled.unwrap_or(true),
            storefront_invoice_download_enabled: values
                .storefront_invoice_download_enabled
                .unwrap_or(true),
            storefront_webhooks_update_enabled: values
                .storefront_webhooks_update_enabled
                .unwrap_or(true),
            storefront_payments_update_enabled: values
                .storefront_payments_update_enabled
                .unwrap_or(true),
            default_tax_rate: values.default_tax_rate.unwrap_or(DEFAULT_TAX_RATE),
            storefront_url: values.storefront_url.unwrap_or_default(),
        })
    }
}
