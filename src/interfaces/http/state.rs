use crate::application::refund::RefundService;
use crate::application::settings::SettingsService;
use std::sync::Arc;

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub settings: Arc<SettingsService>,
    pub refunds: Arc<RefundService>,
}

impl AppState {
    pub fn new(settings: SettingsService, refunds: RefundService) -> Self {
        Self {
            settings: Arc::new(settings),
            refunds: Arc::new(refunds),
        }
    }
}
