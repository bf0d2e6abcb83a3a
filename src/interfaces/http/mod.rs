//! Administrative HTTP API.
//!
//! Error bodies are plain text: either a message key the administration
//! translates (`refundQuantityZero`, `methodDoesNotSupportRefund`, ...) or the
//! error message itself.

pub mod refund;
pub mod state;

use crate::error::PaymentError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use state::AppState;

/// The complete router with request tracing.
pub fn app(state: AppState) -> axum::Router {
    axum::Router::new()
        .merge(refund::router())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    /// A rejected request, answered with a message key.
    BadRequest(&'static str),
    Payment(PaymentError),
}

impl From<PaymentError> for ApiError {
    fn from(error: PaymentError) -> Self {
        Self::Payment(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(key) => (StatusCode::BAD_REQUEST, key).into_response(),
            ApiError::Payment(PaymentError::RefundNotSupported(transaction_id)) => {
                tracing::info!(
                    "Payment method does not support online refunds for transaction: {transaction_id}"
                );
                (StatusCode::BAD_REQUEST, "methodDoesNotSupportRefund").into_response()
            }
            ApiError::Payment(e @ PaymentError::TransactionNotFound(_)) => {
                tracing::warn!("{e}");
                (StatusCode::NOT_FOUND, e.to_string()).into_response()
            }
            ApiError::Payment(e) => {
                tracing::error!("Request failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        }
    }
}
