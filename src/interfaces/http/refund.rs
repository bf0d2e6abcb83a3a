use super::ApiError;
use super::state::AppState;
use crate::application::refund::RefundService;
use crate::application::settings::SettingsService;
use crate::domain::money::Amount;
use crate::domain::vendor::Transaction;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, routing::post};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

pub const REFUND_NOT_CREATED: &str =
    "Refund was not created. Please check the refund amound or if the item was not refunded before";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRefundRequest {
    #[serde(default)]
    pub sales_channel_id: Option<String>,
    pub transaction_id: u64,
    #[serde(default)]
    pub quantity: i64,
    pub line_item_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRefundByAmountRequest {
    #[serde(default)]
    pub sales_channel_id: Option<String>,
    pub transaction_id: u64,
    #[serde(default)]
    pub refundable_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartialRefundRequest {
    #[serde(default)]
    pub sales_channel_id: Option<String>,
    pub transaction_id: u64,
    pub refundable_amount: Decimal,
    pub line_item_id: String,
}

async fn load_transaction(
    settings: &SettingsService,
    refunds: &RefundService,
    sales_channel_id: Option<&str>,
    transaction_id: u64,
) -> Result<(u64, Transaction), ApiError> {
    let space_id = settings.get_settings(sales_channel_id)?.space_id;
    let transaction = refunds.read_transaction(space_id, transaction_id).await?;
    Ok((space_id, transaction))
}

#[instrument(skip_all)]
async fn create_refund(
    State(settings): State<Arc<SettingsService>>,
    State(refunds): State<Arc<RefundService>>,
    Json(request): Json<CreateRefundRequest>,
) -> Result<StatusCode, ApiError> {
    if request.quantity <= 0 {
        return Err(ApiError::BadRequest("refundQuantityZero"));
    }
    let (space_id, transaction) = load_transaction(
        &settings,
        &refunds,
        request.sales_channel_id.as_deref(),
        request.transaction_id,
    )
    .await?;

    let max_quantity = refunds
        .max_refundable_quantity(space_id, &transaction, &request.line_item_id)
        .await?;
    if request.quantity > i64::from(max_quantity) {
        return Err(ApiError::BadRequest("refundExceedsQuantity"));
    }

    // bounded by max_quantity above
    let quantity = request.quantity as u32;
    match refunds
        .create(space_id, &transaction, &request.line_item_id, quantity)
        .await?
    {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::BadRequest(REFUND_NOT_CREATED)),
    }
}

#[instrument(skip_all)]
async fn create_refund_by_amount(
    State(settings): State<Arc<SettingsService>>,
    State(refunds): State<Arc<RefundService>>,
    Json(request): Json<CreateRefundByAmountRequest>,
) -> Result<StatusCode, ApiError> {
    let Some(amount) = request.refundable_amount.and_then(|amount| Amount::new(amount).ok()) else {
        return Err(ApiError::BadRequest("refundAmountZero"));
    };
    let (space_id, transaction) = load_transaction(
        &settings,
        &refunds,
        request.sales_channel_id.as_deref(),
        request.transaction_id,
    )
    .await?;

    if amount.value() > RefundService::max_refundable_amount(&transaction) {
        return Err(ApiError::BadRequest("refundExceedsAmount"));
    }

    match refunds.create_by_amount(space_id, &transaction, amount).await? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::BadRequest("refundExceedsAmount")),
    }
}

#[instrument(skip_all)]
async fn create_partial_refund(
    State(settings): State<Arc<SettingsService>>,
    State(refunds): State<Arc<RefundService>>,
    Json(request): Json<CreatePartialRefundRequest>,
) -> Result<StatusCode, ApiError> {
    let amount =
        Amount::new(request.refundable_amount).map_err(|_| ApiError::BadRequest("refundAmountZero"))?;
    let (space_id, transaction) = load_transaction(
        &settings,
        &refunds,
        request.sales_channel_id.as_deref(),
        request.transaction_id,
    )
    .await?;

    refunds
        .create_partial(space_id, &transaction, &request.line_item_id, amount)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/api/_action/weareplanet/refund/create-refund/",
            post(create_refund),
        )
        .route(
            "/api/_action/weareplanet/refund/create-refund-by-amount/",
            post(create_refund_by_amount),
        )
        .route(
            "/api/_action/weareplanet/refund/create-partial-refund/",
            post(create_partial_refund),
        )
}
