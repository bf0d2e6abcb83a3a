mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use planet_payment::application::refund::RefundService;
use planet_payment::domain::ports::TransactionGateway;
use planet_payment::domain::vendor::TransactionState;
use planet_payment::infrastructure::in_memory::InMemoryGateway;
use planet_payment::interfaces::http::refund::REFUND_NOT_CREATED;
use planet_payment::interfaces::http::{app, state::AppState};
use serde_json::{Value, json};
use tower::ServiceExt;

const BASE: &str = "/api/_action/weareplanet/refund";

async fn setup() -> (axum::Router, InMemoryGateway) {
    let (gateway, _) = common::sandbox().into_stores().await;

    let mut authorized = gateway.read_transaction(1, 1001).await.unwrap().unwrap();
    authorized.id = 1003;
    authorized.state = TransactionState::Authorized;
    gateway.insert_transaction(authorized).await;

    let state = AppState::new(common::settings(), RefundService::new(Box::new(gateway.clone())));
    (app(state), gateway)
}

async fn post(app: &axum::Router, path: &str, body: Value) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(format!("{BASE}/{path}/"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_create_refund_by_quantity() {
    let (app, gateway) = setup().await;
    let refund = |quantity: i64| {
        json!({"salesChannelId": null, "transactionId": 1001, "quantity": quantity, "lineItemId": "li-hat"})
    };

    assert_eq!(
        post(&app, "create-refund", refund(0)).await,
        (StatusCode::BAD_REQUEST, "refundQuantityZero".to_string())
    );
    assert_eq!(
        post(&app, "create-refund", refund(3)).await,
        (StatusCode::BAD_REQUEST, "refundExceedsQuantity".to_string())
    );
    assert_eq!(post(&app, "create-refund", refund(1)).await.0, StatusCode::NO_CONTENT);
    // one hat left
    assert_eq!(
        post(&app, "create-refund", refund(2)).await,
        (StatusCode::BAD_REQUEST, "refundExceedsQuantity".to_string())
    );

    let transaction = gateway.read_transaction(1, 1001).await.unwrap().unwrap();
    assert_eq!(transaction.refunded_amount, rust_decimal_macros::dec!(20));
}

#[tokio::test]
async fn test_create_refund_rejections() {
    let (app, _) = setup().await;

    let (status, body) = post(
        &app,
        "create-refund",
        json!({"transactionId": 1002, "quantity": 1, "lineItemId": "li-sock"}),
    )
    .await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "methodDoesNotSupportRefund"));

    let (status, body) = post(
        &app,
        "create-refund",
        json!({"transactionId": 1003, "quantity": 1, "lineItemId": "li-hat"}),
    )
    .await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, REFUND_NOT_CREATED));

    let (status, _) = post(
        &app,
        "create-refund",
        json!({"transactionId": 999, "quantity": 1, "lineItemId": "li-hat"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_refund_by_amount() {
    let (app, gateway) = setup().await;

    let (status, body) = post(&app, "create-refund-by-amount", json!({"transactionId": 1001})).await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "refundAmountZero"));

    let (status, body) = post(
        &app,
        "create-refund-by-amount",
        json!({"transactionId": 1001, "refundableAmount": -1}),
    )
    .await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "refundAmountZero"));

    let (status, body) = post(
        &app,
        "create-refund-by-amount",
        json!({"transactionId": 1001, "refundableAmount": 44.91}),
    )
    .await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "refundExceedsAmount"));

    let (status, _) = post(
        &app,
        "create-refund-by-amount",
        json!({"transactionId": 1001, "refundableAmount": 10.5}),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // the remaining 34.40 is the new ceiling
    let (status, body) = post(
        &app,
        "create-refund-by-amount",
        json!({"transactionId": 1001, "refundableAmount": 34.41}),
    )
    .await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "refundExceedsAmount"));

    assert_eq!(gateway.refunds(1, 1001).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_partial_refund() {
    let (app, gateway) = setup().await;

    let (status, body) = post(
        &app,
        "create-partial-refund",
        json!({"transactionId": 1002, "refundableAmount": 2, "lineItemId": "li-sock"}),
    )
    .await;
    assert_eq!((status, body.as_str()), (StatusCode::BAD_REQUEST, "methodDoesNotSupportRefund"));

    let (status, _) = post(
        &app,
        "create-partial-refund",
        json!({"transactionId": 1001, "refundableAmount": 5, "lineItemId": "li-hat"}),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // above the line item value nothing is refunded, the request still succeeds
    let (status, _) = post(
        &app,
        "create-partial-refund",
        json!({"transactionId": 1001, "refundableAmount": 500, "lineItemId": "li-hat"}),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let refunds = gateway.refunds(1, 1001).await.unwrap();
    assert_eq!(refunds.len(), 1);
    assert_eq!(refunds[0].reductions[0].quantity_reduction, 0);
    assert_eq!(refunds[0].amount, rust_decimal_macros::dec!(5));
}

#[tokio::test]
async fn test_unknown_line_item_is_server_error() {
    let (app, _) = setup().await;
    let (status, body) = post(
        &app,
        "create-partial-refund",
        json!({"transactionId": 1001, "refundableAmount": 1, "lineItemId": "missing"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Line item doesn't exist: missing");
}
