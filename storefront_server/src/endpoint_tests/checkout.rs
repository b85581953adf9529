use actix_web::{cookie::Cookie, http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use serde_json::{json, Value};
use storefront_engine::{
    db_types::{CartItem, Paise, PaymentStatus},
    events::EventProducers,
    traits::{GatewayError, PaymentIntent},
    CheckoutApi,
};

use super::{
    helpers::{buyer, cart, order, send_request},
    mocks::{MockGateway, MockStore},
};
use crate::routes::{CheckoutRoute, PaymentFailedRoute, VerifyPaymentRoute};

fn register(cfg: &mut ServiceConfig, store: MockStore, gateway: MockGateway, verify_cart: bool) {
    let api = CheckoutApi::new(store, gateway, EventProducers::default()).with_cart_verification(verify_cart);
    cfg.service(CheckoutRoute::<MockStore, MockGateway>::new())
        .service(VerifyPaymentRoute::<MockStore, MockGateway>::new())
        .service(PaymentFailedRoute::<MockStore, MockGateway>::new())
        .app_data(web::Data::new(api));
}

fn checkout_body() -> Value {
    json!({
        "userInfo": buyer(),
        "items": [
            {"productId": "soap", "name": "Soap", "price": 50.0, "quantity": 2},
            {"productId": "oil", "name": "Oil", "price": 49.75, "quantity": 2}
        ]
    })
}

fn checkout_request() -> TestRequest {
    TestRequest::post().uri("/checkout").cookie(Cookie::new("uuid", "v1")).set_json(checkout_body())
}

fn intent() -> PaymentIntent {
    PaymentIntent {
        id: "order_rzp_1".into(),
        amount: Paise::from(19950),
        currency: "INR".into(),
        receipt: "order_rcpt_1717236000000".into(),
        raw: json!({"id": "order_rzp_1", "entity": "order", "amount": 19950, "currency": "INR", "status": "created"}),
    }
}

//----------------------------------------------   POST /checkout  ----------------------------------------------------

fn configure_checkout(cfg: &mut ServiceConfig) {
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_payment_intent()
        .withf(|r| r.amount == Paise::from(19950) && r.currency == "INR" && r.receipt.starts_with("order_rcpt_"))
        .times(1)
        .returning(|_| Ok(intent()));
    let mut store = MockStore::new();
    store
        .expect_insert_order()
        .withf(|o| o.gateway_order_id == "order_rzp_1" && o.total_amount == Paise::from(19950) && o.items.len() == 2)
        .times(1)
        .returning(|_| Ok(order(1, "v1", "order_rzp_1", PaymentStatus::Pending)));
    register(cfg, store, gateway, false);
}

#[actix_web::test]
async fn checkout() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(checkout_request(), configure_checkout).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order created");
    assert_eq!(body["order"]["id"], 1);
    assert_eq!(body["order"]["totalAmount"], 199.5);
    assert_eq!(body["order"]["paymentStatus"], "pending");
    assert_eq!(body["order"]["userInfo"]["postalCode"], "560001");
    assert_eq!(body["gatewayOrder"]["id"], "order_rzp_1");
    assert_eq!(body["gatewayOrder"]["status"], "created");
}

#[actix_web::test]
async fn checkout_matches_cart() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(checkout_request(), |cfg| {
        let mut gateway = MockGateway::new();
        gateway.expect_create_payment_intent().returning(|_| Ok(intent()));
        let mut store = MockStore::new();
        store.expect_fetch_cart().returning(|_| {
            Ok(Some(cart("v1", vec![
                CartItem::new("Soap", Paise::from(5000), 1).with_size("100g"),
                CartItem::new("Soap", Paise::from(5000), 1).with_size("250g"),
                CartItem::new("Oil", Paise::from(4975), 2),
            ])))
        });
        store.expect_insert_order().returning(|_| Ok(order(1, "v1", "order_rzp_1", PaymentStatus::Pending)));
        register(cfg, store, gateway, true);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn checkout_total_too_large() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "userInfo": buyer(),
        "items": [
            {"productId": "gold", "name": "Gold", "price": 4.0e16, "quantity": 4},
            {"productId": "soap", "name": "Soap", "price": 1.0, "quantity": 1}
        ]
    });
    let req = TestRequest::post().uri("/checkout").cookie(Cookie::new("uuid", "v1")).set_json(body);
    let (status, body) = send_request(req, |cfg| {
        let mut gateway = MockGateway::new();
        gateway.expect_create_payment_intent().times(0);
        let mut store = MockStore::new();
        store.expect_insert_order().times(0);
        register(cfg, store, gateway, false);
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Order total is too large"}));
}

#[actix_web::test]
async fn checkout_with_tampered_prices() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(checkout_request(), |cfg| {
        let mut gateway = MockGateway::new();
        gateway.expect_create_payment_intent().times(0);
        let mut store = MockStore::new();
        store.expect_fetch_cart().returning(|_| {
            Ok(Some(cart("v1", vec![
                CartItem::new("Soap", Paise::from(7500), 2),
                CartItem::new("Oil", Paise::from(4975), 2),
            ])))
        });
        store.expect_insert_order().times(0);
        register(cfg, store, gateway, true);
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Checkout items do not match the cart"}));
}

#[actix_web::test]
async fn checkout_without_user_info() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post()
        .uri("/checkout")
        .cookie(Cookie::new("uuid", "v1"))
        .set_json(json!({"items": checkout_body()["items"]}));
    let (status, body) =
        send_request(req, |cfg| register(cfg, MockStore::new(), MockGateway::new(), false)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "User info is required"}));
}

#[actix_web::test]
async fn checkout_with_incomplete_user_info() {
    let _ = env_logger::try_init().ok();
    let mut payload = checkout_body();
    payload["userInfo"] = json!({"name": "Asha Rao", "email": "asha@example.com"});
    let req = TestRequest::post().uri("/checkout").cookie(Cookie::new("uuid", "v1")).set_json(payload);
    let (status, body) =
        send_request(req, |cfg| register(cfg, MockStore::new(), MockGateway::new(), false)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "Buyer info is incomplete. Missing: phone, address, city, country, postalCode"})
    );
}

#[actix_web::test]
async fn checkout_when_gateway_is_down() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(checkout_request(), |cfg| {
        let mut gateway = MockGateway::new();
        gateway.expect_create_payment_intent().returning(|_| Err(GatewayError::Timeout));
        let mut store = MockStore::new();
        store.expect_insert_order().times(0);
        register(cfg, store, gateway, false);
    })
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "The payment gateway could not process the request. The payment gateway did not respond in \
                         time"})
    );
}

//----------------------------------------------   POST /checkout/verify  ---------------------------------------------

fn verify_request(signature: &str) -> TestRequest {
    TestRequest::post().uri("/checkout/verify").cookie(Cookie::new("uuid", "v1")).set_json(json!({
        "razorpay_order_id": "order_rzp_1",
        "razorpay_payment_id": "pay_1",
        "razorpay_signature": signature
    }))
}

fn signing_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_verify_signature().returning(|gid, pid, sig| sig == format!("{gid}|{pid}"));
    gateway
}

#[actix_web::test]
async fn verify_payment() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(verify_request("order_rzp_1|pay_1"), |cfg| {
        let mut store = MockStore::new();
        store
            .expect_mark_order_paid()
            .withf(|gid, pid| gid == "order_rzp_1" && pid == "pay_1")
            .times(1)
            .returning(|_, _| Ok(Some(order(1, "v1", "order_rzp_1", PaymentStatus::Paid))));
        store.expect_delete_cart().withf(|v| v.as_str() == "v1").times(1).returning(|_| Ok(true));
        register(cfg, store, signing_gateway(), true);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Payment verified");
    assert_eq!(body["order"]["paymentStatus"], "paid");
    assert_eq!(body["order"]["gatewayPaymentId"], "pay_1");
}

#[actix_web::test]
async fn verify_payment_with_native_field_names_and_no_cookie() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/checkout/verify").set_json(json!({
        "gatewayOrderId": "order_rzp_1",
        "gatewayPaymentId": "pay_1",
        "signature": "order_rzp_1|pay_1"
    }));
    let (status, _) = send_request(req, |cfg| {
        let mut store = MockStore::new();
        store.expect_mark_order_paid().returning(|_, _| Ok(Some(order(1, "v1", "order_rzp_1", PaymentStatus::Paid))));
        store.expect_delete_cart().times(0);
        register(cfg, store, signing_gateway(), true);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn verify_payment_with_bad_signature() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(verify_request("order_rzp_1|pay_2"), |cfg| {
        let mut store = MockStore::new();
        store.expect_mark_order_paid().times(0);
        store.expect_delete_cart().times(0);
        register(cfg, store, signing_gateway(), true);
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Payment verification failed"}));
}

#[actix_web::test]
async fn verify_payment_twice() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(verify_request("order_rzp_1|pay_1"), |cfg| {
        let mut store = MockStore::new();
        store.expect_mark_order_paid().returning(|_, _| Ok(None));
        store
            .expect_fetch_order_by_gateway_id()
            .returning(|gid| Ok(Some(order(1, "v1", gid, PaymentStatus::Paid))));
        store.expect_delete_cart().times(0);
        register(cfg, store, signing_gateway(), true);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["paymentStatus"], "paid");
}

#[actix_web::test]
async fn verify_unknown_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(verify_request("order_rzp_1|pay_1"), |cfg| {
        let mut store = MockStore::new();
        store.expect_mark_order_paid().returning(|_, _| Ok(None));
        store.expect_fetch_order_by_gateway_id().returning(|_| Ok(None));
        register(cfg, store, signing_gateway(), true);
    })
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Order not found: order_rzp_1"}));
}

#[actix_web::test]
async fn verify_failed_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(verify_request("order_rzp_1|pay_1"), |cfg| {
        let mut store = MockStore::new();
        store.expect_mark_order_paid().returning(|_, _| Ok(None));
        store
            .expect_fetch_order_by_gateway_id()
            .returning(|gid| Ok(Some(order(1, "v1", gid, PaymentStatus::Failed))));
        register(cfg, store, signing_gateway(), true);
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Order order_rzp_1 is already failed"}));
}

#[actix_web::test]
async fn verify_payment_missing_fields() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/checkout/verify").set_json(json!({"razorpay_order_id": "order_rzp_1"}));
    let (status, body) =
        send_request(req, |cfg| register(cfg, MockStore::new(), MockGateway::new(), true)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Gateway order id, payment id and signature are required"}));
}

//----------------------------------------------   POST /checkout/failed  ---------------------------------------------

fn failed_request(visitor: &str) -> TestRequest {
    TestRequest::post()
        .uri("/checkout/failed")
        .cookie(Cookie::new("uuid", visitor.to_string()))
        .set_json(json!({"gatewayOrderId": "order_rzp_1", "reason": "Card declined"}))
}

fn configure_failed(cfg: &mut ServiceConfig) {
    let mut store = MockStore::new();
    store.expect_fetch_order_by_gateway_id().returning(|gid| Ok(Some(order(1, "v1", gid, PaymentStatus::Pending))));
    store.expect_mark_order_failed().withf(|gid, reason| gid == "order_rzp_1" && reason == "Card declined").returning(
        |gid, reason| {
            let mut order = order(1, "v1", gid, PaymentStatus::Failed);
            order.failure_reason = Some(reason.to_string());
            Ok(Some(order))
        },
    );
    register(cfg, store, MockGateway::new(), true);
}

#[actix_web::test]
async fn owner_records_failed_payment() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(failed_request("v1"), configure_failed).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Payment failure recorded");
    assert_eq!(body["order"]["paymentStatus"], "failed");
    assert_eq!(body["order"]["failureReason"], "Card declined");
}

#[actix_web::test]
async fn stranger_cannot_fail_an_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(failed_request("v2"), configure_failed).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Order not found: order_rzp_1"}));
}
