use actix_web::{cookie::Cookie, http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use serde_json::json;
use sf_common::Secret;
use storefront_engine::{db_types::PaymentStatus, OrderQueryApi};

use super::{
    helpers::{order, send_request},
    mocks::MockStore,
};
use crate::{
    middleware::{AdminApiKey, ADMIN_KEY_HEADER},
    routes::{AllOrdersRoute, MyOrdersRoute, OrderByIdRoute},
};

fn configure(cfg: &mut ServiceConfig) {
    let mut store = MockStore::new();
    store
        .expect_fetch_order()
        .returning(|id| Ok((id == 1).then(|| order(1, "v1", "order_rzp_1", PaymentStatus::Paid))));
    store.expect_fetch_orders_for_visitor().returning(|v| {
        if v.as_str() == "v1" {
            Ok(vec![
                order(2, "v1", "order_rzp_2", PaymentStatus::Pending),
                order(1, "v1", "order_rzp_1", PaymentStatus::Paid),
            ])
        } else {
            Ok(vec![])
        }
    });
    store.expect_fetch_all_orders().returning(|| {
        Ok(vec![
            order(3, "v2", "order_rzp_3", PaymentStatus::Failed),
            order(2, "v1", "order_rzp_2", PaymentStatus::Pending),
            order(1, "v1", "order_rzp_1", PaymentStatus::Paid),
        ])
    });
    cfg.service(AllOrdersRoute::<MockStore>::new())
        .service(OrderByIdRoute::<MockStore>::new())
        .service(MyOrdersRoute::<MockStore>::new())
        .app_data(web::Data::new(AdminApiKey::new(Secret::new("admin-key".to_string()))))
        .app_data(web::Data::new(OrderQueryApi::new(store)));
}

#[actix_web::test]
async fn fetch_order_by_id() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(TestRequest::get().uri("/orders/1"), configure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["gatewayOrderId"], "order_rzp_1");
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn fetch_unknown_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(TestRequest::get().uri("/orders/99"), configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Order not found: #99"}));
}

#[actix_web::test]
async fn fetch_order_with_bad_id() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(TestRequest::get().uri("/orders/abc"), |cfg| {
        configure(cfg);
        cfg.app_data(web::PathConfig::default().error_handler(crate::server::path_error_handler));
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Could not read request path"));
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/orders").cookie(Cookie::new("uuid", "v1"));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    let ids = body.as_array().unwrap().iter().map(|o| o["id"].as_i64().unwrap()).collect::<Vec<_>>();
    assert_eq!(ids, vec![2, 1]);
}

#[actix_web::test]
async fn fetch_my_orders_without_cookie() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(TestRequest::get().uri("/orders"), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Visitor cookie not found"}));
}

#[actix_web::test]
async fn admin_fetches_all_orders() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/admin/orders").insert_header((ADMIN_KEY_HEADER, "admin-key"));
    let (status, body) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::OK);
    let ids = body.as_array().unwrap().iter().map(|o| o["id"].as_i64().unwrap()).collect::<Vec<_>>();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[actix_web::test]
async fn all_orders_without_admin_key() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(TestRequest::get().uri("/admin/orders"), configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"error": "Insufficient Permissions. A valid admin key is required"}));
}

#[actix_web::test]
async fn all_orders_with_wrong_admin_key() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/admin/orders").insert_header((ADMIN_KEY_HEADER, "admin-kez"));
    let (status, _) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn visitor_cookie_is_not_admin_access() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/admin/orders").cookie(Cookie::new("uuid", "v1"));
    let (status, _) = send_request(req, configure).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
