use actix_web::{cookie::Cookie, http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use serde_json::json;
use storefront_engine::{
    db_types::{CartItem, Paise},
    traits::StorageError,
    CartApi,
};

use super::{
    helpers::{cart, send_request},
    mocks::MockStore,
};
use crate::routes::{AddToCartRoute, GetCartRoute, RemoveCartItemRoute, UpdateCartItemRoute};

fn visitor(req: TestRequest) -> TestRequest {
    req.cookie(Cookie::new("uuid", "v1"))
}

fn register(cfg: &mut ServiceConfig, store: MockStore) {
    cfg.service(AddToCartRoute::<MockStore>::new())
        .service(UpdateCartItemRoute::<MockStore>::new())
        .service(GetCartRoute::<MockStore>::new())
        .service(RemoveCartItemRoute::<MockStore>::new())
        .app_data(web::Data::new(CartApi::new(store)));
}

fn soap(qty: i64) -> CartItem {
    CartItem::new("Soap", Paise::from(5000), qty).with_size("100g")
}

//----------------------------------------------   POST /cart  ----------------------------------------------------

fn configure_add(cfg: &mut ServiceConfig) {
    let mut store = MockStore::new();
    store.expect_fetch_cart().returning(|_| Ok(Some(cart("v1", vec![soap(4)]))));
    store
        .expect_add_or_merge_items()
        .withf(|v, items| v.as_str() == "v1" && items.len() == 1 && items[0].size.is_none())
        .returning(|_, _| Ok(cart("v1", vec![soap(5), CartItem::new("Oil", Paise::from(4975), 1)])));
    register(cfg, store);
}

#[actix_web::test]
async fn add_to_cart() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::post().uri("/cart"))
        .set_json(json!({"items": [{"name": "Oil", "price": 49.75, "quantity": 1, "size": ""}]}));
    let (status, body) = send_request(req, configure_add).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cart updated");
    assert_eq!(body["cart"]["visitorId"], "v1");
    assert_eq!(body["cart"]["items"][0]["quantity"], 5);
    assert_eq!(body["cart"]["items"][1]["price"], 49.75);
}

#[actix_web::test]
async fn add_to_cart_without_visitor_cookie() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/cart").set_json(json!({"items": [{"name": "Oil", "price": 49.75, "quantity": 1}]}));
    let (status, body) = send_request(req, configure_add).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Visitor cookie not found"}));
}

#[actix_web::test]
async fn add_nothing_to_cart() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::post().uri("/cart")).set_json(json!({}));
    let (status, body) = send_request(req, |cfg| register(cfg, MockStore::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Items are required"}));
}

#[actix_web::test]
async fn add_invalid_quantity() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::post().uri("/cart"))
        .set_json(json!({"items": [{"name": "Oil", "price": 49.75, "quantity": 0}]}));
    let (status, body) = send_request(req, |cfg| register(cfg, MockStore::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Quantity of 'Oil' must be at least 1"}));
}

#[actix_web::test]
async fn add_malformed_json() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::post().uri("/cart"))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"items\": [");
    let (status, body) = send_request(req, |cfg| register(cfg, MockStore::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Could not read request body"));
}

#[actix_web::test]
async fn add_to_cart_storage_failure() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::post().uri("/cart"))
        .set_json(json!({"items": [{"name": "Oil", "price": 49.75, "quantity": 1}]}));
    let (status, body) = send_request(req, |cfg| {
        let mut store = MockStore::new();
        store.expect_fetch_cart().returning(|_| Ok(None));
        store
            .expect_add_or_merge_items()
            .returning(|_, _| Err(StorageError::DatabaseError("database is locked".into())));
        register(cfg, store);
    })
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("database is locked"));
}

#[actix_web::test]
async fn add_beyond_quantity_limit() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::post().uri("/cart"))
        .set_json(json!({"items": [{"name": "Soap", "price": 50, "quantity": 9997, "size": "100g"}]}));
    let (status, body) = send_request(req, configure_add).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Quantity of 'Soap' cannot be more than 10000"}));
}

//----------------------------------------------   PATCH /cart/item  ----------------------------------------------

fn configure_adjust(cfg: &mut ServiceConfig) {
    let mut store = MockStore::new();
    store.expect_fetch_cart().times(2).returning(|_| Ok(Some(cart("v1", vec![soap(1)]))));
    store.expect_adjust_item_quantity().withf(|id, name, delta| *id == 7 && name == "Soap" && *delta == -1).returning(
        |_, name, _| Ok(name == "Soap"),
    );
    register(cfg, store);
}

#[actix_web::test]
async fn decrement_cart_item() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::patch().uri("/cart/item")).set_json(json!({"name": "Soap", "action": "decrement"}));
    let (status, body) = send_request(req, configure_adjust).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cart item updated");
    assert_eq!(body["cart"]["items"][0]["quantity"], 1);
}

#[actix_web::test]
async fn update_cart_item_missing_fields() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::patch().uri("/cart/item")).set_json(json!({"name": "Soap"}));
    let (status, body) = send_request(req, |cfg| register(cfg, MockStore::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Item name and action are required"}));
}

#[actix_web::test]
async fn update_cart_item_unknown_action() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::patch().uri("/cart/item")).set_json(json!({"name": "Soap", "action": "double"}));
    let (status, body) = send_request(req, |cfg| register(cfg, MockStore::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Conversion error: Invalid quantity action: double"}));
}

#[actix_web::test]
async fn update_item_without_cart() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::patch().uri("/cart/item")).set_json(json!({"name": "Soap", "action": "increment"}));
    let (status, body) = send_request(req, |cfg| {
        let mut store = MockStore::new();
        store.expect_fetch_cart().returning(|_| Ok(None));
        register(cfg, store);
    })
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Cart not found"}));
}

#[actix_web::test]
async fn update_item_not_in_cart() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::patch().uri("/cart/item")).set_json(json!({"name": "Oil", "action": "increment"}));
    let (status, body) = send_request(req, |cfg| {
        let mut store = MockStore::new();
        store.expect_fetch_cart().times(1).returning(|_| Ok(Some(cart("v1", vec![soap(1)]))));
        store.expect_adjust_item_quantity().returning(|_, _, _| Ok(false));
        register(cfg, store);
    })
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Item not found in cart: Oil"}));
}

//----------------------------------------------   GET /cart  ----------------------------------------------------

#[actix_web::test]
async fn fetch_cart() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::get().uri("/cart"));
    let (status, body) = send_request(req, |cfg| {
        let mut store = MockStore::new();
        store.expect_fetch_cart().returning(|_| Ok(Some(cart("v1", vec![soap(2)]))));
        register(cfg, store);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["items"], json!([{"name": "Soap", "price": 50.0, "quantity": 2, "size": "100g"}]));
}

#[actix_web::test]
async fn fetch_missing_cart() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::get().uri("/cart"));
    let (status, body) = send_request(req, |cfg| {
        let mut store = MockStore::new();
        store.expect_fetch_cart().returning(|_| Ok(None));
        register(cfg, store);
    })
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Cart not found"}));
}

//----------------------------------------------   DELETE /cart/item  ----------------------------------------------

#[actix_web::test]
async fn remove_absent_item_is_a_no_op() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::delete().uri("/cart/item")).set_json(json!({"name": "Oil"}));
    let (status, body) = send_request(req, |cfg| {
        let mut store = MockStore::new();
        store.expect_fetch_cart().times(2).returning(|_| Ok(Some(cart("v1", vec![soap(2)]))));
        store.expect_remove_items_named().withf(|id, name| *id == 7 && name == "Oil").returning(|_, _| Ok(0));
        register(cfg, store);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item removed from cart");
    assert_eq!(body["cart"]["items"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn remove_item_without_cart() {
    let _ = env_logger::try_init().ok();
    let req = visitor(TestRequest::delete().uri("/cart/item")).set_json(json!({"name": "Soap"}));
    let (status, body) = send_request(req, |cfg| {
        let mut store = MockStore::new();
        store.expect_fetch_cart().returning(|_| Ok(None));
        register(cfg, store);
    })
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Cart not found"}));
}
