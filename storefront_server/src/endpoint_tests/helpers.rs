use actix_web::{
    body,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
    ResponseError,
};
use chrono::{TimeZone, Utc};
use log::debug;
use serde_json::Value;
use storefront_engine::db_types::{
    BuyerInfo,
    Cart,
    CartItem,
    Order,
    OrderItem,
    Paise,
    PaymentStatus,
    VisitorId,
};

use crate::{helpers::VisitorCookie, server::json_error_handler};

/// Sends `req` to an app set up by `configure` and returns the status and the body parsed as JSON.
///
/// Errors raised by middleware are rendered the same way the server would render them.
pub async fn send_request(req: TestRequest, configure: fn(&mut ServiceConfig)) -> (StatusCode, Value) {
    let app = App::new()
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::Data::new(VisitorCookie::default()))
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => res.into_parts().1.map_into_boxed_body(),
        Err(e) => e.error_response(),
    };
    let status = res.status();
    let bytes = body::to_bytes(res.into_body()).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()));
    (status, body)
}

pub fn buyer() -> BuyerInfo {
    BuyerInfo {
        name: "Asha Rao".into(),
        email: "asha@example.com".into(),
        phone: "+91 98450 00000".into(),
        address: "12 MG Road".into(),
        city: "Bengaluru".into(),
        country: "India".into(),
        postal_code: "560001".into(),
    }
}

pub fn cart(visitor: &str, items: Vec<CartItem>) -> Cart {
    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
    Cart { id: 7, visitor_id: VisitorId::from(visitor), items, created_at: ts, updated_at: ts }
}

pub fn order(id: i64, visitor: &str, gateway_order_id: &str, status: PaymentStatus) -> Order {
    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap() + chrono::Duration::minutes(id);
    let items = vec![
        OrderItem::new("soap", "Soap", Paise::from(5000), 2),
        OrderItem::new("oil", "Oil", Paise::from(4975), 2),
    ];
    let paid = status == PaymentStatus::Paid;
    Order {
        id,
        visitor_id: VisitorId::from(visitor),
        buyer_info: buyer(),
        items,
        total_amount: Paise::from(19950),
        currency: "INR".into(),
        payment_status: status,
        gateway_order_id: gateway_order_id.into(),
        gateway_payment_id: paid.then(|| "pay_1".to_string()),
        failure_reason: None,
        created_at: ts,
        updated_at: ts,
    }
}
