use std::time::Duration;

use actix_web::{
    dev::Server,
    error::{JsonPayloadError, PathError},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpRequest,
    HttpServer,
};
use log::*;
use storefront_engine::{events::EventProducers, CartApi, CheckoutApi, OrderQueryApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    helpers::VisitorCookie,
    integrations::{notifications::create_notification_event_handlers, razorpay::RazorpayGateway},
    middleware::AdminApiKey,
    routes::{
        health,
        AddToCartRoute,
        AllOrdersRoute,
        CheckoutRoute,
        GetCartRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        PaymentFailedRoute,
        RemoveCartItemRoute,
        UpdateCartItemRoute,
        VerifyPaymentRoute,
    },
};

const MAX_DB_CONNECTIONS: u32 = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    if config.database_url.is_empty() {
        return Err(ServerError::ConfigurationError("SF_DATABASE_URL must be set".into()));
    }
    let db = SqliteDatabase::open_and_migrate(&config.database_url, MAX_DB_CONNECTIONS)
        .await
        .map_err(|e| ServerError::InitializeError(format!("Could not open the storefront database. {e}")))?;
    info!("🗃️ Database ready at {}", config.database_url);
    let handlers = create_notification_event_handlers(config.notifications.clone())?;
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::InitializeError(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let gateway = RazorpayGateway::new(config.razorpay.clone())
        .map_err(|e| ServerError::InitializeError(format!("Could not create the Razorpay client. {e}")))?;
    let visitor_cookie = VisitorCookie(config.visitor_cookie.clone());
    let admin_key = AdminApiKey::new(config.admin_api_key.clone());
    let verify_cart = config.verify_cart_on_checkout;
    let srv = HttpServer::new(move || {
        let cart_api = CartApi::new(db.clone());
        let checkout_api =
            CheckoutApi::new(db.clone(), gateway.clone(), producers.clone()).with_cart_verification(verify_cart);
        let orders_api = OrderQueryApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sf::access_log"))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .app_data(web::Data::new(visitor_cookie.clone()))
            .app_data(web::Data::new(admin_key.clone()))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(orders_api))
            .service(health)
            .service(AddToCartRoute::<SqliteDatabase>::new())
            .service(UpdateCartItemRoute::<SqliteDatabase>::new())
            .service(GetCartRoute::<SqliteDatabase>::new())
            .service(RemoveCartItemRoute::<SqliteDatabase>::new())
            .service(CheckoutRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(VerifyPaymentRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(PaymentFailedRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(AllOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies get the same `{"error": …}` response as every other failure.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!("💻️ Could not deserialize request body. {err}");
    ServerError::InvalidRequestBody(err.to_string()).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    ServerError::InvalidRequestPath(err.to_string()).into()
}
