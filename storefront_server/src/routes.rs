//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here awaits the engine APIs, which are fully async,
//! so database and gateway calls never hold up a worker.
//!
//! The visitor is identified by the visitor cookie (see [`Visitor`]). Cart and checkout handlers reject requests
//! without one.
use std::str::FromStr;

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use serde_json::json;
use storefront_engine::{
    db_types::QuantityAction,
    traits::{CartManagement, OrderManagement, PaymentGateway, StoreDatabase},
    CartApi,
    CheckoutApi,
    OrderQueryApi,
};

use crate::{
    data_objects::{
        AddToCartRequest,
        CartResponse,
        CheckoutRequest,
        CheckoutResponse,
        OrderResponse,
        PaymentFailedRequest,
        RemoveItemRequest,
        UpdateCartItemRequest,
        VerifyPaymentRequest,
    },
    errors::ServerError,
    helpers::Visitor,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires admin) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::AdminKeyMiddlewareFactory::new());
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(add_to_cart => Post "/cart" impl CartManagement);
/// Route handler for adding items to the visitor's cart.
///
/// Items whose `(name, size)` is already in the cart have their quantities added to the existing line. Anything else
/// is appended. The cart is created if the visitor doesn't have one yet.
pub async fn add_to_cart<B: CartManagement>(
    visitor: Visitor,
    body: web::Json<AddToCartRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let Visitor(visitor_id) = visitor;
    let AddToCartRequest { items } = body.into_inner();
    debug!("💻️ POST cart for {visitor_id} with {} items", items.len());
    let cart = api.add_or_merge_items(&visitor_id, items).await?;
    Ok(HttpResponse::Ok().json(CartResponse::new("Cart updated", cart)))
}

route!(update_cart_item => Patch "/cart/item" impl CartManagement);
/// Route handler for stepping the quantity of a cart item up or down by one.
///
/// `action` must be `increment` or `decrement`. Quantities never drop below 1; use `DELETE /cart/item` to remove a
/// line.
pub async fn update_cart_item<B: CartManagement>(
    visitor: Visitor,
    body: web::Json<UpdateCartItemRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let Visitor(visitor_id) = visitor;
    let UpdateCartItemRequest { name, action } = body.into_inner();
    if name.trim().is_empty() || action.trim().is_empty() {
        return Err(ServerError::ValidationError("Item name and action are required".into()));
    }
    let action = QuantityAction::from_str(action.trim()).map_err(|e| ServerError::ValidationError(e.to_string()))?;
    debug!("💻️ PATCH cart item '{name}' ({action}) for {visitor_id}");
    let cart = api.adjust_quantity(&visitor_id, &name, action).await?;
    Ok(HttpResponse::Ok().json(CartResponse::new("Cart item updated", cart)))
}

route!(get_cart => Get "/cart" impl CartManagement);
pub async fn get_cart<B: CartManagement>(
    visitor: Visitor,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let Visitor(visitor_id) = visitor;
    debug!("💻️ GET cart for {visitor_id}");
    let cart = api.get_cart(&visitor_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "cart": cart })))
}

route!(remove_cart_item => Delete "/cart/item" impl CartManagement);
/// Route handler for removing every line with the given name, whatever its size. Removing a name that isn't in the
/// cart succeeds and leaves the cart unchanged.
pub async fn remove_cart_item<B: CartManagement>(
    visitor: Visitor,
    body: web::Json<RemoveItemRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let Visitor(visitor_id) = visitor;
    let RemoveItemRequest { name } = body.into_inner();
    if name.trim().is_empty() {
        return Err(ServerError::ValidationError("Item name is required".into()));
    }
    debug!("💻️ DELETE cart item '{name}' for {visitor_id}");
    let cart = api.remove_item(&visitor_id, &name).await?;
    Ok(HttpResponse::Ok().json(CartResponse::new("Item removed from cart", cart)))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl StoreDatabase, PaymentGateway);
/// Route handler for checkout.
///
/// Creates a pending order and a Razorpay order for its total. The response carries the Razorpay order exactly as
/// Razorpay returned it (`gatewayOrder`) so that the browser can open the Razorpay checkout.
pub async fn checkout<B: StoreDatabase, G: PaymentGateway>(
    visitor: Visitor,
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let Visitor(visitor_id) = visitor;
    let CheckoutRequest { user_info, items } = body.into_inner();
    let buyer = user_info.ok_or_else(|| ServerError::ValidationError("User info is required".into()))?;
    debug!("💻️ POST checkout for {visitor_id} with {} items", items.len());
    let result = api.checkout(&visitor_id, buyer, items).await?;
    let response =
        CheckoutResponse { message: "Order created".into(), order: result.order, gateway_order: result.intent.raw };
    Ok(HttpResponse::Ok().json(response))
}

route!(verify_payment => Post "/checkout/verify" impl StoreDatabase, PaymentGateway);
/// Route handler for payment verification.
///
/// The browser forwards the gateway's confirmation here. If the signature checks out, the order is marked as paid and
/// the visitor's cart (if there is a visitor cookie) is cleared. Repeating a successful verification is harmless.
pub async fn verify_payment<B: StoreDatabase, G: PaymentGateway>(
    visitor: Option<Visitor>,
    body: web::Json<VerifyPaymentRequest>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let VerifyPaymentRequest { gateway_order_id, gateway_payment_id, signature } = body.into_inner();
    debug!("💻️ POST verify payment {gateway_payment_id} for {gateway_order_id}");
    let visitor_id = visitor.map(|v| v.0);
    let order = api.verify_payment(&gateway_order_id, &gateway_payment_id, &signature, visitor_id.as_ref()).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::new("Payment verified", order)))
}

route!(payment_failed => Post "/checkout/failed" impl StoreDatabase, PaymentGateway);
/// Route handler for recording a failed payment attempt. Only the visitor that placed the order can mark it as failed.
pub async fn payment_failed<B: StoreDatabase, G: PaymentGateway>(
    visitor: Visitor,
    body: web::Json<PaymentFailedRequest>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let Visitor(visitor_id) = visitor;
    let PaymentFailedRequest { gateway_order_id, reason } = body.into_inner();
    debug!("💻️ POST payment failed for {gateway_order_id} by {visitor_id}");
    let order = api.mark_payment_failed(&gateway_order_id, &visitor_id, &reason).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::new("Payment failure recorded", order)))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(order_by_id => Get "/orders/{order_id}" impl OrderManagement);
pub async fn order_by_id<B: OrderManagement>(
    path: web::Path<i64>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order #{order_id}");
    let order = api.get_order(order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(my_orders => Get "/orders" impl OrderManagement);
/// Route handler for the visitor's own orders, newest first.
pub async fn my_orders<B: OrderManagement>(
    visitor: Visitor,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let Visitor(visitor_id) = visitor;
    debug!("💻️ GET orders for {visitor_id}");
    let orders = api.orders_for_visitor(&visitor_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(all_orders => Get "/admin/orders" impl OrderManagement where requires admin);
/// Route handler for the admin order listing. Every order in the store, newest first.
///
/// Requires the admin API key in the `X-Admin-Key` header.
pub async fn all_orders<B: OrderManagement>(api: web::Data<OrderQueryApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET all orders");
    let orders = api.all_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}
