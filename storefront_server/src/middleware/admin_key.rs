//! Admin key middleware for the storefront server.
//!
//! Routes wrapped with this middleware are only served when the request carries the configured admin API key in the
//! `X-Admin-Key` header. The key itself is read from the [`AdminApiKey`] app data at request time, so the middleware
//! can be attached from the `route!` macro without any configuration.
//!
//! If no admin key has been configured, every request is refused with a 403 Forbidden response.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use hmac::{Hmac, Mac};
use log::{trace, warn};
use sf_common::Secret;
use sha2::Sha256;

use crate::errors::ServerError;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// The admin API key, registered as app data.
#[derive(Clone, Debug, Default)]
pub struct AdminApiKey(pub Secret<String>);

impl AdminApiKey {
    pub fn new(key: Secret<String>) -> Self {
        Self(key)
    }

    /// Compares `supplied` against the configured key in constant time. An unset key matches nothing.
    pub fn matches(&self, supplied: &str) -> bool {
        if self.0.is_unset() {
            return false;
        }
        let expected = self.0.reveal();
        // Comparing MACs of both values with `verify_slice` keeps the comparison constant-time, whatever the lengths
        let tag = |key: &str| {
            Hmac::<Sha256>::new_from_slice(key.as_bytes()).map(|mut mac| {
                mac.update(ADMIN_KEY_HEADER.as_bytes());
                mac
            })
        };
        match (tag(expected), tag(supplied)) {
            (Ok(expected), Ok(supplied)) => supplied.verify_slice(&expected.finalize().into_bytes()).is_ok(),
            _ => false,
        }
    }
}

pub struct AdminKeyMiddlewareFactory;

impl AdminKeyMiddlewareFactory {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        AdminKeyMiddlewareFactory
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminKeyMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AdminKeyMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminKeyMiddlewareService { service: Rc::new(service) }))
    }
}

pub struct AdminKeyMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AdminKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            trace!("🔐️ Checking admin key for request");
            let key = req.app_data::<web::Data<AdminApiKey>>().map(|k| k.get_ref().clone()).unwrap_or_default();
            let supplied = req.headers().get(ADMIN_KEY_HEADER).and_then(|v| v.to_str().ok()).unwrap_or_default();
            if key.matches(supplied) {
                trace!("🔐️ Admin key check for request ✅️");
                service.call(req).await
            } else {
                warn!("🔐️ Missing or invalid admin key for {}. Denying access.", req.path());
                Err(ServerError::InsufficientPermissions("A valid admin key is required".into()).into())
            }
        })
    }
}
