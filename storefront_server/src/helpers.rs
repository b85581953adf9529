use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use log::trace;
use storefront_engine::db_types::VisitorId;

use crate::errors::ServerError;

pub const DEFAULT_VISITOR_COOKIE: &str = "uuid";

/// The name of the cookie that identifies a visitor, registered as app data.
#[derive(Clone, Debug)]
pub struct VisitorCookie(pub String);

impl Default for VisitorCookie {
    fn default() -> Self {
        Self(DEFAULT_VISITOR_COOKIE.to_string())
    }
}

/// Reads the visitor id from the request's visitor cookie. Blank values count as missing.
pub fn visitor_id_from_request(req: &HttpRequest) -> Option<VisitorId> {
    let cookie_name = req
        .app_data::<web::Data<VisitorCookie>>()
        .map(|c| c.0.clone())
        .unwrap_or_else(|| DEFAULT_VISITOR_COOKIE.to_string());
    let visitor = req.cookie(&cookie_name).map(|c| c.value().trim().to_string()).filter(|v| !v.is_empty());
    trace!("💻️ Visitor cookie '{cookie_name}': {visitor:?}");
    visitor.map(VisitorId::from)
}

/// Extractor for the anonymous visitor making the request.
///
/// Handlers that take a `Visitor` reject requests without a visitor cookie with a 400 response. Use
/// `Option<Visitor>` where the visitor is not essential.
#[derive(Clone, Debug)]
pub struct Visitor(pub VisitorId);

impl FromRequest for Visitor {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(visitor_id_from_request(req).map(Visitor).ok_or(ServerError::MissingVisitorId))
    }
}
