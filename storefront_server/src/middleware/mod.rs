mod admin_key;

pub use admin_key::{AdminApiKey, AdminKeyMiddlewareFactory, AdminKeyMiddlewareService, ADMIN_KEY_HEADER};
