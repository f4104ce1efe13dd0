pub mod auth;
pub mod headers;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use headers::security_headers_middleware;
