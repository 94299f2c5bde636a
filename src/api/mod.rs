pub mod client;
pub mod interceptor;
pub mod models;

pub use client::{ReqwestTransport, Transport};
pub use interceptor::{AuthorizedClient, RequestInterceptor};
pub use models::{TransportRequest, TransportResponse};
