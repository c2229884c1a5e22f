//! CLOB API plumbing: transport seam, credential lifecycle, authenticated session.

pub mod clob;
pub mod credentials;
pub mod transport;

pub use clob::{CancelOrderResponse, ClobSession, OrderType, PostOrderRequest, PostOrderResponse};
pub use credentials::CredentialManager;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
