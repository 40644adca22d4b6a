#![allow(clippy::module_inception)]
pub mod error_responder;
pub mod middleware;
pub mod panic_recovery_middleware;
pub mod request_id_middleware;
pub mod tracing_middleware;

pub use error_responder::{ErrorResponder, ErrorResponderConfig};
pub use middleware::{Middleware, compose};
pub use panic_recovery_middleware::PanicRecoveryMiddleware;
pub use request_id_middleware::RequestId;
pub use tracing_middleware::TracingMiddleware;
