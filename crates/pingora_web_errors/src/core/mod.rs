pub mod errors;
pub mod request;
pub mod response;
pub(crate) mod router;

pub use errors::{Errors, abort_and_error};
pub use http::Method; // Use standard HTTP Method
pub use request::Request;
pub use response::Response;
pub use router::{FnHandler, Handler, Params, Router};
