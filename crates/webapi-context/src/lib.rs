//! Web API context for cucumber.
//!
//! [`WebApiContext`] keeps the headers, authorization, placeholders and last
//! response of a scenario and exposes the request and assertion operations.
//! [`ApiWorld`] wraps it as a cucumber world and the [`steps`] module binds
//! the plain-language phrases to it.
//!
//! # Example
//!
//! ```no_run
//! use cucumber::World;
//! use webapi_context::ApiWorld;
//!
//! #[tokio::main]
//! async fn main() {
//!     ApiWorld::run("tests/features").await;
//! }
//! ```

pub mod config;
pub mod context;
pub mod headers;
pub mod placeholders;
pub mod steps;
pub mod transport;
pub mod world;

pub use config::ContextConfig;
pub use context::{parse_form_data, ContextError, RequestData, WebApiContext};
pub use headers::{HeaderValues, RequestHeaders};
pub use placeholders::Placeholders;
pub use transport::{
    ReqwestTransport, RequestBody, RequestOptions, Response, Transport, TransportError,
};
pub use world::ApiWorld;
