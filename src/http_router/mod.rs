#![forbid(unsafe_code)]

mod config;
mod context;
mod definition;
mod error;
mod inspector;
mod mime;
mod params;
mod registry;
mod router;
mod router_macro;

pub use self::config::ServiceConfig;
pub use self::context::{ContextError, RequestContext};
pub use self::definition::{Definition, Descriptor, Handler, Operation};
pub use self::error::BuildError;
pub use self::mime::{
    accept_types, content_type, parse_accept, MediaRange, MIME_ALL, MIME_JSON, MIME_OCTET_STREAM,
    MIME_TEXT,
};
pub use self::params::Params;
pub use self::registry::{
    Consumer, JsonSerializer, NoneSerializer, PlainSerializer, Producer, Registry,
};
pub use self::router::{HttpRouter, RestRouter};

pub use http::Method;

/// The middleware type of the HTTP layer.
pub type HttpMiddleware = crate::router::Middleware<RequestContext>;
