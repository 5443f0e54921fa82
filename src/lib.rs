//! A REST router.
//!
//! Path templates such as `/segments/{segment:[a-z]{1,2}}.log/paths/{path:*}`
//! are parsed into chains of nodes and merged into one tree. Matching a path
//! walks the tree, fills a capture container and resolves the inspector of the
//! leaf, which picks a handler by method and content negotiation. The handler
//! then runs inside the middlewares collected along the matched branch.
//!
//! ```
//! use rest_router::router::{BoxError, Executor, Inspector, MatchError, Router};
//!
//! struct Always(fn(&mut Vec<String>) -> Result<(), BoxError>);
//!
//! impl Inspector<Vec<String>> for Always {
//!     fn inspect(&self, _: &Vec<String>) -> Result<&dyn Executor<Vec<String>>, MatchError> {
//!         Ok(&self.0 as &dyn Executor<Vec<String>>)
//!     }
//!     fn path(&self) -> &str {
//!         "/users/{id}"
//!     }
//! }
//!
//! let mut router = Router::<Vec<String>>::parse_with(
//!     "/users/{id}",
//!     Vec::new(),
//!     Some(Box::new(Always(|log| {
//!         log.push("user".to_owned());
//!         Ok(())
//!     }))),
//! )
//! .unwrap();
//! router.merge(Router::parse("/users/me").unwrap()).unwrap();
//!
//! let mut log = Vec::new();
//! let (executor, captures) = router.find(&log, "/users/42").unwrap();
//! assert_eq!(captures.get("id"), Some("42"));
//! executor.execute(&mut log).unwrap();
//! assert_eq!(log, ["user"]);
//! ```

#![deny(unsafe_code)]

mod charmap;

pub mod router;

#[cfg(feature = "http-router")]
pub mod http_router;

#[cfg(feature = "hyper-service")]
pub mod hyper_service;

pub use crate::router::{Captures, MatchError, Router, RouterError};
