use super::config::ServiceConfig;
use super::context::RequestContext;
use super::definition::{Definition, Descriptor, Operation};
use super::error::BuildError;
use super::inspector::HttpInspector;
use super::params::Params;
use super::registry::Registry;
use super::HttpMiddleware;
use crate::router::{
    BoxError, Captures, Inspector, MatchError, MiddlewareExecutor, Router,
};

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use http::header::{HeaderValue, LOCATION};
use http::uri::PathAndQuery;
use http::{Request, Response, StatusCode, Uri};
use percent_encoding::percent_decode_str;
use tracing::{debug, error, warn};

/// Middlewares and definitions collected for one path.
#[derive(Debug, Default)]
struct Binding {
    path: String,
    middlewares: Vec<HttpMiddleware>,
    definitions: Vec<Definition>,
}

/// Collects routes and compiles them into a [`RestRouter`].
#[derive(Debug, Default)]
pub struct HttpRouter {
    config: ServiceConfig,
    registry: Registry,
    bindings: Vec<Binding>,
    index: HashMap<String, usize>,
}

/// Joins a descriptor path onto its parent's path.
fn join(prefix: &str, path: &str) -> String {
    format!("{}/{}", prefix, path.trim_matches('/'))
}

/// Joins a sub router path onto a mount prefix. The sub router's root maps
/// to the prefix itself.
fn mount(prefix: &str, path: &str) -> String {
    match path.trim_matches('/') {
        "" if !prefix.is_empty() => prefix.to_owned(),
        _ => join(prefix, path),
    }
}

macro_rules! define_method {
    ($name:ident, $operation:ident) => {
        pub fn $name<F>(&mut self, path: &str, handler: F) -> &mut Self
        where
            F: Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync + 'static,
        {
            self.route(Operation::$operation, path, handler)
        }
    };
}

impl HttpRouter {
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        Self {
            config,
            registry: Registry::default(),
            bindings: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn add_descriptor(&mut self, descriptor: Descriptor) -> &mut Self {
        self.add_descriptor_at("", None, None, descriptor);
        self
    }

    pub fn add_descriptors<I>(&mut self, descriptors: I) -> &mut Self
    where
        I: IntoIterator<Item = Descriptor>,
    {
        for d in descriptors {
            self.add_descriptor(d);
        }
        self
    }

    /// Adds a handler with the content types of the router's config.
    pub fn route<F>(&mut self, operation: Operation, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut RequestContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let definition = Definition::new(operation)
            .consumes(self.config.consumes.iter().cloned())
            .produces(self.config.produces.iter().cloned())
            .handler(handler);
        self.binding(join("", path)).definitions.push(definition);
        self
    }

    define_method!(get, Get);
    define_method!(post, Create);
    define_method!(put, Update);
    define_method!(patch, Patch);
    define_method!(delete, Delete);
    define_method!(any, Any);

    /// Adds a middleware to every route at or below `path`.
    pub fn middleware(&mut self, path: &str, middleware: HttpMiddleware) -> &mut Self {
        self.binding(join("", path)).middlewares.push(middleware);
        self
    }

    pub fn nest(&mut self, prefix: &str, f: impl FnOnce(&mut HttpRouter)) -> &mut Self {
        let mut sub_router = Self::with_config(self.config.clone());
        f(&mut sub_router);
        self.insert_router(prefix, sub_router)
    }

    /// Mounts the routes of `router` under `prefix`. Content types the
    /// sub router registered are added to this router's registry.
    pub fn insert_router(&mut self, prefix: &str, router: HttpRouter) -> &mut Self {
        let prefix = join("", prefix);
        let prefix = prefix.trim_end_matches('/');
        for b in router.bindings {
            let binding = self.binding(mount(prefix, &b.path));
            binding.middlewares.extend(b.middlewares);
            binding.definitions.extend(b.definitions);
        }
        self.registry.absorb(router.registry);
        self
    }

    /// Compiles every binding into an inspector and merges all paths into
    /// one tree.
    pub fn build(self) -> Result<RestRouter, BuildError> {
        let Self {
            config,
            registry,
            bindings,
            ..
        } = self;

        let mut root: Option<Router<RequestContext>> = None;

        for binding in bindings {
            let Binding {
                path,
                middlewares,
                definitions,
            } = binding;

            debug!(
                path = %path,
                definitions = definitions.len(),
                middlewares = middlewares.len(),
                "compiling binding"
            );

            let inspector = if definitions.is_empty() {
                None
            } else {
                if config.redirect_trailing_slash && path.len() > 1 && path.ends_with('/') {
                    warn!(
                        path = %path,
                        definitions = definitions.len(),
                        "definitions on a path with trailing slash are unreachable while redirect_trailing_slash is enabled"
                    );
                }
                let mut inspector = HttpInspector::new(path.clone());
                for d in definitions {
                    debug!(
                        operation = ?d.operation,
                        consumes = ?d.consumes,
                        produces = ?d.produces,
                        "compiling definition"
                    );
                    inspector.add_definition(d, &registry)?;
                }
                Some(Box::new(inspector) as Box<dyn Inspector<RequestContext>>)
            };

            let router_error = |source| BuildError::Router {
                path: path.clone(),
                source,
            };
            let tree = Router::parse_with(&path, middlewares, inspector).map_err(router_error)?;
            root = Some(match root {
                None => tree,
                Some(mut r) => {
                    r.merge(tree).map_err(router_error)?;
                    r
                }
            });
        }

        let root = root.ok_or(BuildError::NoRouter)?;
        Ok(RestRouter {
            root,
            config,
            registry: Arc::new(registry),
        })
    }
}

impl HttpRouter {
    fn add_descriptor_at(
        &mut self,
        prefix: &str,
        consumes: Option<&Vec<String>>,
        produces: Option<&Vec<String>>,
        descriptor: Descriptor,
    ) {
        let Descriptor {
            path,
            consumes: own_consumes,
            produces: own_produces,
            middlewares,
            definitions,
            children,
        } = descriptor;

        let path = join(prefix, &path);
        let consumes = own_consumes.as_ref().or(consumes);
        let produces = own_produces.as_ref().or(produces);

        if !middlewares.is_empty() || !definitions.is_empty() {
            let binding = self.binding(path.clone());
            binding.middlewares.extend(middlewares);
            for mut d in definitions {
                d.inherit(consumes, produces);
                binding.definitions.push(d);
            }
        }

        let prefix = path.trim_end_matches('/');
        for child in children {
            self.add_descriptor_at(prefix, consumes, produces, child);
        }
    }

    fn binding(&mut self, path: String) -> &mut Binding {
        let bindings = &mut self.bindings;
        let i = *self.index.entry(path).or_insert_with_key(|path| {
            bindings.push(Binding {
                path: path.clone(),
                ..Binding::default()
            });
            bindings.len() - 1
        });
        &mut self.bindings[i]
    }
}

/// A compiled router, immutable and shareable across threads.
#[derive(Debug)]
pub struct RestRouter {
    root: Router<RequestContext>,
    config: ServiceConfig,
    registry: Arc<Registry>,
}

impl RestRouter {
    pub fn root(&self) -> &Router<RequestContext> {
        &self.root
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn find<'s, 'p>(
        &'s self,
        ctx: &RequestContext,
        path: &'p str,
    ) -> Result<(MiddlewareExecutor<'s, RequestContext>, Captures<'p>), MatchError>
    where
        's: 'p,
    {
        self.root.find(ctx, path)
    }

    /// Runs the filters, matches the percent-decoded path and executes the
    /// selected handler with its middlewares.
    pub fn dispatch(&self, mut req: Request<Vec<u8>>) -> Response<Vec<u8>> {
        if self.config.fill_leading_slash {
            fill_leading_slash(&mut req);
        }
        if self.config.redirect_trailing_slash {
            if let Some(resp) = redirect_trailing_slash(&req) {
                return resp;
            }
        }

        let mut ctx = RequestContext::new(req);
        let decoded = percent_decode_str(ctx.path())
            .decode_utf8()
            .map(Cow::into_owned);
        let path = match decoded {
            Ok(path) => path,
            Err(e) => {
                debug!(path = ctx.path(), error = %e, "request path is not utf-8");
                ctx.fail(StatusCode::BAD_REQUEST, "invalid path encoding");
                return ctx.into_response();
            }
        };

        let mut captures = Captures::new();
        let executor = match self.root.find_with(&ctx, &mut captures, &path) {
            Ok(executor) => executor,
            Err(e) => {
                debug!(path = %path, error = %e, "request rejected");
                ctx.fail(e.status(), &e.to_string());
                return ctx.into_response();
            }
        };

        ctx.set_route_path(executor.path());
        ctx.set_params(Params::new(&path, &captures));

        if let Err(e) = executor.execute(&mut ctx) {
            error!(path = %path, route = executor.path(), error = %e, "handler failed");
            if !ctx.is_written() {
                ctx.fail(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
            }
        }
        ctx.into_response()
    }
}

fn fill_leading_slash(req: &mut Request<Vec<u8>>) {
    let uri = req.uri();
    if uri.path().starts_with('/') {
        return;
    }
    let filled = match uri.path_and_query() {
        Some(pq) => format!("/{}", pq.as_str()),
        None => "/".to_owned(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = filled.parse::<PathAndQuery>().ok();
    if let Ok(uri) = Uri::from_parts(parts) {
        *req.uri_mut() = uri;
    }
}

fn redirect_trailing_slash(req: &Request<Vec<u8>>) -> Option<Response<Vec<u8>>> {
    let path = req.uri().path();
    if path.len() <= 1 || !path.ends_with('/') {
        return None;
    }

    let mut location = path.trim_end_matches('/').to_owned();
    if location.is_empty() {
        location.push('/');
    }
    if let Some(query) = req.uri().query() {
        location.push('?');
        location.push_str(query);
    }
    let value = HeaderValue::from_str(&location).ok()?;
    debug!(from = %path, to = %location, "redirecting trailing slash");

    let mut resp = Response::new(Vec::new());
    *resp.status_mut() = StatusCode::TEMPORARY_REDIRECT;
    resp.headers_mut().insert(LOCATION, value);
    Some(resp)
}
