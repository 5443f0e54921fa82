use super::context::RequestContext;
use super::definition::{Definition, Handler};
use super::error::BuildError;
use super::mime::{self, MediaRange, MIME_ALL};
use super::registry::{Consumer, Producer, Registry};
use crate::router::{BoxError, Executor, Inspector, MatchError};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use http::{Method, StatusCode};
use smallvec::SmallVec;

const ANY: &str = "ANY";

/// Selects one definition at a path by method, content type and accepted
/// types.
pub(super) struct HttpInspector {
    path: String,
    by_method: HashMap<Method, Vec<Compiled>>,
    any: Vec<Compiled>,
}

/// A definition ready for dispatch: one outlet per produced type.
struct Compiled {
    consumes: Vec<String>,
    outlets: Vec<Outlet>,
}

struct Outlet {
    media: String,
    producer: Arc<dyn Producer>,
    consumers: Arc<[(String, Arc<dyn Consumer>)]>,
    handler: Handler,
    status: StatusCode,
}

fn is_bodiless(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

impl Compiled {
    fn accepts(&self, content_type: &str) -> bool {
        self.consumes
            .iter()
            .any(|c| c == MIME_ALL || c == content_type)
    }

    /// The outlet producing the earliest accepted range, if any.
    fn producible(&self, ranges: &[MediaRange]) -> Option<&Outlet> {
        ranges
            .iter()
            .find_map(|r| self.outlets.iter().find(|o| r.matches(&o.media)))
    }

    fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.consumes.iter().flat_map(move |c| {
            self.outlets
                .iter()
                .map(move |o| (c.as_str(), o.media.as_str()))
        })
    }
}

impl Executor<RequestContext> for Outlet {
    fn execute(&self, ctx: &mut RequestContext) -> Result<(), BoxError> {
        let consumer = match ctx.content_type() {
            Ok(ct) => self
                .consumers
                .iter()
                .find(|(media, _)| *media == ct)
                .map(|(_, c)| Arc::clone(c)),
            Err(_) => None,
        };
        ctx.prepare(self.status, consumer, Arc::clone(&self.producer));
        self.handler.execute(ctx)
    }
}

impl HttpInspector {
    pub(super) fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            by_method: HashMap::new(),
            any: Vec::new(),
        }
    }

    pub(super) fn add_definition(
        &mut self,
        d: Definition,
        registry: &Registry,
    ) -> Result<(), BuildError> {
        let path = &self.path;

        let operation = d.operation.ok_or_else(|| BuildError::DefinitionNoMethod {
            path: path.clone(),
        })?;
        let method = operation.method();
        let method_name = method.as_ref().map_or(ANY, Method::as_str).to_owned();

        let handler = d.handler.ok_or_else(|| BuildError::DefinitionNoFunction {
            method: method_name.clone(),
            path: path.clone(),
        })?;

        let mut consumes: Vec<String> = d
            .consumes
            .unwrap_or_default()
            .iter()
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if consumes.is_empty() {
            match &method {
                Some(m) if is_bodiless(m) => consumes.push(MIME_ALL.to_owned()),
                _ => {
                    return Err(BuildError::DefinitionNoConsumes {
                        method: method_name,
                        path: path.clone(),
                    })
                }
            }
        }

        let produces: Vec<String> = d
            .produces
            .unwrap_or_default()
            .iter()
            .map(|p| p.to_ascii_lowercase())
            .collect();
        if produces.is_empty() {
            return Err(BuildError::DefinitionNoProduces {
                method: method_name,
                path: path.clone(),
            });
        }

        let mut consumers = Vec::with_capacity(consumes.len());
        for ct in consumes.iter().filter(|c| *c != MIME_ALL) {
            let consumer = registry
                .consumer(ct)
                .ok_or_else(|| BuildError::DefinitionNoConsumer {
                    content_type: ct.clone(),
                    path: path.clone(),
                })?;
            consumers.push((ct.clone(), Arc::clone(consumer)));
        }
        let consumers: Arc<[(String, Arc<dyn Consumer>)]> = consumers.into();

        let mut outlets = Vec::with_capacity(produces.len());
        for media in produces {
            let producer = registry
                .producer(&media)
                .ok_or_else(|| BuildError::DefinitionNoProducer {
                    content_type: media.clone(),
                    path: path.clone(),
                })?;
            outlets.push(Outlet {
                producer: Arc::clone(producer),
                consumers: Arc::clone(&consumers),
                handler: Arc::clone(&handler),
                status: operation.status(),
                media,
            });
        }

        let compiled = Compiled { consumes, outlets };

        let bucket = match method {
            Some(m) => self.by_method.entry(m).or_insert_with(Vec::new),
            None => &mut self.any,
        };
        conflict_check(bucket, &compiled, &method_name, &self.path)?;
        bucket.push(compiled);
        Ok(())
    }
}

fn conflict_check(
    bucket: &[Compiled],
    compiled: &Compiled,
    method: &str,
    path: &str,
) -> Result<(), BuildError> {
    if bucket.is_empty() {
        return Ok(());
    }
    let extant: HashSet<(&str, &str)> = bucket.iter().flat_map(|c| c.pairs()).collect();
    for (consume, produce) in compiled.pairs() {
        if extant.contains(&(consume, produce)) {
            return Err(BuildError::DefinitionConflict {
                consume: consume.to_owned(),
                produce: produce.to_owned(),
                method: method.to_owned(),
                path: path.to_owned(),
            });
        }
    }
    Ok(())
}

impl Inspector<RequestContext> for HttpInspector {
    fn inspect(&self, ctx: &RequestContext) -> Result<&dyn Executor<RequestContext>, MatchError> {
        let method = ctx.method();

        let mut candidates: SmallVec<[&Compiled; 4]> = self
            .by_method
            .get(method)
            .into_iter()
            .flatten()
            .chain(self.any.iter())
            .collect();
        if candidates.is_empty() {
            return Err(MatchError::MethodNotAllowed);
        }

        if !is_bodiless(method) {
            let ct = ctx.content_type()?;
            candidates.retain(|c| c.accepts(&ct));
            if candidates.is_empty() {
                return Err(MatchError::UnsupportedMediaType);
            }
        }

        let ranges = mime::accept_types(ctx.headers())?;
        match select(&candidates, &ranges) {
            Some(outlet) => Ok(outlet as &dyn Executor<RequestContext>),
            None => Err(MatchError::NotAcceptable),
        }
    }

    fn path(&self) -> &str {
        &self.path
    }
}

/// Picks the first candidate producing any accepted type, with its outlet
/// chosen in accept order; `*/*` falls back to the first candidate.
fn select<'a>(candidates: &[&'a Compiled], ranges: &[MediaRange]) -> Option<&'a Outlet> {
    if let Some(outlet) = candidates.iter().find_map(|&c| c.producible(ranges)) {
        return Some(outlet);
    }
    if ranges.iter().any(MediaRange::is_all) {
        return candidates.first().and_then(|c| c.outlets.first());
    }
    None
}
