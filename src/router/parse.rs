use super::error::RouterError;
use super::{NodeKind, Pattern, Router};

use regex::Regex;

/// The expression of a capture declared without a pattern.
pub const FULL_MATCH_TARGET: &str = ".*";
/// The expression marking a tail capture.
pub const TAIL_MATCH_TARGET: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Literal,
    Regexp,
    Tail,
}

/// One node-to-be of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub target: String,
    pub keys: Vec<String>,
    pub kind: SegmentKind,
}

impl Segment {
    fn literal(s: &str) -> Self {
        Self {
            target: s.to_owned(),
            keys: Vec::new(),
            kind: SegmentKind::Literal,
        }
    }

    /// Returns `true` for a regexp segment made of exactly one capture
    /// without a pattern, which needs no regex evaluation.
    pub fn is_full_match(&self) -> bool {
        match (self.kind, self.keys.as_slice()) {
            (SegmentKind::Regexp, [key]) => self.target == exp_target(key, FULL_MATCH_TARGET),
            _ => false,
        }
    }
}

struct ExpSegment<'a> {
    key: &'a str,
    exp: &'a str,
}

impl<'a> ExpSegment<'a> {
    fn parse(token: &'a str) -> Result<Self, RouterError> {
        let inner = token
            .strip_prefix('{')
            .and_then(|t| t.strip_suffix('}'))
            .ok_or_else(|| RouterError::InvalidRegexp(token.to_owned()))?;

        let (key, exp) = match inner.find(':') {
            Some(pos) => (&inner[..pos], &inner[pos + 1..]),
            None => (inner, FULL_MATCH_TARGET),
        };
        if key.is_empty() {
            return Err(RouterError::InvalidRegexp(token.to_owned()));
        }
        Ok(Self { key, exp })
    }

    fn is_tail(&self) -> bool {
        self.exp == TAIL_MATCH_TARGET
    }
}

fn exp_target(key: &str, exp: &str) -> String {
    format!("(?P<{}>{})", key, exp)
}

/// Splits a template into literal runs and complete `{...}` groups.
///
/// ```
/// use rest_router::router::split;
///
/// let tokens = split("/segments/{segment:[a-z]{1,2}}.log/paths/{path:*}").unwrap();
/// assert_eq!(
///     tokens,
///     ["/segments/", "{segment:[a-z]{1,2}}", ".log/paths/", "{path:*}"]
/// );
/// ```
pub fn split(path: &str) -> Result<Vec<&str>, RouterError> {
    let unmatched = || RouterError::UnmatchedPathBrace {
        path: path.to_owned(),
    };

    let mut result = Vec::with_capacity(5);
    let mut last: usize = 0;
    let mut depth: usize = 0;

    for (i, c) in path.char_indices() {
        match c {
            '{' => {
                depth += 1;
                if depth == 1 {
                    if i > last {
                        result.push(&path[last..i]);
                    }
                    last = i;
                }
            }
            '}' => {
                depth = depth.checked_sub(1).ok_or_else(unmatched)?;
                if depth == 0 {
                    result.push(&path[last..=i]);
                    last = i + 1;
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unmatched());
    }
    if last < path.len() {
        result.push(&path[last..]);
    }
    Ok(result)
}

/// Groups split tokens into segments, one per future router node.
///
/// Literal text following a capture stays in the capture's segment (escaped)
/// up to the next `/`.
pub fn reorganize(tokens: &[&str]) -> Result<Vec<Segment>, RouterError> {
    let mut segments = Vec::with_capacity(tokens.len());
    let mut open: Option<Segment> = None;
    let mut keys: Vec<&str> = Vec::new();

    for (i, &token) in tokens.iter().enumerate() {
        if !token.starts_with('{') {
            match open.take() {
                None => segments.push(Segment::literal(token)),
                Some(mut seg) => match token.find('/') {
                    None => {
                        seg.target.push_str(&regex::escape(token));
                        open = Some(seg);
                    }
                    Some(pos) => {
                        seg.target.push_str(&regex::escape(&token[..pos]));
                        segments.push(seg);
                        segments.push(Segment::literal(&token[pos..]));
                    }
                },
            }
            continue;
        }

        let exp = ExpSegment::parse(token)?;
        if keys.contains(&exp.key) {
            return Err(RouterError::DuplicateKey {
                key: exp.key.to_owned(),
            });
        }
        keys.push(exp.key);

        if exp.is_tail() {
            if i != tokens.len() - 1 {
                return Err(RouterError::InvalidPathKey {
                    key: exp.key.to_owned(),
                });
            }
            if let Some(seg) = open.take() {
                segments.push(seg);
            }
            segments.push(Segment {
                target: String::new(),
                keys: vec![exp.key.to_owned()],
                kind: SegmentKind::Tail,
            });
            break;
        }

        let seg = open.get_or_insert_with(|| Segment {
            target: String::new(),
            keys: Vec::new(),
            kind: SegmentKind::Regexp,
        });
        seg.target.push_str(&exp_target(exp.key, exp.exp));
        seg.keys.push(exp.key.to_owned());
    }

    if let Some(seg) = open {
        segments.push(seg);
    }
    Ok(segments)
}

fn single_key(seg: Segment) -> Result<Box<str>, RouterError> {
    let mut keys = seg.keys.into_iter();
    match (keys.next(), keys.next()) {
        (Some(key), None) => Ok(key.into_boxed_str()),
        _ => Err(RouterError::UnmatchedSegmentKeys(seg.target)),
    }
}

impl Pattern {
    fn compile(exp: String, keys: &[String]) -> Result<Self, RouterError> {
        let regex = Regex::new(&format!("^{}$", exp))?;

        let mut indices = Vec::with_capacity(keys.len());
        let mut wanted = keys.iter().peekable();
        for (i, name) in regex.capture_names().enumerate() {
            match (name, wanted.peek()) {
                (Some(name), Some(key)) if name == key.as_str() => {
                    indices.push((name.into(), i));
                    wanted.next();
                }
                _ => {}
            }
        }
        if wanted.peek().is_some() {
            return Err(RouterError::UnmatchedSegmentKeys(exp));
        }

        Ok(Self {
            exp: exp.into_boxed_str(),
            regex,
            indices,
        })
    }
}

impl<C> Router<C> {
    fn from_segment(seg: Segment) -> Result<Self, RouterError> {
        let kind = match seg.kind {
            SegmentKind::Literal => NodeKind::String(seg.target.into_boxed_str()),
            SegmentKind::Regexp if seg.is_full_match() => {
                NodeKind::FullMatchRegexp(single_key(seg)?)
            }
            SegmentKind::Regexp => NodeKind::Regexp(Pattern::compile(seg.target, &seg.keys)?),
            SegmentKind::Tail => NodeKind::Path(single_key(seg)?),
        };
        Ok(Self::with_kind(kind))
    }
}

/// Parses a template into a chain of nodes, letting `f` configure the leaf
/// before the chain is linked.
pub(super) fn parse_with<C, F>(path: &str, f: F) -> Result<Router<C>, RouterError>
where
    F: FnOnce(&mut Router<C>),
{
    let tokens = split(path)?;
    if tokens.is_empty() {
        return Err(RouterError::InvalidPath);
    }
    let segments = reorganize(&tokens)?;

    let mut nodes = segments
        .into_iter()
        .map(Router::from_segment)
        .collect::<Result<Vec<_>, _>>()?;

    let mut node = nodes.pop().ok_or(RouterError::InvalidPath)?;
    f(&mut node);
    while let Some(mut parent) = nodes.pop() {
        parent.add_router(node)?;
        node = parent;
    }
    Ok(node)
}
