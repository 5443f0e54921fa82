use super::captures::Container;
use super::error::{MatchError, RouterError};
use super::executor::Resolved;
use super::{NodeKind, Progeny, Router, RouterKind};

use std::mem;

const SLASH: char = '/';

/// Splits off the path segment before the next `/`.
#[inline]
fn split_segment(path: &str) -> (&str, &str) {
    match path.find(SLASH) {
        Some(i) => (&path[..i], &path[i..]),
        None => (path, ""),
    }
}

/// Byte length of the longest common prefix, on char boundaries.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|&((_, x), y)| x != y)
        .map_or_else(|| a.len().min(b.len()), |((i, _), _)| i)
}

impl<C> Router<C> {
    pub(super) fn resolve<'s, 'p, K>(
        &'s self,
        ctx: &C,
        c: &mut K,
        path: &'p str,
    ) -> Result<Resolved<'s, C>, MatchError>
    where
        K: Container<'p> + ?Sized,
        's: 'p,
    {
        match &self.kind {
            NodeKind::String(prefix) => {
                if !path.starts_with(&**prefix) {
                    return Err(MatchError::NotFound);
                }
                self.descend(ctx, c, &path[prefix.len()..])
            }
            NodeKind::Regexp(pattern) => {
                let (segment, rest) = split_segment(path);
                let caps = pattern
                    .regex
                    .captures(segment)
                    .ok_or(MatchError::NotFound)?;
                let resolved = self.descend(ctx, c, rest)?;
                for (key, i) in pattern.indices.iter() {
                    let value = caps.get(*i).map_or("", |m| m.as_str());
                    c.set(key, value);
                }
                Ok(resolved)
            }
            NodeKind::FullMatchRegexp(key) => {
                let (segment, rest) = split_segment(path);
                let resolved = self.descend(ctx, c, rest)?;
                c.set(key, segment);
                Ok(resolved)
            }
            NodeKind::Path(key) => {
                let resolved = self.endpoint.resolve(ctx)?;
                c.set(key, path);
                Ok(resolved)
            }
        }
    }

    /// Resolves this node when `rest` is empty, otherwise the children.
    #[inline]
    fn descend<'s, 'p, K>(
        &'s self,
        ctx: &C,
        c: &mut K,
        rest: &'p str,
    ) -> Result<Resolved<'s, C>, MatchError>
    where
        K: Container<'p> + ?Sized,
        's: 'p,
    {
        if rest.is_empty() {
            self.endpoint.resolve(ctx)
        } else {
            let resolved = self.progeny.resolve(ctx, c, rest)?;
            Ok(resolved.pack(&self.endpoint.middlewares))
        }
    }
}

impl<C> Progeny<C> {
    fn resolve<'s, 'p, K>(
        &'s self,
        ctx: &C,
        c: &mut K,
        path: &'p str,
    ) -> Result<Resolved<'s, C>, MatchError>
    where
        K: Container<'p> + ?Sized,
        's: 'p,
    {
        let first = path.chars().next().ok_or(MatchError::NotFound)?;

        let candidates = self
            .strings
            .find(first)
            .into_iter()
            .chain(self.regexps.iter())
            .chain(self.path.as_deref());

        let mut last_err = MatchError::NotFound;
        for router in candidates {
            match router.resolve(ctx, c, path) {
                Ok(resolved) => return Ok(resolved),
                Err(e) if e.is_unmatched() => {}
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }

    pub(super) fn add(&mut self, router: Router<C>) -> Result<(), RouterError> {
        match router.kind() {
            RouterKind::String => {
                let first = router.first_char().ok_or(RouterError::EmptyRouterTarget {
                    kind: RouterKind::String,
                })?;
                match self.strings.find_mut(first) {
                    Some(existing) => existing.merge_node(router),
                    None => {
                        self.strings.insert(first, router);
                        Ok(())
                    }
                }
            }
            RouterKind::Regexp | RouterKind::FullMatchRegexp => self.add_pattern(router),
            RouterKind::Path => match &mut self.path {
                Some(existing) => existing.merge_node(router),
                None => {
                    self.path = Some(Box::new(router));
                    Ok(())
                }
            },
        }
    }

    fn add_pattern(&mut self, router: Router<C>) -> Result<(), RouterError> {
        let kind = router.kind();
        let same = self
            .regexps
            .iter()
            .position(|r| r.kind() == kind && r.target() == router.target());
        if let Some(i) = same {
            return self.regexps[i].merge_node(router);
        }

        // Constrained patterns are tried before plain captures.
        match kind {
            RouterKind::Regexp => {
                let at = self
                    .regexps
                    .iter()
                    .position(|r| r.kind() == RouterKind::FullMatchRegexp)
                    .unwrap_or_else(|| self.regexps.len());
                self.regexps.insert(at, router);
            }
            _ => self.regexps.push(router),
        }
        Ok(())
    }

    fn merge(&mut self, other: Progeny<C>) -> Result<(), RouterError> {
        for r in other.strings.into_values() {
            self.add(r)?;
        }
        for r in other.regexps {
            self.add(r)?;
        }
        if let Some(r) = other.path {
            self.add(*r)?;
        }
        Ok(())
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = &Router<C>> {
        self.strings
            .values()
            .chain(self.regexps.iter())
            .chain(self.path.as_deref())
    }
}

impl<C> Router<C> {
    fn first_char(&self) -> Option<char> {
        match &self.kind {
            NodeKind::String(prefix) => prefix.chars().next(),
            _ => None,
        }
    }

    fn trim_prefix(&mut self, n: usize) {
        if let NodeKind::String(prefix) = &mut self.kind {
            *prefix = prefix[n..].into();
        }
    }

    pub(super) fn merge_node(&mut self, other: Router<C>) -> Result<(), RouterError> {
        match (&self.kind, &other.kind) {
            (NodeKind::String(_), NodeKind::String(_)) => self.merge_string(other),
            (NodeKind::Regexp(a), NodeKind::Regexp(b)) => {
                if a.exp != b.exp {
                    return Err(RouterError::UnmatchedRouterRegexp {
                        a: a.exp.to_string(),
                        b: b.exp.to_string(),
                    });
                }
                self.absorb(other)
            }
            (NodeKind::FullMatchRegexp(a), NodeKind::FullMatchRegexp(b))
            | (NodeKind::Path(a), NodeKind::Path(b)) => {
                if a != b {
                    return Err(RouterError::UnmatchedRouterKey {
                        a: a.to_string(),
                        b: b.to_string(),
                    });
                }
                self.absorb(other)
            }
            _ => Err(RouterError::UnmatchedRouterKind {
                a: self.kind(),
                b: other.kind(),
            }),
        }
    }

    fn absorb(&mut self, other: Router<C>) -> Result<(), RouterError> {
        let target = self.target().into_owned();
        self.endpoint.merge(other.endpoint, &target)?;
        self.progeny.merge(other.progeny)
    }

    fn merge_string(&mut self, mut other: Router<C>) -> Result<(), RouterError> {
        let (a, b) = match (&self.kind, &other.kind) {
            (NodeKind::String(a), NodeKind::String(b)) => (a.len(), b.len()),
            _ => {
                return Err(RouterError::UnmatchedRouterKind {
                    a: self.kind(),
                    b: other.kind(),
                })
            }
        };
        let n = common_prefix_len(&self.target(), &other.target());
        if n == 0 {
            return Err(RouterError::NoCommonPrefix {
                a: self.target().into_owned(),
                b: other.target().into_owned(),
            });
        }

        if n == a && n == b {
            self.absorb(other)
        } else if n == a {
            other.trim_prefix(n);
            self.progeny.add(other)
        } else if n == b {
            let mut old = mem::replace(self, other);
            old.trim_prefix(n);
            self.progeny.add(old)
        } else {
            let common: Box<str> = self.target()[..n].into();
            let mut old = mem::replace(self, Router::with_kind(NodeKind::String(common)));
            old.trim_prefix(n);
            other.trim_prefix(n);
            self.progeny.add(old)?;
            self.progeny.add(other)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{common_prefix_len, split_segment};

    #[test]
    fn prefix_on_char_boundaries() {
        assert_eq!(common_prefix_len("/users", "/user/me"), 5);
        assert_eq!(common_prefix_len("/a", "/a"), 2);
        assert_eq!(common_prefix_len("/é", "/è"), 1);
        assert_eq!(common_prefix_len("abc", "xyz"), 0);
    }

    #[test]
    fn segment_split() {
        assert_eq!(split_segment("abc/def"), ("abc", "/def"));
        assert_eq!(split_segment("abc"), ("abc", ""));
        assert_eq!(split_segment("/def"), ("", "/def"));
    }
}
