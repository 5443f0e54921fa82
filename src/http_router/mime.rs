use crate::router::MatchError;

use std::cmp::Ordering;
use std::fmt;

use http::header::{HeaderMap, ACCEPT, CONTENT_TYPE};

pub const MIME_ALL: &str = "*/*";
pub const MIME_JSON: &str = "application/json";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

/// Parses `type/subtype` into its lower-cased form.
fn parse_essence(s: &str) -> Option<String> {
    let s = s.trim();
    if s == "*" {
        return Some(MIME_ALL.to_owned());
    }
    let pos = s.find('/')?;
    let (ty, sub) = (&s[..pos], &s[pos + 1..]);
    if !is_token(ty) || !is_token(sub) {
        return None;
    }
    Some(s.to_ascii_lowercase())
}

fn parse_param(s: &str) -> Option<(&str, &str)> {
    let pos = s.find('=')?;
    let key = s[..pos].trim();
    let value = s[pos + 1..].trim().trim_matches('"');
    if !is_token(key) {
        return None;
    }
    Some((key, value))
}

/// Returns the media type of the request body without its parameters.
/// A missing header means `application/octet-stream`.
pub fn content_type(headers: &HeaderMap) -> Result<String, MatchError> {
    let value = match headers.get(CONTENT_TYPE) {
        Some(v) => v,
        None => return Ok(MIME_OCTET_STREAM.to_owned()),
    };
    let invalid = || MatchError::InvalidContentType(String::from_utf8_lossy(value.as_bytes()).into_owned());

    let s = value.to_str().map_err(|_| invalid())?;
    if s.trim().is_empty() {
        return Ok(MIME_OCTET_STREAM.to_owned());
    }

    let mut parts = s.split(';');
    let essence = parts.next().and_then(parse_essence).ok_or_else(invalid)?;
    for param in parts {
        if !param.trim().is_empty() && parse_param(param).is_none() {
            return Err(invalid());
        }
    }
    Ok(essence)
}

/// Returns the media ranges of the `Accept` header, highest quality first.
/// A missing header means `*/*`.
pub fn accept_types(headers: &HeaderMap) -> Result<Vec<MediaRange>, MatchError> {
    let mut ranges = Vec::new();
    for value in headers.get_all(ACCEPT) {
        let s = value.to_str().map_err(|_| {
            MatchError::InvalidAcceptType(String::from_utf8_lossy(value.as_bytes()).into_owned())
        })?;
        ranges.extend(parse_ranges(s)?);
    }
    if ranges.is_empty() && !headers.contains_key(ACCEPT) {
        ranges.push(MediaRange::all());
    }
    sort_by_quality(&mut ranges);
    Ok(ranges)
}

/// Parses an `Accept` header value.
///
/// Ranges are stable-sorted by descending `q`; parameters other than `q` are
/// kept on the range. Ranges with `q=0` are dropped.
///
/// ```
/// use rest_router::http_router::parse_accept;
///
/// let ranges = parse_accept("text/plain;q=0.5, application/json").unwrap();
/// let ranges: Vec<String> = ranges.iter().map(ToString::to_string).collect();
/// assert_eq!(ranges, ["application/json", "text/plain"]);
/// ```
pub fn parse_accept(s: &str) -> Result<Vec<MediaRange>, MatchError> {
    let mut ranges = parse_ranges(s)?;
    sort_by_quality(&mut ranges);
    Ok(ranges)
}

fn sort_by_quality(ranges: &mut Vec<MediaRange>) {
    ranges.sort_by(|a, b| b.q.partial_cmp(&a.q).unwrap_or(Ordering::Equal));
}

fn parse_ranges(s: &str) -> Result<Vec<MediaRange>, MatchError> {
    let mut ranges = Vec::new();
    for item in s.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let invalid = || MatchError::InvalidAcceptType(item.to_owned());

        let mut parts = item.split(';');
        let essence = parts.next().and_then(parse_essence).ok_or_else(invalid)?;
        let mut range = MediaRange {
            essence,
            params: Vec::new(),
            q: 1.0,
        };
        for param in parts {
            if param.trim().is_empty() {
                continue;
            }
            let (key, value) = parse_param(param).ok_or_else(invalid)?;
            if key.eq_ignore_ascii_case("q") {
                let q: f32 = value.parse().map_err(|_| invalid())?;
                if !(0.0..=1.0).contains(&q) {
                    return Err(invalid());
                }
                range.q = q;
            } else {
                range.params.push((key.to_owned(), value.to_owned()));
            }
        }
        if range.q > 0.0 {
            ranges.push(range);
        }
    }
    Ok(ranges)
}

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    essence: String,
    params: Vec<(String, String)>,
    q: f32,
}

impl MediaRange {
    pub fn all() -> Self {
        Self {
            essence: MIME_ALL.to_owned(),
            params: Vec::new(),
            q: 1.0,
        }
    }

    /// The `type/subtype` part.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    pub fn is_all(&self) -> bool {
        self.essence == MIME_ALL
    }

    /// Whether a concrete media type falls in this range. `*/*` is left to
    /// the caller.
    pub fn matches(&self, media: &str) -> bool {
        if self.is_all() {
            return false;
        }
        match self.essence.strip_suffix("/*") {
            Some(ty) => media
                .strip_prefix(ty)
                .map_or(false, |rest| rest.starts_with('/')),
            None => self.essence.eq_ignore_ascii_case(media),
        }
    }
}

impl fmt::Display for MediaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.essence)?;
        for (k, v) in &self.params {
            write!(f, ";{}={}", k, v)?;
        }
        Ok(())
    }
}
