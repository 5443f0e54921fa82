use crate::router::Captures;

use std::iter::{DoubleEndedIterator, ExactSizeIterator, FusedIterator};
use std::str::FromStr;

/// Path parameters owned by a request.
///
/// Values are kept as ranges into one buffer that starts with the request
/// path, so building them costs a single copy of the path.
#[derive(Debug, Clone, Default)]
pub struct Params {
    buf: String,
    offset: Vec<(String, usize, usize)>, // (name, start, end)
}

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.offset
            .iter()
            .find_map(|&(ref n, s, e)| if n == name { self.buf.get(s..e) } else { None })
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> Option<Result<T, T::Err>> {
        self.get(name).map(T::from_str)
    }

    pub fn len(&self) -> usize {
        self.offset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offset.is_empty()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            buf: &self.buf,
            offset: self.offset.iter(),
        }
    }
}

impl IntoIterator for Params {
    type Item = (String, String);
    type IntoIter = IntoIter;
    fn into_iter(self) -> IntoIter {
        IntoIter {
            buf: self.buf,
            offset: self.offset.into_iter(),
        }
    }
}

impl Params {
    pub(super) fn new<'a>(path: &'a str, caps: &Captures<'a>) -> Self {
        if caps.is_empty() {
            return Self::default();
        }

        let mut buf = path.to_owned();
        let mut offset: Vec<(String, usize, usize)> = Vec::with_capacity(caps.len());
        for &(name, value) in caps.iter() {
            let (start, end) = match range_in(path, value) {
                Some(range) => range,
                None => {
                    let start = buf.len();
                    buf.push_str(value);
                    (start, buf.len())
                }
            };
            offset.push((name.to_owned(), start, end));
        }
        Self { buf, offset }
    }
}

/// The byte range of `value` inside `path`, if it is a slice of it.
fn range_in(path: &str, value: &str) -> Option<(usize, usize)> {
    let base = path.as_ptr() as usize;
    let start = (value.as_ptr() as usize).checked_sub(base)?;
    let end = start.checked_add(value.len())?;
    if end <= path.len() && path.is_char_boundary(start) && path.is_char_boundary(end) {
        Some((start, end))
    } else {
        None
    }
}

pub struct Iter<'a> {
    buf: &'a str,
    offset: std::slice::Iter<'a, (String, usize, usize)>,
}

pub struct IntoIter {
    buf: String,
    offset: std::vec::IntoIter<(String, usize, usize)>,
}

macro_rules! delegate {
    (iter, $method:tt) => {
        fn $method(&mut self) -> Option<Self::Item> {
            let &(ref n, s, e) = self.offset.$method()?;
            Some((n.as_str(), &self.buf[s..e]))
        }
    };

    (into_iter, $method:tt) => {
        fn $method(&mut self) -> Option<Self::Item> {
            let (n, s, e) = self.offset.$method()?;
            Some((n, self.buf[s..e].to_owned()))
        }
    };

    (size_hint) => {
        fn size_hint(&self) -> (usize, Option<usize>) {
            self.offset.size_hint()
        }
    };

    (len) => {
        fn len(&self) -> usize {
            self.offset.len()
        }
    };
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);
    delegate!(iter, next);
    delegate!(size_hint);
}

impl DoubleEndedIterator for Iter<'_> {
    delegate!(iter, next_back);
}

impl Iterator for IntoIter {
    type Item = (String, String);
    delegate!(into_iter, next);
    delegate!(size_hint);
}

impl DoubleEndedIterator for IntoIter {
    delegate!(into_iter, next_back);
}

impl FusedIterator for Iter<'_> {}
impl FusedIterator for IntoIter {}

impl ExactSizeIterator for Iter<'_> {
    delegate!(len);
}

impl ExactSizeIterator for IntoIter {
    delegate!(len);
}
