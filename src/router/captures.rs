use std::collections::HashMap;
use std::ops::Deref;
use std::str::FromStr;

use smallvec::SmallVec;

/// A key-value container filled with the values captured from a path.
pub trait Container<'p> {
    fn set(&mut self, key: &'p str, value: &'p str);
    fn get(&self, key: &str) -> Option<&str>;
}

/// Borrowed captures: keys point into the router tree, values into the path.
#[derive(Debug, Default, Clone)]
pub struct Captures<'p> {
    buf: SmallVec<[(&'p str, &'p str); 8]>,
}

impl<'p> Captures<'p> {
    pub fn new() -> Self {
        Self {
            buf: SmallVec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&'p str> {
        self.buf
            .iter()
            .find_map(|&(k, v)| if name == k { Some(v) } else { None })
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> Option<Result<T, T::Err>> {
        self.get(name).map(T::from_str)
    }
}

impl<'p> Container<'p> for Captures<'p> {
    fn set(&mut self, key: &'p str, value: &'p str) {
        match self.buf.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.buf.push((key, value)),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        Captures::get(self, key)
    }
}

impl<'p> Container<'p> for HashMap<String, String> {
    fn set(&mut self, key: &'p str, value: &'p str) {
        self.insert(key.to_owned(), value.to_owned());
    }

    fn get(&self, key: &str) -> Option<&str> {
        HashMap::get(self, key).map(String::as_str)
    }
}

impl<'p> Deref for Captures<'p> {
    type Target = [(&'p str, &'p str)];
    fn deref(&self) -> &Self::Target {
        &*self.buf
    }
}
