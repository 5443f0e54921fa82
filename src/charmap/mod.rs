use std::cmp::Ordering;

/// A small map keyed by a single char, kept sorted for lookups.
#[derive(Debug)]
pub struct CharMap<T> {
    keys: Vec<char>,
    values: Vec<T>,
}

impl<T> Default for CharMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CharMap<T> {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn find(&self, key: char) -> Option<&T> {
        match self.find_index(key) {
            Ok(i) => self.values.get(i),
            Err(_) => None,
        }
    }

    pub fn find_mut(&mut self, key: char) -> Option<&mut T> {
        match self.find_index(key) {
            Ok(i) => self.values.get_mut(i),
            Err(_) => None,
        }
    }

    /// Inserts `value` under `key`, returning the previous value if any.
    pub fn insert(&mut self, key: char, value: T) -> Option<T> {
        match self.find_index(key) {
            Ok(i) => Some(std::mem::replace(&mut self.values[i], value)),
            Err(i) => {
                self.keys.insert(i, key);
                self.values.insert(i, value);
                None
            }
        }
    }

    pub fn values(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    pub fn into_values(self) -> std::vec::IntoIter<T> {
        self.values.into_iter()
    }

    fn find_index(&self, key: char) -> Result<usize, usize> {
        let keys: &[char] = &self.keys;

        if keys.len() <= 3 {
            for (i, &k) in keys.iter().enumerate() {
                match k.cmp(&key) {
                    Ordering::Less => continue,
                    Ordering::Equal => return Ok(i),
                    Ordering::Greater => return Err(i),
                }
            }
            return Err(keys.len());
        }

        let mut l: usize = 0;
        let mut r: usize = keys.len();

        while l < r {
            let mid = l + (r - l) / 2;
            match keys[mid].cmp(&key) {
                Ordering::Less => l = mid + 1,
                Ordering::Equal => return Ok(mid),
                Ordering::Greater => r = mid,
            }
        }
        Err(l)
    }
}
