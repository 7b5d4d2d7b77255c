use super::HeaderError;
use http::header::{HeaderMap, HeaderName, HeaderValue};

/// An insertion-ordered multimap of HTTP header fields.
///
/// Names are normalized by [`HeaderName`], so lookups are case-insensitive.
/// The same name may appear any number of times; iteration yields the
/// entries in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    entries: Vec<(HeaderName, HeaderValue)>,
}

fn parse_name(name: &str) -> Result<HeaderName, HeaderError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| HeaderError::InvalidName(name.to_string()))
}

fn parse_value(name: &str, value: &str) -> Result<HeaderValue, HeaderError> {
    HeaderValue::from_str(value).map_err(|_| HeaderError::InvalidValue(name.to_string()))
}

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a value without touching existing values of the same name.
    pub fn append(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        let header_name = parse_name(name)?;
        let header_value = parse_value(name, value)?;
        self.entries.push((header_name, header_value));
        Ok(())
    }

    /// Replaces every value of `name` with `value`.
    ///
    /// The new entry takes the position of the first replaced one, or goes to
    /// the end when the name was not present.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        let header_name = parse_name(name)?;
        let header_value = parse_value(name, value)?;

        match self.entries.iter().position(|(n, _)| *n == header_name) {
            Some(index) => {
                self.entries[index].1 = header_value;
                let mut i = 0;
                self.entries.retain(|(n, _)| {
                    let keep = i <= index || *n != header_name;
                    i += 1;
                    keep
                });
            }
            None => self.entries.push((header_name, header_value)),
        }
        Ok(())
    }

    /// Returns the first value of `name`, if it is valid UTF-8.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next().and_then(|v| v.to_str().ok())
    }

    /// Returns every value of `name` in insertion order.
    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a HeaderValue> + 'a {
        let wanted = parse_name(name).ok();
        self.entries
            .iter()
            .filter(move |(n, _)| wanted.as_ref() == Some(n))
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get_all(name).next().is_some()
    }

    /// Removes every value of `name` and returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let Ok(header_name) = parse_name(name) else {
            return 0;
        };
        let before = self.entries.len();
        self.entries.retain(|(n, _)| *n != header_name);
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    /// Appends all entries of `other`, keeping their order.
    pub fn extend_from(&mut self, other: &HeaderList) {
        self.entries.extend(other.entries.iter().cloned());
    }

    /// Copies the entries into an [`HeaderMap`] for transports built on `http`.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            map.append(name.clone(), value.clone());
        }
        map
    }
}

impl From<&HeaderMap> for HeaderList {
    fn from(map: &HeaderMap) -> Self {
        Self {
            entries: map
                .iter()
                .map(|(n, v)| (n.clone(), v.clone()))
                .collect(),
        }
    }
}
