//! Ordered, unique-key response headers.
//!
//! Insertion order is preserved on the wire; setting a name that is already
//! present replaces its value in place. Names compare case-insensitively,
//! as in [`Request::header`](crate::Request::header).

/// An ordered map of response header names to values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing an existing entry in place so the
    /// original position is kept.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Folds `other` into `self`; on a name collision `other` wins.
    pub fn merge(&mut self, other: Headers) {
        for (name, value) in other.entries {
            self.set(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place() {
        let mut h = Headers::new();
        h.set("X-One", "1");
        h.set("X-Two", "2");
        h.set("x-one", "uno");
        let order: Vec<_> = h.iter().collect();
        assert_eq!(order, [("X-One", "uno"), ("X-Two", "2")]);
    }

    #[test]
    fn get_is_case_insensitive() {
        let mut h = Headers::new();
        h.set("Location", "/x");
        assert_eq!(h.get("location"), Some("/x"));
    }

    #[test]
    fn merge_prefers_other() {
        let mut base: Headers = [("Content-Type", "text/plain"), ("X-A", "1")].into_iter().collect();
        let other: Headers = [("content-type", "application/json")].into_iter().collect();
        base.merge(other);
        assert_eq!(base.get("Content-Type"), Some("application/json"));
        assert_eq!(base.len(), 2);
    }
}
