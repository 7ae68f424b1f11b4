use url::Url;

/// The page address the overlay state is mirrored into. Updates never
/// trigger a navigation.
pub trait Location {
    fn current(&self) -> Url;

    /// Add a history entry for `url`.
    fn push(&mut self, url: Url);

    /// Overwrite the current history entry.
    fn replace(&mut self, url: Url);
}

/// History kept in memory, for tests and non-browser front ends.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    entries: Vec<Url>,
}

impl MemoryLocation {
    pub fn new(url: Url) -> Self {
        Self { entries: vec![url] }
    }

    pub fn history(&self) -> &[Url] {
        &self.entries
    }
}

impl Location for MemoryLocation {
    fn current(&self) -> Url {
        // entries is never empty: it starts with one url and only grows
        self.entries[self.entries.len() - 1].clone()
    }

    fn push(&mut self, url: Url) {
        self.entries.push(url);
    }

    fn replace(&mut self, url: Url) {
        if let Some(last) = self.entries.last_mut() {
            *last = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_replace() {
        let start = Url::parse("https://rumenbao.com/articles").unwrap();
        let mut location = MemoryLocation::new(start.clone());

        let opened = Url::parse("https://rumenbao.com/articles?id=1").unwrap();
        location.push(opened.clone());
        assert_eq!(location.current(), opened);
        assert_eq!(location.history().len(), 2);

        location.replace(start.clone());
        assert_eq!(location.current(), start);
        assert_eq!(location.history().len(), 2);
    }
}
