use std::collections::HashMap;

/// Per-call key dictionary.
///
/// Keys get dense indices in first-seen order, nested Bundles included. A
/// fresh dictionary is created for every top-level encode or decode.
#[derive(Debug, Default)]
pub struct KeyDictionary {
    keys: Vec<String>,
    index: HashMap<String, usize>,
}

impl KeyDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn lookup(
        &self,
        key: &str,
    ) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn get(
        &self,
        index: usize,
    ) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    /// Registers `key` and returns its index. An already known key keeps
    /// its original index.
    pub fn register(
        &mut self,
        key: &str,
    ) -> usize {
        if let Some(i) = self.lookup(key) {
            return i;
        }
        let i = self.keys.len();
        self.keys.push(key.to_string());
        self.index.insert(key.to_string(), i);
        i
    }
}
