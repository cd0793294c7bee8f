use log::debug;

/// Names of the tasks a test session created, in creation order, so that
/// teardown can destroy them newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskRegistry {
    names: Vec<String>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-tracking a known name keeps its original position.
    pub fn track(&mut self, name: &str) {
        if self.contains(name) {
            return;
        }
        debug!("Tracking task '{}'.", name);
        self.names.push(name.to_string());
    }

    pub fn remove(&mut self, name: &str) -> bool {
        match self.names.iter().position(|n| n == name) {
            Some(index) => {
                self.names.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn last(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    pub fn pop(&mut self) -> Option<String> {
        self.names.pop()
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_leaves_other_names() {
        let mut registry = TaskRegistry::new();
        for name in ["a", "b", "c"] {
            registry.track(name);
        }
        assert!(registry.remove("b"));
        assert_eq!(registry.names(), ["a", "c"]);
        assert!(!registry.remove("b"));
    }

    #[test]
    fn track_is_idempotent() {
        let mut registry = TaskRegistry::new();
        registry.track("a");
        registry.track("b");
        registry.track("a");
        assert_eq!(registry.names(), ["a", "b"]);
        assert_eq!(registry.last(), Some("b"));
    }
}
