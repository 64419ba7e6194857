// Client-side routing: the current path drives the active step.

use super::steps::ROOT_PATH;

pub trait Router {
    fn current_path(&self) -> &str;
    /// Navigate to `path`, adding a history entry.
    fn push(&mut self, path: &str);
    /// Navigate to `path`, replacing the current entry.
    fn replace(&mut self, path: &str);
}

/// Browser-like history kept in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryHistory {
    entries: Vec<String>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(initial_path: &str) -> Self {
        Self {
            entries: vec![initial_path.to_string()],
            index: 0,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Step back one entry. Returns false at the start of history.
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(ROOT_PATH)
    }
}

impl Router for MemoryHistory {
    fn current_path(&self) -> &str {
        self.entries
            .get(self.index)
            .map(String::as_str)
            .unwrap_or(ROOT_PATH)
    }

    fn push(&mut self, path: &str) {
        // pushing drops any forward entries, like a browser
        self.entries.truncate(self.index + 1);
        self.entries.push(path.to_string());
        self.index = self.entries.len() - 1;
    }

    fn replace(&mut self, path: &str) {
        match self.entries.get_mut(self.index) {
            Some(entry) => *entry = path.to_string(),
            None => self.push(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_back() {
        let mut history = MemoryHistory::default();
        history.push("/problem-description");
        history.push("/organization-info");
        assert_eq!(history.current_path(), "/organization-info");
        assert!(history.back());
        assert_eq!(history.current_path(), "/problem-description");
        assert!(history.forward());
        assert_eq!(history.current_path(), "/organization-info");
    }

    #[test]
    fn push_after_back_drops_forward_entries() {
        let mut history = MemoryHistory::new("/");
        history.push("/a");
        history.push("/b");
        history.back();
        history.push("/c");
        assert_eq!(history.entries(), &["/", "/a", "/c"]);
        assert!(!history.forward());
    }

    #[test]
    fn replace_keeps_history_length() {
        let mut history = MemoryHistory::new("/recap");
        history.replace("/");
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_path(), "/");
        assert!(!history.back());
    }
}
