use std::collections::BTreeSet;

use crate::core::ALL_CATEGORY_PATH;

/// Set of selected category paths. Never empty: "nothing selected" is the "all" sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySelection {
    paths: BTreeSet<String>,
}

impl Default for CategorySelection {
    fn default() -> Self {
        Self::all()
    }
}

impl CategorySelection {
    pub fn all() -> Self {
        let mut paths = BTreeSet::new();
        paths.insert(ALL_CATEGORY_PATH.to_string());
        Self { paths }
    }

    /// Normalizes an arbitrary set: empty or containing the sentinel means "all".
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths: BTreeSet<String> = paths.into_iter().map(Into::into).collect();

        if paths.is_empty() || paths.contains(ALL_CATEGORY_PATH) {
            return Self::all();
        }

        Self { paths }
    }

    pub fn is_all(&self) -> bool {
        self.paths.contains(ALL_CATEGORY_PATH)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn matches(&self, category_path: &str) -> bool {
        self.is_all() || self.paths.contains(category_path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn select(&mut self, path: &str) {
        if path == ALL_CATEGORY_PATH {
            *self = Self::all();
            return;
        }

        self.paths.remove(ALL_CATEGORY_PATH);
        self.paths.insert(path.to_string());
    }

    pub fn deselect(&mut self, path: &str) {
        if path == ALL_CATEGORY_PATH {
            return;
        }

        self.paths.remove(path);
        if self.paths.is_empty() {
            *self = Self::all();
        }
    }

    /// Sidebar click: flips a specific category, or resets to "all" for the sentinel.
    pub fn toggle(&mut self, path: &str) {
        if path != ALL_CATEGORY_PATH && self.paths.contains(path) {
            self.deselect(path);
        } else {
            self.select(path);
        }
    }
}
