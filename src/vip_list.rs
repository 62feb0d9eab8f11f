use crate::error::ListError;
use serde::{Deserialize, Serialize};

/// Flat, duplicate-free VIP list kept in display order (alphabetical).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct VipList {
    names: Vec<String>,
}

impl VipList {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.binary_search_by(|entry| entry.as_str().cmp(name.trim())).is_ok()
    }

    pub fn insert(&mut self, name: &str) -> Result<String, ListError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ListError::Empty);
        }
        match self.names.binary_search_by(|entry| entry.as_str().cmp(name)) {
            Ok(_) => Err(ListError::Duplicate(name.to_string())),
            Err(pos) => {
                self.names.insert(pos, name.to_string());
                Ok(name.to_string())
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Result<String, ListError> {
        let name = name.trim();
        match self.names.binary_search_by(|entry| entry.as_str().cmp(name)) {
            Ok(pos) => Ok(self.names.remove(pos)),
            Err(_) => Err(ListError::Missing(name.to_string())),
        }
    }

    /// Names present here but absent from `other`.
    pub fn missing_from(&self, other: &VipList) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| !other.contains(name))
            .cloned()
            .collect()
    }
}

impl From<Vec<String>> for VipList {
    fn from(names: Vec<String>) -> Self {
        Self::from_names(names)
    }
}

impl From<VipList> for Vec<String> {
    fn from(list: VipList) -> Self {
        list.names
    }
}
