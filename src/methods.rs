//! The set of remote method names a client knows about.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered, duplicate-free list of remote method names.
///
/// Serializes as a plain JSON array, the same shape `ice-rpc init` writes
/// next to the generated client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct MethodSet {
    names: Vec<String>,
    index: HashSet<String>,
}

impl MethodSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Method set of every interface in `.ice` source.
    pub fn from_idl(source: &str) -> Self {
        crate::idl::extract_method_names(source).into_iter().collect()
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Add `name`, keeping the first position if it is already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.index.contains(&name) {
            return false;
        }
        self.index.insert(name.clone());
        self.names.push(name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    /// JSON array indented with tabs, one name per line.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(Vec::new(), formatter);
        self.names.serialize(&mut serializer)?;
        String::from_utf8(serializer.into_inner()).map_err(|e| {
            serde_json::Error::io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

impl From<Vec<String>> for MethodSet {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<MethodSet> for Vec<String> {
    fn from(set: MethodSet) -> Self {
        set.names
    }
}

impl<S: Into<String>> FromIterator<S> for MethodSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = MethodSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl<'a> IntoIterator for &'a MethodSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_drops_duplicates() {
        let mut set = MethodSet::new();
        assert!(set.insert("Login"));
        assert!(set.insert("AddUser"));
        assert!(!set.insert("Login"));

        assert_eq!(set.len(), 2);
        assert!(set.contains("AddUser"));
        assert!(!set.contains("DeleteUser"));
        assert_eq!(set.iter().collect::<Vec<_>>(), ["Login", "AddUser"]);
    }

    #[test]
    fn test_pretty_json_uses_tabs() {
        let set: MethodSet = ["LicenseCheck", "Login"].into_iter().collect();
        assert_eq!(set.to_json_pretty().unwrap(), "[\n\t\"LicenseCheck\",\n\t\"Login\"\n]");
    }

    #[test]
    fn test_empty_set_json() {
        assert_eq!(MethodSet::new().to_json_pretty().unwrap(), "[]");
        assert!(MethodSet::new().is_empty());
    }

    #[test]
    fn test_load_generated_list() {
        let set = MethodSet::from_json_str("[\n\t\"AddCamera\",\n\t\"UpdateCamera\"\n]").unwrap();
        assert_eq!(set.as_slice(), ["AddCamera", "UpdateCamera"]);
        assert_eq!(
            MethodSet::from_json_str(&set.to_json_pretty().unwrap()).unwrap(),
            set
        );
    }

    #[test]
    fn test_from_idl() {
        let set = MethodSet::from_idl(
            "module business { interface IBusiness { void Login(string s); void Login(string s, int n); }; };",
        );
        assert_eq!(set.as_slice(), ["Login"]);
    }

    #[test]
    fn test_rejects_non_list() {
        assert!(MethodSet::from_json_str(r#"{"Login": true}"#).is_err());
    }
}
