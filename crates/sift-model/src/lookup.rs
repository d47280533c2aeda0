use std::collections::HashMap;

use crate::error::{Result, SiftError};

/// Case-insensitive column-name resolver.
///
/// Pipeline configs refer to columns in whatever casing their author used;
/// resolution recalls the exact header the table carries. When two headers
/// differ only by case, the first one wins.
#[derive(Debug, Clone)]
pub struct CaseInsensitiveSet {
    map: HashMap<String, String>,
}

impl CaseInsensitiveSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = HashMap::new();
        for name in names {
            let name = name.as_ref();
            let key = name.to_ascii_uppercase();
            map.entry(key).or_insert_with(|| name.to_string());
        }
        Self { map }
    }

    /// Add a name, keeping the existing spelling if one is already
    /// present under the same casing.
    pub fn insert(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.map.entry(name.to_ascii_uppercase()).or_insert(name);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map
            .get(&name.to_ascii_uppercase())
            .map(|value| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&name.to_ascii_uppercase())
    }

    /// Resolve a config reference to the exact column name, failing with
    /// [`SiftError::ColumnNotFound`] when the table has no such column.
    pub fn resolve(&self, name: &str) -> Result<String> {
        self.get(name)
            .map(str::to_string)
            .ok_or_else(|| SiftError::ColumnNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recalls_original_casing() {
        let set = CaseInsensitiveSet::new(["City_Development_Index", "experience"]);
        assert_eq!(set.get("city_development_index"), Some("City_Development_Index"));
        assert!(set.contains("EXPERIENCE"));
        assert_eq!(set.get("missing"), None);
    }

    #[test]
    fn resolve_reports_the_requested_name() {
        let set = CaseInsensitiveSet::new(["a"]);
        let err = set.resolve("enrollee_id").unwrap_err();
        assert!(matches!(err, SiftError::ColumnNotFound(name) if name == "enrollee_id"));
    }

    #[test]
    fn first_spelling_wins_on_case_collision() {
        let set = CaseInsensitiveSet::new(["GPA", "gpa"]);
        assert_eq!(set.get("Gpa"), Some("GPA"));
    }

    #[test]
    fn insert_keeps_the_first_spelling() {
        let mut set = CaseInsensitiveSet::new(["bmi"]);
        set.insert("chol_norm");
        set.insert("BMI");
        assert!(set.contains("CHOL_NORM"));
        assert_eq!(set.get("Bmi"), Some("bmi"));
    }
}
