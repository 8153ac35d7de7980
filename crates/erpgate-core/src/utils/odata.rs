//! Helpers for building Service Layer (OData) resource paths.

/// Escape a string key for use inside single quotes: `O'Brien` -> `O''Brien`.
pub fn escape_key(key: &str) -> String {
    key.replace('\'', "''")
}

/// Path addressing one entity by its string key, e.g. `Items('A001')`.
pub fn entity_path(entity_set: &str, key: &str) -> String {
    format!("{}('{}')", entity_set, escape_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_key() {
        assert_eq!(escape_key("O'Brien"), "O''Brien");
        assert_eq!(escape_key("C001"), "C001");
        assert_eq!(escape_key("''"), "''''");
        assert_eq!(escape_key(""), "");
    }

    #[test]
    fn test_entity_path() {
        assert_eq!(entity_path("BusinessPartners", "O'Brien"), "BusinessPartners('O''Brien')");
        assert_eq!(entity_path("Items", "A001"), "Items('A001')");
    }
}
