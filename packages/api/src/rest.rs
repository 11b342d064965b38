//! PostgREST addressing: table paths, filters and preference headers.

/// Tables the client reads and writes under `/rest/v1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Table {
    UserProfiles,
    Services,
    Categories,
}

impl Table {
    pub fn path(self) -> &'static str {
        match self {
            Table::UserProfiles => "rest/v1/user_profiles",
            Table::Services => "rest/v1/services",
            Table::Categories => "rest/v1/categories",
        }
    }
}

/// `Prefer` header asking PostgREST to echo the written rows.
pub(crate) const RETURN_REPRESENTATION: &str = "return=representation";

/// Columns read for categories.
pub(crate) const CATEGORY_COLUMNS: &str = "id,name,icon,description";

/// Equality filter value, e.g. `eq.abc`.
pub(crate) fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// Query selecting the single profile row of `user_id`.
pub(crate) fn profile_query(user_id: &str) -> [(&'static str, String); 3] {
    [
        ("user_id", eq(user_id)),
        ("select", "*".to_string()),
        ("limit", "1".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_query() {
        let query = profile_query("u-1");
        assert_eq!(query[0], ("user_id", "eq.u-1".to_string()));
        assert_eq!(query[2], ("limit", "1".to_string()));
    }

    #[test]
    fn test_table_paths() {
        assert_eq!(Table::Services.path(), "rest/v1/services");
        assert_eq!(Table::UserProfiles.path(), "rest/v1/user_profiles");
    }
}
