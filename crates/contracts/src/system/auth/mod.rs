use serde::{Deserialize, Serialize};

/// Level in the institution hierarchy a user account is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Authority,
    University,
    College,
    Department,
}

impl Role {
    /// Indicator responses and their evidence belong to the department
    /// that runs the program; every other role reads them only.
    pub fn can_edit_responses(&self) -> bool {
        matches!(self, Role::Department)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Authority => "authority",
            Role::University => "university",
            Role::College => "college",
            Role::Department => "department",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: Role,
    /// Entity the account is scoped to (university, college or department id)
    #[serde(default)]
    pub entity_id: Option<i64>,
}

impl UserInfo {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_department_edits_responses() {
        assert!(Role::Department.can_edit_responses());
        for role in [Role::Admin, Role::Authority, Role::University, Role::College] {
            assert!(!role.can_edit_responses(), "{} must be read-only", role.as_str());
        }
    }

    #[test]
    fn test_user_info_deserializes_lowercase_role() {
        let user: UserInfo =
            serde_json::from_str(r#"{"id":3,"username":"cs-dept","role":"department"}"#).unwrap();
        assert_eq!(user.role, Role::Department);
        assert_eq!(user.display_name(), "cs-dept");
    }
}
