//! ID token claims and the user info derived from them

use serde::{Deserialize, Serialize};

/// Claims the gate reads from an ID token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Sign-in name
    #[serde(default)]
    pub preferred_username: Option<String>,
    /// App roles
    #[serde(default)]
    pub roles: Vec<String>,
    /// Group object ids
    #[serde(default)]
    pub groups: Vec<String>,
}

/// Signed-in user as shown to the application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    /// Display name
    pub name: Option<String>,
    /// Sign-in name
    pub username: Option<String>,
    /// App roles
    pub roles: Vec<String>,
    /// Group object ids
    pub groups: Vec<String>,
}

impl UserInfo {
    /// Name to show: display name, then username, then a generic label
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.username.as_deref().filter(|u| !u.is_empty()))
            .unwrap_or("Authenticated User")
    }
}

impl From<IdTokenClaims> for UserInfo {
    fn from(claims: IdTokenClaims) -> Self {
        Self {
            name: claims.name,
            username: claims.preferred_username,
            roles: claims.roles,
            groups: claims.groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lists_default_to_empty() {
        let claims: IdTokenClaims = serde_json::from_str(r#"{"name": "Ada"}"#).unwrap();
        assert!(claims.groups.is_empty());
        assert!(claims.roles.is_empty());
    }

    #[test]
    fn display_name_falls_back() {
        let mut user = UserInfo {
            name: Some("Ada".into()),
            username: Some("ada@example.com".into()),
            ..UserInfo::default()
        };
        assert_eq!(user.display_name(), "Ada");

        user.name = None;
        assert_eq!(user.display_name(), "ada@example.com");

        user.username = None;
        assert_eq!(user.display_name(), "Authenticated User");
    }
}
