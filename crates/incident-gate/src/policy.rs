//! Authorization decision

use crate::claims::UserInfo;
use incident_core::AccessPolicyConfig;
use std::fmt;

/// What a signed-in user must carry to be authorized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Membership in a group (`groups` claim)
    Group(String),
    /// Assignment of an app role (`roles` claim)
    AppRole(String),
}

impl AccessPolicy {
    /// Group policy unless app roles are explicitly enabled
    #[must_use]
    pub fn from_config(config: &AccessPolicyConfig) -> Self {
        if config.use_app_roles {
            Self::AppRole(config.required_app_role.clone())
        } else {
            Self::Group(config.required_group_id.clone())
        }
    }

    /// Exact-match membership check. An empty requirement authorizes no one.
    #[must_use]
    pub fn authorizes(&self, user: &UserInfo) -> bool {
        match self {
            Self::Group(group) => !group.is_empty() && user.groups.iter().any(|g| g == group),
            Self::AppRole(role) => !role.is_empty() && user.roles.iter().any(|r| r == role),
        }
    }

    /// Required identifier
    #[must_use]
    pub fn requirement(&self) -> &str {
        match self {
            Self::Group(id) | Self::AppRole(id) => id,
        }
    }
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(id) => write!(f, "Required Group ID: {id}"),
            Self::AppRole(role) => write!(f, "Required App Role: {role}"),
        }
    }
}
