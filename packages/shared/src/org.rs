//! Organizations, their members, and the jobs they post.

use serde::{Deserialize, Serialize};

/// Which workspace the UI is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Personal,
    Organization,
}

/// Role a member holds inside one organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrgRole {
    #[serde(rename = "ROLE_ORG_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_ORG_HR")]
    Hr,
    #[serde(rename = "ROLE_ORG_INTERVIEWER")]
    Interviewer,
}

impl OrgRole {
    /// Human-readable label shown in member lists.
    pub fn label(&self) -> &'static str {
        match self {
            OrgRole::Admin => "Admin",
            OrgRole::Hr => "HR",
            OrgRole::Interviewer => "Interviewer",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub user_id: String,
    pub email: String,
    pub roles: Vec<OrgRole>,
}

impl Member {
    pub fn has_role(&self, role: OrgRole) -> bool {
        self.roles.contains(&role)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Org {
    pub id: String,
    pub name: String,
    pub created_by: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Org {
    pub fn member(&self, user_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.user_id == user_id)
    }
}

/// A job posting. Timestamps are kept as the backend's ISO strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub description: String,
    pub organization_id: String,
    pub created_by: String,
    pub updated_by: String,
    pub updated_at: String,
    pub created_at: String,
    pub active: bool,
}
