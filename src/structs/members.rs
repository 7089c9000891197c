use serde::{Deserialize, Serialize};

/// Roster entry consumed by the rotation engine.
#[derive(Serialize, Deserialize, sqlx::FromRow, Clone, Debug)]
pub struct MemberGroup {
    pub name: String,
    pub group: Option<String>,
}

impl MemberGroup {
    /// Group tags are compared trimmed and lowercased everywhere.
    pub fn canonical_group(&self) -> String {
        self.group.as_deref().unwrap_or("").trim().to_lowercase()
    }
}

#[derive(Serialize, sqlx::FromRow, Debug)]
pub struct Member {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub group: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateGroupRequest {
    pub name: String,
    pub group: String,
}

#[derive(Serialize)]
pub struct UpdateGroupResponse {
    pub success: bool,
    pub member: Member,
}
