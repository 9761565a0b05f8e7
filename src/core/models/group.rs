use super::user::UserProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Owner,
    Member,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Owner => "OWNER",
            Role::Member => "MEMBER",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupMember {
    pub user: UserProfile,
    pub role: Role,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub creator_id: String,
    pub members: Vec<GroupMember>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: DateTime<Utc>,
}

impl GroupMember {
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }
}

impl Group {
    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m.user.id == user_id)
    }

    pub fn is_creator(&self, user_id: &str) -> bool {
        self.creator_id == user_id
    }

    /// Member ids in the order they joined.
    pub fn member_ids(&self) -> Vec<String> {
        self.members.iter().map(|m| m.user.id.clone()).collect()
    }
}
