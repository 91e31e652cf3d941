use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub profile_img: Option<String>,
    pub following: Vec<Uuid>,
    pub followers: Vec<Uuid>,
    pub liked_posts: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, username: String, hashed_password: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            hashed_password,
            profile_img: None,
            following: Vec::new(),
            followers: Vec::new(),
            liked_posts: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
