use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Owner of the post.
    pub user: Uuid,
    pub text: Option<String>,
    pub img: Option<String>,
    pub likes: Vec<Uuid>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(user: Uuid, text: Option<String>, img: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            text,
            img,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_liked_by(&self, user_id: &Uuid) -> bool {
        self.likes.contains(user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(text: String, user: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            user,
            created_at: Utc::now(),
        }
    }
}
