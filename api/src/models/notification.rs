use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Like,
    Follow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub from: Uuid,
    pub to: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(from: Uuid, to: Uuid, kind: NotificationType) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            kind,
            read: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_notification_is_unread_and_tagged() {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let notification = Notification::new(from, to, NotificationType::Like);

        assert!(!notification.read);

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["type"], "like");
        assert_eq!(json["read"], false);
        assert_eq!(json["from"], from.to_string());
    }
}
