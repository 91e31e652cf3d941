use crate::{
    dto::{CommentResponse, NotificationResponse, PostResponse, UserResponse, UserSummary},
    errors::ApiError,
    media::MediaStore,
    models::{Comment, Notification, NotificationType, Post, User},
};
use dashmap::{DashMap, mapref::entry::Entry};
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

// ============================================================================
// APPLICATION STATE - Shared data across all requests
// ============================================================================
/// Every collection is a `DashMap`, so single-document updates are atomic per
/// entry. Operations touching several documents hold entry guards in a fixed
/// order: posts -> users -> notifications. No guard is ever held across an
/// `.await`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<DashMap<Uuid, User>>,
    pub posts: Arc<DashMap<Uuid, Post>>,
    pub notifications: Arc<DashMap<Uuid, Notification>>,
    pub email_index: Arc<DashMap<String, Uuid>>, // Quick Lookup by Email
    pub username_index: Arc<DashMap<String, Uuid>>,
    pub media: Arc<dyn MediaStore>,
    pub jwt_secret: String,
    // Follow toggles touch two entries of `users`, which may share a shard.
    follow_gate: Arc<Mutex<()>>,
}

/// Field changes applied by `AppState::update_user`. `None` leaves a field as is.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub hashed_password: Option<String>,
    pub profile_img: Option<String>,
}

impl AppState {
    pub fn new(jwt_secret: impl Into<String>, media: Arc<dyn MediaStore>) -> Self {
        Self {
            users: Arc::new(DashMap::new()),
            posts: Arc::new(DashMap::new()),
            notifications: Arc::new(DashMap::new()),
            email_index: Arc::new(DashMap::new()),
            username_index: Arc::new(DashMap::new()),
            media,
            jwt_secret: jwt_secret.into(),
            follow_gate: Arc::new(Mutex::new(())),
        }
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    /// Stores a new user, rejecting a taken email or username.
    pub fn register_user(&self, user: User) -> Result<(), ApiError> {
        match self.email_index.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(ApiError::UserAlreadyExists),
            Entry::Vacant(email_slot) => {
                match self.username_index.entry(user.username.clone()) {
                    Entry::Occupied(_) => return Err(ApiError::UserAlreadyExists),
                    Entry::Vacant(name_slot) => {
                        name_slot.insert(user.id);
                    }
                }
                email_slot.insert(user.id);
            }
        }

        self.users.insert(user.id, user);
        Ok(())
    }

    pub fn user(&self, id: &Uuid) -> Result<User, ApiError> {
        self.users
            .get(id)
            .map(|user| user.clone())
            .ok_or(ApiError::NotFound("User not found"))
    }

    pub fn user_by_username(&self, username: &str) -> Result<User, ApiError> {
        let id = self
            .username_index
            .get(username)
            .map(|id| *id)
            .ok_or(ApiError::NotFound("User not found"))?;

        self.user(&id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let id = self.email_index.get(email).map(|id| *id)?;
        self.users.get(&id).map(|user| user.clone())
    }

    /// Applies profile changes, moving the username/email index entries when
    /// those change.
    pub fn update_user(&self, user_id: Uuid, changes: UserChanges) -> Result<User, ApiError> {
        let current = self.user(&user_id)?;

        let new_email = changes.email.filter(|email| *email != current.email);
        let new_username = changes
            .username
            .filter(|username| *username != current.username);

        if let Some(email) = &new_email {
            claim_index(&self.email_index, email, user_id)?;
        }
        if let Some(username) = &new_username {
            if let Err(e) = claim_index(&self.username_index, username, user_id) {
                if let Some(email) = &new_email {
                    self.email_index.remove(email);
                }
                return Err(e);
            }
        }

        let updated = {
            let mut user = self
                .users
                .get_mut(&user_id)
                .ok_or(ApiError::NotFound("User not found"))?;

            if let Some(email) = new_email {
                self.email_index.remove(&user.email);
                user.email = email;
            }
            if let Some(username) = new_username {
                self.username_index.remove(&user.username);
                user.username = username;
            }
            if let Some(hashed_password) = changes.hashed_password {
                user.hashed_password = hashed_password;
            }
            if let Some(profile_img) = changes.profile_img {
                user.profile_img = Some(profile_img);
            }
            user.clone()
        };

        info!("User updated: {}", user_id);

        Ok(updated)
    }

    /// Follows `target_id` if not already followed, otherwise unfollows.
    /// Returns `true` when the call left the follow in place.
    pub fn toggle_follow(&self, follower_id: Uuid, target_id: Uuid) -> Result<bool, ApiError> {
        if follower_id == target_id {
            return Err(ApiError::BadRequest("You can't follow/unfollow yourself"));
        }

        let _gate = self
            .follow_gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if !self.users.contains_key(&target_id) {
            return Err(ApiError::NotFound("User not found"));
        }

        let now_following = {
            let mut follower = self
                .users
                .get_mut(&follower_id)
                .ok_or(ApiError::NotFound("User not found"))?;

            if follower.following.contains(&target_id) {
                follower.following.retain(|id| *id != target_id);
                false
            } else {
                follower.following.push(target_id);
                true
            }
        };

        if let Some(mut target) = self.users.get_mut(&target_id) {
            if now_following {
                target.followers.push(follower_id);
            } else {
                target.followers.retain(|id| *id != follower_id);
            }
        }

        if now_following {
            let notification = Notification::new(follower_id, target_id, NotificationType::Follow);
            self.notifications.insert(notification.id, notification);
        }

        info!(
            "User {} {} {}",
            follower_id,
            if now_following { "followed" } else { "unfollowed" },
            target_id
        );

        Ok(now_following)
    }

    // ------------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------------

    pub fn post(&self, id: &Uuid) -> Result<Post, ApiError> {
        self.posts
            .get(id)
            .map(|post| post.clone())
            .ok_or(ApiError::NotFound("Post not found"))
    }

    /// Posts matching `filter`, newest first.
    pub fn posts_where<F>(&self, filter: F) -> Vec<Post>
    where
        F: Fn(&Post) -> bool,
    {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        // Sort by creation date (newest first)
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    /// Likes the post for `user_id`, or removes the like if it is already
    /// there, and returns the resulting like list.
    ///
    /// The post entry stays locked while the user's `liked_posts` is updated,
    /// so the two lists always change together. Only a new like produces a
    /// notification for the post owner.
    pub fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Vec<Uuid>, ApiError> {
        let mut post = self
            .posts
            .get_mut(&post_id)
            .ok_or(ApiError::NotFound("Post not found"))?;

        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or(ApiError::NotFound("User not found"))?;

        let liked = if post.is_liked_by(&user_id) {
            post.likes.retain(|id| *id != user_id);
            user.liked_posts.retain(|id| *id != post_id);
            false
        } else {
            post.likes.push(user_id);
            user.liked_posts.push(post_id);
            let notification = Notification::new(user_id, post.user, NotificationType::Like);
            self.notifications.insert(notification.id, notification);
            true
        };
        drop(user);

        info!(
            "Post {} {} by user {}",
            post_id,
            if liked { "liked" } else { "unliked" },
            user_id
        );

        Ok(post.likes.clone())
    }

    pub fn add_comment(&self, post_id: Uuid, comment: Comment) -> Result<Post, ApiError> {
        let mut post = self
            .posts
            .get_mut(&post_id)
            .ok_or(ApiError::NotFound("Post not found"))?;

        post.comments.push(comment);
        Ok(post.clone())
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    /// Notifications addressed to `user_id`, newest first.
    pub fn notifications_for(&self, user_id: Uuid) -> Vec<Notification> {
        let mut notifications: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|entry| entry.to == user_id)
            .map(|entry| entry.value().clone())
            .collect();

        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications
    }

    /// Returns how many notifications flipped from unread to read.
    pub fn mark_notifications_read(&self, user_id: Uuid) -> usize {
        let mut updated = 0;
        for mut entry in self.notifications.iter_mut() {
            if entry.to == user_id && !entry.read {
                entry.read = true;
                updated += 1;
            }
        }
        updated
    }

    /// Returns how many notifications were removed.
    pub fn delete_notifications_for(&self, user_id: Uuid) -> usize {
        let mut removed = 0;
        self.notifications.retain(|_, notification| {
            let keep = notification.to != user_id;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    // ------------------------------------------------------------------------
    // Population: resolve references into response projections
    // ------------------------------------------------------------------------

    fn public_user(&self, id: &Uuid) -> Option<UserResponse> {
        self.users.get(id).map(|user| user.clone().into())
    }

    pub fn populate_post(&self, post: Post) -> PostResponse {
        let user = self.public_user(&post.user);
        let comments = post
            .comments
            .into_iter()
            .map(|comment| CommentResponse {
                id: comment.id,
                text: comment.text,
                user: self.public_user(&comment.user),
                created_at: comment.created_at,
            })
            .collect();

        PostResponse {
            id: post.id,
            user,
            text: post.text,
            img: post.img,
            likes: post.likes,
            comments,
            created_at: post.created_at,
        }
    }

    pub fn populate_posts(&self, posts: Vec<Post>) -> Vec<PostResponse> {
        posts
            .into_iter()
            .map(|post| self.populate_post(post))
            .collect()
    }

    pub fn populate_notification(&self, notification: Notification) -> NotificationResponse {
        let from = self.users.get(&notification.from).map(|user| UserSummary {
            id: user.id,
            username: user.username.clone(),
            profile_img: user.profile_img.clone(),
        });

        NotificationResponse {
            id: notification.id,
            from,
            to: notification.to,
            kind: notification.kind,
            read: notification.read,
            created_at: notification.created_at,
        }
    }
}

/// Points `key` at `user_id` unless another user already owns it.
fn claim_index(index: &DashMap<String, Uuid>, key: &str, user_id: Uuid) -> Result<(), ApiError> {
    match index.entry(key.to_string()) {
        Entry::Occupied(slot) if *slot.get() != user_id => Err(ApiError::UserAlreadyExists),
        Entry::Occupied(_) => Ok(()),
        Entry::Vacant(slot) => {
            slot.insert(user_id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::InMemoryMediaStore;

    fn state() -> AppState {
        AppState::new("test-secret", Arc::new(InMemoryMediaStore::new("http://media")))
    }

    fn user(state: &AppState, name: &str) -> Uuid {
        let user = User::new(format!("{name}@example.com"), name.to_string(), "x".into());
        let id = user.id;
        state.register_user(user).unwrap();
        id
    }

    fn post_by(state: &AppState, owner: Uuid) -> Uuid {
        let post = Post::new(owner, Some("hello".into()), None);
        let id = post.id;
        state.posts.insert(id, post);
        id
    }

    #[test]
    fn like_then_unlike_keeps_both_lists_in_step() {
        let state = state();
        let owner = user(&state, "owner");
        let fan = user(&state, "fan");
        let post_id = post_by(&state, owner);

        let likes = state.toggle_like(post_id, fan).unwrap();
        assert_eq!(likes, vec![fan]);
        assert_eq!(state.user(&fan).unwrap().liked_posts, vec![post_id]);
        assert_eq!(state.notifications.len(), 1);

        let likes = state.toggle_like(post_id, fan).unwrap();
        assert!(likes.is_empty());
        assert!(state.user(&fan).unwrap().liked_posts.is_empty());
        assert!(state.post(&post_id).unwrap().likes.is_empty());
        assert_eq!(state.notifications.len(), 1);
    }

    #[test]
    fn like_notification_goes_to_post_owner() {
        let state = state();
        let owner = user(&state, "owner");
        let fan = user(&state, "fan");
        let post_id = post_by(&state, owner);

        state.toggle_like(post_id, fan).unwrap();

        let notifications = state.notifications_for(owner);
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].from, fan);
        assert_eq!(notifications[0].kind, NotificationType::Like);
        assert!(!notifications[0].read);
    }

    #[test]
    fn liking_missing_post_is_not_found() {
        let state = state();
        let fan = user(&state, "fan");

        let err = state.toggle_like(Uuid::new_v4(), fan).unwrap_err();
        assert!(matches!(err, ApiError::NotFound("Post not found")));
        assert!(state.notifications.is_empty());
    }

    #[test]
    fn liking_as_missing_user_changes_nothing() {
        let state = state();
        let owner = user(&state, "owner");
        let ghost = user(&state, "ghost");
        let post_id = post_by(&state, owner);
        state.users.remove(&ghost);

        let err = state.toggle_like(post_id, ghost).unwrap_err();
        assert!(matches!(err, ApiError::NotFound("User not found")));
        assert!(state.post(&post_id).unwrap().likes.is_empty());
        assert!(state.notifications.is_empty());
    }

    #[test]
    fn bulk_delete_counts_only_recipients_notifications() {
        let state = state();
        let a = user(&state, "alice");
        let b = user(&state, "bob");
        let c = user(&state, "carol");
        state.toggle_follow(a, b).unwrap();
        state.toggle_follow(c, b).unwrap();
        state.toggle_follow(a, c).unwrap();

        assert_eq!(state.delete_notifications_for(b), 2);
        assert_eq!(state.delete_notifications_for(b), 0);
        assert_eq!(state.notifications_for(c).len(), 1);
    }

    #[test]
    fn concurrent_toggles_leave_consistent_lists() {
        let state = state();
        let owner = user(&state, "owner");
        let post_id = post_by(&state, owner);
        let fans: Vec<Uuid> = (0..8).map(|i| user(&state, &format!("fan{i}"))).collect();

        std::thread::scope(|scope| {
            for fan in &fans {
                let state = &state;
                scope.spawn(move || {
                    // Odd number of toggles: every fan ends up liking the post.
                    for _ in 0..5 {
                        state.toggle_like(post_id, *fan).unwrap();
                    }
                });
            }
        });

        let post = state.post(&post_id).unwrap();
        assert_eq!(post.likes.len(), fans.len());
        for fan in &fans {
            assert!(post.is_liked_by(fan));
            assert_eq!(state.user(fan).unwrap().liked_posts, vec![post_id]);
        }
    }

    #[test]
    fn duplicate_username_is_rejected_and_email_released() {
        let state = state();
        user(&state, "taken");

        let clash = User::new("other@example.com".into(), "taken".into(), "x".into());
        assert!(matches!(
            state.register_user(clash),
            Err(ApiError::UserAlreadyExists)
        ));
        assert!(state.user_by_email("other@example.com").is_none());
        assert!(!state.email_index.contains_key("other@example.com"));
    }

    #[test]
    fn update_user_moves_index_entries() {
        let state = state();
        let id = user(&state, "before");

        let updated = state
            .update_user(
                id,
                UserChanges {
                    username: Some("after".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.username, "after");
        assert!(state.user_by_username("before").is_err());
        assert_eq!(state.user_by_username("after").unwrap().id, id);
    }

    #[test]
    fn follow_toggle_updates_both_sides_and_notifies_once() {
        let state = state();
        let a = user(&state, "alice");
        let b = user(&state, "bob");

        assert!(state.toggle_follow(a, b).unwrap());
        assert_eq!(state.user(&a).unwrap().following, vec![b]);
        assert_eq!(state.user(&b).unwrap().followers, vec![a]);

        assert!(!state.toggle_follow(a, b).unwrap());
        assert!(state.user(&a).unwrap().following.is_empty());
        assert!(state.user(&b).unwrap().followers.is_empty());

        let notifications = state.notifications_for(b);
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationType::Follow);
    }

    #[test]
    fn mark_read_only_touches_recipient() {
        let state = state();
        let a = user(&state, "alice");
        let b = user(&state, "bob");
        let c = user(&state, "carol");
        state.toggle_follow(a, b).unwrap();
        state.toggle_follow(a, c).unwrap();

        assert_eq!(state.mark_notifications_read(b), 1);
        assert_eq!(state.mark_notifications_read(b), 0);
        assert!(state.notifications_for(b)[0].read);
        assert!(!state.notifications_for(c)[0].read);
    }
}
