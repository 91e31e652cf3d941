mod notification;
mod post;
mod user;

pub use notification::{Notification, NotificationType};
pub use post::{Comment, Post};
pub use user::User;
