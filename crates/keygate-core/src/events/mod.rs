//! Notification events - tags attached to outbound user notifications

mod notification;

pub use notification::NotificationEvent;
