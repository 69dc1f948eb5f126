pub mod bus;

pub use bus::{Notification, NotificationHandle, Notifier, Severity};
