use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default auto-dismiss delay when the config does not override it.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5_000);

/// Severity of a user-facing notification, determining its visual style.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// A transient, user-facing status message.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
    pub auto_dismiss_after: Option<Duration>,
}

struct NotifierInner {
    notifications: Mutex<Vec<Notification>>,
    next_id: AtomicU64,
    default_duration: Duration,
}

/// Collects short-lived messages for the UI. Cheap to clone; all clones
/// share the same ordered collection. Owned by the application root and
/// injected into consumers rather than living in a module-level global.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

/// Returned by `notify`; exposes the allocated id and manual dismissal.
pub struct NotificationHandle {
    id: u64,
    notifier: Notifier,
}

impl NotificationHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Manually dismiss this notification. A no-op if it already expired.
    pub fn dismiss(&self) {
        self.notifier.dismiss(self.id);
    }
}

impl Notifier {
    /// A zero `default_duration` disables auto-dismissal.
    pub fn new(default_duration: Duration) -> Self {
        Notifier {
            inner: Arc::new(NotifierInner {
                notifications: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
                default_duration,
            }),
        }
    }

    /// Append a notification with the default auto-dismiss duration.
    pub fn notify(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> NotificationHandle {
        let duration = self.inner.default_duration;
        self.notify_after(title, description, severity, Some(duration))
    }

    /// Append a notification; `auto_dismiss_after` of None (or zero) keeps it
    /// until manually dismissed. Ids are unique and strictly increasing for
    /// the process lifetime.
    pub fn notify_after(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        auto_dismiss_after: Option<Duration>,
    ) -> NotificationHandle {
        let auto_dismiss_after = auto_dismiss_after.filter(|d| !d.is_zero());
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            title: title.into(),
            description: description.into(),
            severity,
            created_at: Utc::now(),
            auto_dismiss_after,
        };

        {
            let mut notifications = self
                .inner
                .notifications
                .lock()
                .expect("notification list poisoned");
            notifications.push(notification);
        }

        if let Some(duration) = auto_dismiss_after {
            let bus = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                bus.dismiss(id);
            });
        }

        NotificationHandle {
            id,
            notifier: self.clone(),
        }
    }

    /// Remove the notification with `id`. A no-op when it is already gone,
    /// so a manual dismiss racing the scheduled expiry is harmless.
    pub fn dismiss(&self, id: u64) {
        let mut notifications = self
            .inner
            .notifications
            .lock()
            .expect("notification list poisoned");
        if let Some(index) = notifications.iter().position(|n| n.id == id) {
            notifications.remove(index);
            debug!("Dismissed notification {}", id);
        }
    }

    /// Snapshot of the active notifications in insertion order.
    pub fn active(&self) -> Vec<Notification> {
        self.inner
            .notifications
            .lock()
            .expect("notification list poisoned")
            .clone()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}
