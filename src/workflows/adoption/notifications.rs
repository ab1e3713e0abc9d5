use serde::Serialize;

/// Status-change message requested by the workflow. Delivery is
/// fire-and-forget; the workflow never depends on it succeeding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusNotification {
    pub recipient_email: String,
    pub recipient_name: String,
    pub status_label: &'static str,
}

/// Outbound delivery hook (e.g., an e-mail adapter). Called only after the
/// triggering transition has committed.
pub trait NotificationDispatcher: Send + Sync {
    fn notify_status_change(&self, notification: StatusNotification) -> Result<(), DispatchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
