//! Port interfaces for reminder dispatch.

use async_trait::async_trait;

use agenda_domain::{OwnerId, Result};

/// Messaging capability used to deliver reminders.
///
/// Injected by the hosting application; the reminder engine never constructs
/// or owns the transport. Implementations must not block indefinitely - each
/// tick runs under a timeout.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, owner: OwnerId, text: &str) -> Result<()>;
}
