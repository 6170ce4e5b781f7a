//! Host-embedded-browser capability (port)

use serde_json::Value;

/// Capability exposed by the host messaging app when the session runs inside its embedded
/// browser. Detected once when the session is built.
#[cfg_attr(test, mockall::automock)]
pub trait HostBridge: Send + Sync {
    /// Raw context object, forwarded opaquely.
    fn context(&self) -> Value;

    /// Ask the host to close the embedded view.
    fn close(&self);
}
