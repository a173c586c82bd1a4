//! Side-effect capabilities injected into the orchestrator.
//!
//! Notifications and geolocation are owned by the host platform; the core only
//! talks to them through these traits.

use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    /// Not asked yet.
    Default,
    Granted,
    Denied,
    /// The platform cannot show notifications at all.
    Unsupported,
}

#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Current permission state. Queried, never forced.
    fn permission(&self) -> NotificationPermission;

    /// Ask the user for permission.
    async fn request_permission(&self) -> NotificationPermission;

    /// Show a notification. Fire-and-forget; callers do not retry.
    fn notify(&self, title: &str, body: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location access denied. Please search manually.")]
    PermissionDenied,
    #[error("Location is unavailable. Please search manually.")]
    Unavailable,
    #[error("Location request timed out. Please search manually.")]
    Timeout,
}

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    /// Resolve the device position once.
    async fn locate(&self) -> Result<Coordinates, LocationError>;
}
