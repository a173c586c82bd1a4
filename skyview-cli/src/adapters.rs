use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use inquire::{Confirm, InquireError};
use skyview_core::{Coordinates, Geolocator, LocationError, NotificationPermission, Notifier};

/// Notifications printed to stderr with a terminal bell.
#[derive(Debug)]
pub struct TerminalNotifier {
    granted: AtomicBool,
}

impl TerminalNotifier {
    pub fn new(granted: bool) -> Self {
        Self {
            granted: AtomicBool::new(granted),
        }
    }
}

#[async_trait]
impl Notifier for TerminalNotifier {
    fn permission(&self) -> NotificationPermission {
        if self.granted.load(Ordering::Relaxed) {
            NotificationPermission::Granted
        } else {
            NotificationPermission::Default
        }
    }

    async fn request_permission(&self) -> NotificationPermission {
        let answer = tokio::task::spawn_blocking(|| {
            Confirm::new("Allow skyview to show weather notifications?")
                .with_default(true)
                .prompt()
        })
        .await;

        let permission = match answer {
            Ok(Ok(true)) => NotificationPermission::Granted,
            Ok(Ok(false)) => NotificationPermission::Denied,
            Ok(Err(InquireError::NotTTY)) => NotificationPermission::Unsupported,
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "notification prompt aborted");
                NotificationPermission::Denied
            }
            Err(err) => {
                tracing::warn!(error = %err, "notification prompt failed");
                NotificationPermission::Denied
            }
        };

        self.granted
            .store(permission == NotificationPermission::Granted, Ordering::Relaxed);
        permission
    }

    fn notify(&self, title: &str, body: &str) -> anyhow::Result<()> {
        eprintln!("\x07[{title}] {body}");
        Ok(())
    }
}

/// Stands in for device location using the configured home coordinates.
#[derive(Debug)]
pub struct HomeGeolocator {
    home: Option<Coordinates>,
}

impl HomeGeolocator {
    pub fn new(home: Option<Coordinates>) -> Self {
        Self { home }
    }
}

#[async_trait]
impl Geolocator for HomeGeolocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        self.home.ok_or(LocationError::Unavailable)
    }
}
