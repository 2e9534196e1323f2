//! Platform backend selection.
//!
//! [`Platform::detect`] chooses the backend set exactly once at process
//! start based on the host OS; nothing downstream ever branches on the
//! platform per call. Capabilities without a wired implementation on the
//! host resolve to `Unavailable*` stubs so every tool stays registered and
//! fails with a uniform, explicit error instead of disappearing.

#[cfg(windows)]
mod windows;

use std::sync::Arc;

use crate::apps::{AppsProvider, UnavailableApps};
use crate::clipboard::{ClipboardProvider, UnavailableClipboard};
use crate::elements::{ElementProvider, UnavailableElements};
use crate::keyboard::{KeyboardProvider, UnavailableKeyboard};
use crate::launch::{LaunchProvider, UnavailableLaunch};
use crate::pointer::{PointerProvider, UnavailablePointer};
use crate::scrape::{HttpScraper, ScrapeProvider};
use crate::screen::{ScreenProvider, UnavailableScreen};
use crate::shell::{ShellProvider, SystemShell};
use crate::sysinfo::{SystemInfoProvider, UnavailableSystemInfo};
use crate::window::{UnavailableWindow, WindowProvider};

/// The full capability backend set for one process.
///
/// Cloning is cheap (a handful of `Arc`s); tools hold clones of the
/// providers they need and share the same underlying backends.
#[derive(Clone)]
pub struct Platform {
    pub pointer: Arc<dyn PointerProvider>,
    pub keyboard: Arc<dyn KeyboardProvider>,
    pub clipboard: Arc<dyn ClipboardProvider>,
    pub window: Arc<dyn WindowProvider>,
    pub apps: Arc<dyn AppsProvider>,
    pub elements: Arc<dyn ElementProvider>,
    pub screen: Arc<dyn ScreenProvider>,
    pub system: Arc<dyn SystemInfoProvider>,
    pub launch: Arc<dyn LaunchProvider>,
    pub shell: Arc<dyn ShellProvider>,
    pub scrape: Arc<dyn ScrapeProvider>,
}

impl Platform {
    /// Select backends for the host platform. Called once at startup.
    pub fn detect() -> Self {
        #[cfg(windows)]
        {
            windows::platform()
        }
        #[cfg(not(windows))]
        {
            tracing::warn!(
                os = std::env::consts::OS,
                "no desktop backend wired for this platform, OS-bound capabilities will report unavailable"
            );
            Self::unavailable()
        }
    }

    /// Backend set where every OS-bound capability reports unavailable.
    /// The shell runner and HTTP scraper are portable and always live.
    pub fn unavailable() -> Self {
        Self {
            pointer: Arc::new(UnavailablePointer),
            keyboard: Arc::new(UnavailableKeyboard),
            clipboard: Arc::new(UnavailableClipboard),
            window: Arc::new(UnavailableWindow),
            apps: Arc::new(UnavailableApps),
            elements: Arc::new(UnavailableElements),
            screen: Arc::new(UnavailableScreen),
            system: Arc::new(UnavailableSystemInfo),
            launch: Arc::new(UnavailableLaunch),
            shell: Arc::new(SystemShell),
            scrape: Arc::new(HttpScraper),
        }
    }
}
