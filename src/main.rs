//! Oshi Overlay
//!
//! Shows an image or animated GIF in a borderless, always-on-top window.
//! Right-click for the menu, drag with the left button to move it.

use iced::window;
use tracing_subscriber::EnvFilter;

mod app;
mod bounds;
mod config;
mod fit;
mod media;
mod picker;
mod screen;
mod view;

use app::App;
use config::ConfigStore;
use config::window::{PLACEHOLDER_SIZE, WINDOW_TITLE};

pub fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("oshi_overlay=info")),
        )
        .init();

    // Ceiling for the max width/height settings
    let screen = screen::ScreenInfo::detect();
    let store = ConfigStore::default();
    tracing::info!("Settings file: {:?}", store.path());

    // The window starts at the placeholder size and is resized to the image
    // as soon as it opens.
    iced::application(move || App::new(store.clone(), screen), App::update, App::view)
        .title(WINDOW_TITLE)
        .subscription(App::subscription)
        .style(App::style)
        .window(window::Settings {
            size: PLACEHOLDER_SIZE.into(),
            resizable: false,
            decorations: false,
            transparent: true,
            level: window::Level::AlwaysOnTop,
            exit_on_close_request: false,
            platform_specific: platform_specific(),
            ..Default::default()
        })
        .run()
}

/// Keeps the overlay out of the taskbar where the platform allows it. Linux
/// has no such flag; the application id lets compositor rules match it.
#[cfg(target_os = "windows")]
fn platform_specific() -> window::settings::PlatformSpecific {
    window::settings::PlatformSpecific {
        skip_taskbar: true,
        ..Default::default()
    }
}

#[cfg(any(target_os = "linux", target_os = "freebsd", target_os = "openbsd"))]
fn platform_specific() -> window::settings::PlatformSpecific {
    window::settings::PlatformSpecific {
        application_id: env!("CARGO_PKG_NAME").to_owned(),
        ..Default::default()
    }
}

#[cfg(not(any(
    target_os = "windows",
    target_os = "linux",
    target_os = "freebsd",
    target_os = "openbsd"
)))]
fn platform_specific() -> window::settings::PlatformSpecific {
    window::settings::PlatformSpecific::default()
}
