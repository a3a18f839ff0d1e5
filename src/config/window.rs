use crate::fit::Size;

/// Window size while no image is loaded.
pub const PLACEHOLDER_SIZE: Size = Size::new(260, 120);

/// Smallest window that fits the context menu or a notice.
pub const MENU_MIN_SIZE: Size = Size::new(220, 150);

/// Fixed size of the settings panel.
pub const SETTINGS_SIZE: Size = Size::new(320, 280);

pub const WINDOW_TITLE: &str = "Oshi Overlay";
