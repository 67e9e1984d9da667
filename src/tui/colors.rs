//! Color constants for the terminal user interface.

use ratatui::style::Color;

// Priority accents match the web client's badge colours.

/// Used for urgent tasks
pub const URGENT_RED: Color = Color::Rgb(190, 30, 30);
/// Used for high priority
pub const HIGH_ORANGE: Color = Color::Rgb(210, 120, 0);
/// Used for medium priority
pub const MEDIUM_GOLD: Color = Color::Rgb(255, 215, 0);
/// Used for low priority
pub const LOW_SLATE: Color = Color::Rgb(110, 120, 140);
/// Accent for pinned rows and the header bar
pub const PIN_TEAL: Color = Color::Rgb(0, 140, 140);
