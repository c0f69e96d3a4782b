// Color palette for the sorting UI
use ratatui::style::Color;

/// Errors and destructive actions
pub const ACCENT_PRIMARY: Color = Color::Rgb(239, 83, 80);
/// Successful assignments and copies
pub const ACCENT_SECONDARY: Color = Color::Rgb(102, 187, 106);
/// Titles and the typed sequence
pub const ACCENT_HIGHLIGHT: Color = Color::Rgb(79, 195, 247);
/// Folder that just received an image
pub const ACCENT_PING: Color = Color::Rgb(255, 202, 40);

pub const TEXT_PRIMARY: Color = Color::Rgb(224, 224, 224);
pub const TEXT_SECONDARY: Color = Color::Rgb(140, 140, 150);

pub const BG_DARK: Color = Color::Rgb(24, 24, 27);
pub const BG_SELECTED: Color = Color::Rgb(50, 50, 60);
pub const BORDER_COLOR: Color = Color::Rgb(82, 82, 91);
