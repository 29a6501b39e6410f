use ratatui::style::Color;

// Keep the palette small; add roles here instead of sprinkling colors through the UI.
pub const FG: Color = Color::Rgb(229, 231, 235);
pub const MUTED: Color = Color::Rgb(156, 163, 175);
pub const DIM: Color = Color::Rgb(107, 114, 128);
pub const BORDER: Color = Color::Rgb(55, 65, 81);

pub const ACCENT: Color = Color::Rgb(255, 159, 26);
pub const ACCENT_BG: Color = Color::Rgb(44, 32, 16);

pub const SUCCESS: Color = Color::Rgb(134, 239, 172); // branch names, "Removed"
pub const ERROR: Color = Color::Rgb(248, 113, 113); // skip-permissions badge, removal errors
