//! Shopfront palette and semantic styling for the console.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const AMBER: Color = Color::Rgb(250, 179, 135); // #fab387
pub const MINT: Color = Color::Rgb(166, 227, 161); // #a6e3a1
pub const SKY: Color = Color::Rgb(137, 220, 235); // #89dceb
pub const ROSE: Color = Color::Rgb(243, 139, 168); // #f38ba8
pub const GOLD: Color = Color::Rgb(249, 226, 175); // #f9e2af

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(205, 214, 244); // #cdd6f4
pub const BORDER_GRAY: Color = Color::Rgb(108, 112, 134); // #6c7086
pub const BG_HIGHLIGHT: Color = Color::Rgb(49, 50, 68); // #313244
pub const BG_DARK: Color = Color::Rgb(24, 24, 37); // #181825

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(AMBER)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Table header row.
pub fn table_header() -> Style {
    Style::default()
        .fg(SKY)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Normal table row text.
pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Selected / highlighted table row.
pub fn table_selected() -> Style {
    Style::default()
        .fg(AMBER)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(SKY).add_modifier(Modifier::BOLD)
}
