use ratatui::style::{Color, Modifier, Style};

// ── Background colors ──
pub const BG: Color = Color::Rgb(18, 17, 20);
pub const PANEL: Color = Color::Rgb(47, 46, 47);
pub const GUTTER: Color = Color::Rgb(30, 30, 30);
pub const ROW: Color = Color::Rgb(63, 63, 63);
pub const ROW_ACTIVE: Color = Color::Rgb(77, 77, 77);

// ── Text colors ──
pub const TEXT: Color = Color::Rgb(171, 171, 171);
pub const BRIGHT: Color = Color::Rgb(221, 221, 221);
pub const DIM: Color = Color::Rgb(93, 93, 93);

// ── Accent colors ──
pub const GREEN: Color = Color::Rgb(82, 153, 19);
pub const YELLOW: Color = Color::Rgb(207, 173, 16);
pub const RED: Color = Color::Rgb(169, 26, 23);
pub const CYAN: Color = Color::Rgb(34, 211, 238);

// ── Diff colors ──
pub const ADD_BG: Color = Color::Rgb(30, 52, 18);
pub const DEL_BG: Color = Color::Rgb(58, 20, 20);
pub const FILLER_BG: Color = Color::Rgb(24, 23, 26);

// ── Composed styles ──

pub fn default_style() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn panel_style() -> Style {
    Style::default().fg(TEXT).bg(PANEL)
}

pub fn add_style() -> Style {
    Style::default().fg(TEXT).bg(ADD_BG)
}

pub fn del_style() -> Style {
    Style::default().fg(TEXT).bg(DEL_BG)
}

pub fn filler_style() -> Style {
    Style::default().bg(FILLER_BG)
}

pub fn gutter_style() -> Style {
    Style::default().fg(DIM).bg(GUTTER)
}

pub fn separator_style() -> Style {
    Style::default().fg(DIM).bg(ROW)
}

pub fn key_hint_style() -> Style {
    Style::default().fg(BRIGHT).add_modifier(Modifier::BOLD)
}

pub fn status_added() -> Style {
    Style::default().fg(GREEN).add_modifier(Modifier::BOLD)
}

pub fn status_deleted() -> Style {
    Style::default().fg(RED).add_modifier(Modifier::BOLD)
}

pub fn status_modified() -> Style {
    Style::default().fg(YELLOW).add_modifier(Modifier::BOLD)
}
