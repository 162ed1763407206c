use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::styles;
use crate::app::{App, InputMode, Mode};

/// Top bar: stash notice on the left, repo and branch centered
pub fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let Some(repo) = app.repo.as_ref() else {
        return;
    };

    let center = Line::from(vec![
        Span::styled("⌂ ", Style::default().fg(styles::CYAN)),
        Span::styled(repo.name.clone(), Style::default().fg(styles::BRIGHT)),
        Span::styled("    ⎇ ", Style::default().fg(styles::CYAN)),
        Span::styled(repo.current_branch.clone(), Style::default().fg(styles::BRIGHT)),
    ])
    .alignment(Alignment::Center);
    f.render_widget(Paragraph::new(center).style(styles::panel_style()), area);

    if repo.branch_stash().is_some() {
        let stash = Line::from(vec![
            Span::styled(" ≡ ", Style::default().fg(styles::YELLOW)),
            Span::styled("Stashed changes exist", Style::default().fg(styles::TEXT)),
        ]);
        f.render_widget(Paragraph::new(stash), area);
    }
}

/// Bottom bar: mode-specific key hints, or the last notification
pub fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let bar_style = styles::panel_style();

    if let Some(ref msg) = app.message {
        let line = Line::from(vec![
            Span::styled(" ● ", Style::default().fg(styles::GREEN)),
            Span::styled(msg.clone(), Style::default().fg(styles::TEXT)),
        ]);
        f.render_widget(Paragraph::new(line).style(bar_style), area);
        return;
    }

    let hints: &[(&str, &str)] = match (app.input_mode, app.mode) {
        (InputMode::Search, _) => &[("↑↓", "move"), ("Enter", "select"), ("Esc", "close")],
        (InputMode::Prompt, _) => &[("Enter", "submit"), ("Esc", "cancel")],
        (InputMode::Normal, Mode::Delete) => &[("d", "discard file"), ("a", "discard all"), ("Esc", "back")],
        (InputMode::Normal, Mode::Stash) => &[("s", "stash"), ("a", "apply"), ("d", "drop"), ("Esc", "back")],
        (InputMode::Normal, Mode::Normal) => &[
            ("j/k", "file"),
            ("J/K", "scroll"),
            ("v/V", "select"),
            ("c", "commit"),
            ("u", "undo"),
            ("d", "discard"),
            ("s", "stash"),
            ("b", "branch"),
            ("p", "repo"),
            ("o", "open"),
            ("q", "quit"),
        ],
    };

    let mode_style = match app.mode {
        Mode::Normal => Style::default().fg(styles::BG).bg(styles::TEXT),
        Mode::Delete => Style::default().fg(styles::BRIGHT).bg(styles::RED),
        Mode::Stash => Style::default().fg(styles::BG).bg(styles::YELLOW),
    }
    .add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled(format!(" {} ", app.mode.label()), mode_style),
        Span::raw(" "),
    ];
    for (key, label) in hints {
        spans.push(Span::styled(key.to_string(), styles::key_hint_style()));
        spans.push(Span::styled(format!(" {}  ", label), Style::default().fg(styles::DIM)));
    }
    if app.watching {
        spans.push(Span::styled("◉ watching", Style::default().fg(styles::GREEN)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).style(bar_style), area);
}
