use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use super::styles;
use crate::app::search::MAX_RESULTS;
use crate::app::{Prompt, QuickSearch};

/// Quick search popup: query field on top, up to five results below
pub fn render_search(f: &mut Frame, area: Rect, search: &QuickSearch) {
    let popup = centered_rect(60u16.min(area.width.saturating_sub(4)), MAX_RESULTS as u16 + 4, area);
    f.render_widget(Clear, popup);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(popup);

    render_input(f, parts[0], search.target.placeholder(), &search.query);

    let active = search.active_index();
    let items: Vec<ListItem> = search
        .results()
        .enumerate()
        .map(|(idx, item)| {
            let is_sel = Some(idx) == active;
            let marker = if is_sel { "▶ " } else { "  " };
            let line = Line::from(vec![
                Span::styled(marker, Style::default().fg(styles::CYAN)),
                Span::styled(item.label.clone(), Style::default().fg(styles::TEXT)),
            ]);
            let bg = if is_sel { styles::ROW_ACTIVE } else { styles::ROW };
            ListItem::new(line).style(Style::default().bg(bg))
        })
        .collect();

    let list = if items.is_empty() {
        List::new(vec![ListItem::new(Span::styled(
            "  no matches",
            Style::default().fg(styles::DIM),
        ))])
    } else {
        List::new(items)
    };
    f.render_widget(list.style(styles::panel_style()), parts[1]);
}

/// Single-line text prompt (commit message, paths, branch name)
pub fn render_prompt(f: &mut Frame, area: Rect, prompt: &Prompt) {
    let popup = centered_rect(70u16.min(area.width.saturating_sub(4)), 3, area);
    f.render_widget(Clear, popup);
    render_input(f, popup, prompt.kind.placeholder(), &prompt.input);
}

fn render_input(f: &mut Frame, area: Rect, placeholder: &str, value: &str) {
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", placeholder),
            Style::default().fg(styles::CYAN),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(styles::CYAN))
        .style(styles::default_style());

    let line = Line::from(vec![
        Span::styled(value.to_string(), Style::default().fg(styles::BRIGHT)),
        Span::styled("█", Style::default().fg(styles::CYAN)),
    ]);
    f.render_widget(Paragraph::new(line).block(block), area);
}

/// Empty-state screens ("No changes to show", "No repositories added")
pub fn render_centered_message(f: &mut Frame, area: Rect, msg: &str) {
    let popup = centered_rect(area.width, 1, area);
    let text = Paragraph::new(Line::from(Span::styled(
        msg.to_string(),
        Style::default().fg(styles::BRIGHT),
    )))
    .alignment(ratatui::layout::Alignment::Center);
    f.render_widget(text, popup);
}

fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(r.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}
