use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding},
    Frame,
};

use super::styles;
use crate::app::App;
use crate::git::ChangeKind;

/// Render the list of changed files (left side)
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let changes = app.changes();
    let selected_count = changes.iter().filter(|e| e.selected).count();
    let title = format!(" CHANGES ({}/{}) ", selected_count, changes.len());

    // Keep the active entry inside the viewport
    let viewport = area.height.saturating_sub(1) as usize;
    let first = if app.selected >= viewport {
        app.selected + 1 - viewport
    } else {
        0
    };

    let items: Vec<ListItem> = changes
        .iter()
        .enumerate()
        .skip(first)
        .take(viewport)
        .map(|(idx, entry)| {
            let is_active = idx == app.selected;

            let kind_style = match entry.kind {
                ChangeKind::Added | ChangeKind::Untracked => styles::status_added(),
                ChangeKind::Deleted => styles::status_deleted(),
                ChangeKind::Modified | ChangeKind::Renamed => styles::status_modified(),
            };
            let name_style = if entry.selected {
                Style::default().fg(styles::TEXT)
            } else {
                Style::default().fg(styles::DIM)
            };
            let check = if entry.selected { "● " } else { "○ " };

            let line = Line::from(vec![
                Span::styled(check, kind_style),
                Span::styled(format!("{} ", entry.kind.symbol()), kind_style),
                Span::styled(entry.path.clone(), name_style),
            ]);

            let row_bg = if is_active { styles::ROW_ACTIVE } else { styles::PANEL };
            ListItem::new(line).style(Style::default().bg(row_bg))
        })
        .collect();

    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(styles::BRIGHT)))
        .borders(Borders::NONE)
        .padding(Padding::new(0, 1, 0, 0))
        .style(styles::panel_style());

    f.render_widget(List::new(items).block(block), area);
}
