mod diff_view;
pub mod highlight;
mod overlay;
mod staging;
mod status_bar;
mod styles;

use crate::app::App;
use highlight::Highlighter;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::widgets::Block;
use ratatui::Frame;

/// Render the entire UI
pub fn draw(f: &mut Frame, app: &App, hl: &Highlighter) {
    f.render_widget(Block::default().style(styles::default_style()), f.area());

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // repo / branch
            Constraint::Min(1),    // staging + diff
            Constraint::Length(1), // key hints / notifications
        ])
        .split(f.area());

    match app.repo.as_ref() {
        None => overlay::render_centered_message(
            f,
            outer[1],
            "No repositories added to the client. Press `o` to add a repository",
        ),
        Some(repo) if repo.changes.is_empty() => {
            status_bar::render_top_bar(f, outer[0], app);
            overlay::render_centered_message(f, outer[1], "No changes to show");
        }
        Some(_) => {
            status_bar::render_top_bar(f, outer[0], app);
            let main_area = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Length(36), // staging list
                    Constraint::Min(1),     // old | new
                ])
                .split(outer[1]);
            staging::render(f, main_area[0], app);
            diff_view::render(f, main_area[1], app, hl);
        }
    }

    status_bar::render_bottom_bar(f, outer[2], app);

    if let Some(ref search) = app.search {
        overlay::render_search(f, f.area(), search);
    }
    if let Some(ref prompt) = app.prompt {
        overlay::render_prompt(f, f.area(), prompt);
    }
}
