use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::highlight::Highlighter;
use super::styles;
use crate::app::App;
use crate::git::{ChangeKind, Hunk, LineKind};

/// Render the old and new columns side by side. Row `j` of hunk `i` sits at
/// the same height in both columns.
pub fn render(f: &mut Frame, area: Rect, app: &App, hl: &Highlighter) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let Some(entry) = app.active_entry() else {
        return;
    };
    let diff = &app.diff;
    let display = &app.settings.display;
    let hl = display.syntax_highlight.then_some(hl);

    // Old column
    let old_block = side_block(" OLD ".to_string(), Borders::RIGHT);
    if diff.is_binary() {
        f.render_widget(Paragraph::new("").block(old_block), columns[0]);
    } else {
        let lines = side_lines(diff.old_hunks(), &entry.path, hl, display.line_numbers);
        let paragraph = Paragraph::new(lines)
            .block(old_block)
            .scroll((app.diff_scroll, 0));
        f.render_widget(paragraph, columns[0]);
    }

    // New column
    let (adds, dels) = diff.stats();
    let new_block = side_block(format!(" NEW · {}  +{} -{} ", entry.path, adds, dels), Borders::NONE);
    let message = if entry.kind == ChangeKind::Deleted {
        Some("File was removed")
    } else if diff.is_binary() {
        Some("Cannot show diff of binary file")
    } else if diff.is_empty() {
        Some("No textual changes")
    } else {
        None
    };

    match message {
        Some(msg) => render_message(f, columns[1], new_block, msg),
        None => {
            let lines = side_lines(diff.new_hunks(), &entry.path, hl, display.line_numbers);
            let paragraph = Paragraph::new(lines)
                .block(new_block)
                .scroll((app.diff_scroll, 0));
            f.render_widget(paragraph, columns[1]);
        }
    }
}

fn side_block(title: String, borders: Borders) -> Block<'static> {
    Block::default()
        .title(Span::styled(title, Style::default().fg(styles::BRIGHT)))
        .borders(borders)
        .border_style(Style::default().fg(styles::PANEL))
        .style(styles::default_style())
}

fn render_message(f: &mut Frame, area: Rect, block: Block<'static>, msg: &str) {
    let top_pad = area.height.saturating_sub(2) / 2;
    let mut lines: Vec<Line> = (0..top_pad).map(|_| Line::from("")).collect();
    lines.push(
        Line::from(Span::styled(msg.to_string(), Style::default().fg(styles::BRIGHT)))
            .alignment(ratatui::layout::Alignment::Center),
    );
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Build the rows for one column: a separator per hunk followed by its lines
pub(crate) fn side_lines(
    hunks: &[Hunk],
    filename: &str,
    hl: Option<&Highlighter>,
    line_numbers: bool,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for hunk in hunks {
        lines.push(
            Line::from(Span::styled(
                format!(" @@ {},{} ", hunk.start_line, hunk.end_line),
                styles::separator_style(),
            ))
            .style(styles::separator_style()),
        );

        for (num, line) in hunk.numbered_lines() {
            let style = match line.kind {
                LineKind::Unmodified => styles::default_style(),
                LineKind::Added => styles::add_style(),
                LineKind::Removed => styles::del_style(),
                LineKind::Filler => styles::filler_style(),
            };

            let mut spans = Vec::new();
            if line_numbers {
                let gutter = num.map(|n| format!("{:>5} ", n)).unwrap_or_else(|| "      ".to_string());
                spans.push(Span::styled(gutter, styles::gutter_style()));
            }
            spans.push(Span::styled(" ", style));

            match hl {
                Some(hl) if line.kind != LineKind::Filler && !line.text.is_empty() => {
                    spans.extend(hl.highlight_line(&line.text, filename, style));
                }
                _ => spans.push(Span::styled(line.text.clone(), style)),
            }

            lines.push(Line::from(spans).style(style));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::parse_diff;

    fn row_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn both_columns_have_same_row_count() {
        let diff = parse_diff("@@ -1,3 +1,4 @@\n line1\n-line2\n+line2 changed\n+line2b\n line3\n@@ -20 +21 @@\n-x\n");
        let old = side_lines(diff.old_hunks(), "f.txt", None, true);
        let new = side_lines(diff.new_hunks(), "f.txt", None, true);
        assert_eq!(old.len(), new.len());
        assert_eq!(old.len(), 2 + 4 + 1);
    }

    #[test]
    fn filler_rows_have_blank_gutter() {
        let diff = parse_diff("@@ -1,3 +1,4 @@\n line1\n-line2\n+line2 changed\n+line2b\n line3\n");
        let old = side_lines(diff.old_hunks(), "f.txt", None, true);
        assert_eq!(row_text(&old[0]), " @@ 1,3 ");
        assert_eq!(row_text(&old[1]), "    1  line1");
        assert_eq!(row_text(&old[3]), "       ");
        assert_eq!(row_text(&old[4]), "    3  line3");
    }

    #[test]
    fn gutter_can_be_hidden() {
        let diff = parse_diff("@@ -1 +1 @@\n-a\n+b\n");
        let new = side_lines(diff.new_hunks(), "f.txt", None, false);
        assert_eq!(row_text(&new[1]), " b");
    }
}
