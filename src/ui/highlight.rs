use ratatui::style::{Color, Style};
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

const THEME: &str = "base16-ocean.dark";

/// Syntax highlighting state, loaded once at startup
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new() -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = themes.remove(THEME).unwrap_or_default();
        Highlighter { syntax_set, theme }
    }

    fn syntax_for(&self, filename: &str) -> &SyntaxReference {
        self.syntax_set
            .find_syntax_for_file(filename)
            .ok()
            .flatten()
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    /// Highlight one diff row. Only the foreground comes from the theme so the
    /// added/removed background of `base_style` survives.
    pub fn highlight_line(&self, line: &str, filename: &str, base_style: Style) -> Vec<Span<'static>> {
        let mut highlighter = HighlightLines::new(self.syntax_for(filename), &self.theme);
        let input = format!("{}\n", line);

        match highlighter.highlight_line(&input, &self.syntax_set) {
            Ok(ranges) => ranges
                .into_iter()
                .map(|(syn_style, text)| {
                    let fg = Color::Rgb(
                        syn_style.foreground.r,
                        syn_style.foreground.g,
                        syn_style.foreground.b,
                    );
                    Span::styled(text.trim_end_matches('\n').to_string(), base_style.fg(fg))
                })
                .collect(),
            Err(_) => vec![Span::styled(line.to_string(), base_style)],
        }
    }
}
