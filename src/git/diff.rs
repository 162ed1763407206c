use std::fmt;

/// Marker git prints instead of hunks when either side is binary
pub const BINARY_MARKER: &str = "Binary files";

/// Tabs are expanded to this many spaces before a line is classified
pub const TAB_WIDTH: usize = 4;

/// What a row on one side of the split view represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Unmodified,
    Added,
    Removed,
    /// Synthetic empty row that keeps both sides the same height
    Filler,
}

/// A single row on one side of a hunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub kind: LineKind,
}

impl Line {
    fn new(text: impl Into<String>, kind: LineKind) -> Self {
        Line {
            text: text.into(),
            kind,
        }
    }

    fn filler() -> Self {
        Line::new(String::new(), LineKind::Filler)
    }
}

/// One side (old or new) of a hunk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hunk {
    pub start_line: u32,
    /// Second number of the header range, kept exactly as git printed it
    pub end_line: u32,
    pub is_binary: bool,
    pub lines: Vec<Line>,
}

impl Hunk {
    fn with_range(start_line: u32, end_line: u32) -> Self {
        Hunk {
            start_line,
            end_line,
            ..Hunk::default()
        }
    }

    fn binary() -> Self {
        Hunk {
            is_binary: true,
            ..Hunk::default()
        }
    }

    /// Lines paired with their file line number. Fillers have no number and
    /// don't advance the counter.
    pub fn numbered_lines(&self) -> impl Iterator<Item = (Option<u32>, &Line)> {
        let mut next = self.start_line;
        self.lines.iter().map(move |line| {
            if line.kind == LineKind::Filler {
                (None, line)
            } else {
                let num = next;
                next = next.saturating_add(1);
                (Some(num), line)
            }
        })
    }
}

/// Parsed diff of a single file, aligned for side-by-side display.
///
/// `old_hunks()[i]` and `new_hunks()[i]` describe the same hunk and always
/// hold the same number of lines, so row `j` of one can be drawn beside row
/// `j` of the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    old_hunks: Vec<Hunk>,
    new_hunks: Vec<Hunk>,
}

impl Diff {
    pub fn old_hunks(&self) -> &[Hunk] {
        &self.old_hunks
    }

    pub fn new_hunks(&self) -> &[Hunk] {
        &self.new_hunks
    }

    /// Iterate `(old, new)` hunk pairs in input order
    pub fn hunk_pairs(&self) -> impl Iterator<Item = (&Hunk, &Hunk)> {
        self.old_hunks.iter().zip(self.new_hunks.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.old_hunks.is_empty()
    }

    pub fn is_binary(&self) -> bool {
        self.new_hunks.len() == 1 && self.new_hunks[0].is_binary
    }

    /// Rows one column takes when drawn: a separator per hunk plus its lines
    pub fn row_count(&self) -> usize {
        self.old_hunks.iter().map(|h| h.lines.len() + 1).sum()
    }

    /// Number of added and removed lines across all hunks
    pub fn stats(&self) -> (usize, usize) {
        let adds = self
            .new_hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.kind == LineKind::Added)
            .count();
        let dels = self
            .old_hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.kind == LineKind::Removed)
            .count();
        (adds, dels)
    }

    fn push(&mut self, old: Hunk, new: Hunk) {
        debug_assert_eq!(old.lines.len(), new.lines.len());
        self.old_hunks.push(old);
        self.new_hunks.push(new);
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_binary() {
            return writeln!(f, "(binary file)");
        }
        for (old, new) in self.hunk_pairs() {
            writeln!(
                f,
                "@@ old {}..{} | new {}..{} @@",
                old.start_line, old.end_line, new.start_line, new.end_line
            )?;
            for (o, n) in old.lines.iter().zip(&new.lines) {
                writeln!(f, "{} {:<40} | {} {}", marker(o.kind), o.text, marker(n.kind), n.text)?;
            }
        }
        Ok(())
    }
}

fn marker(kind: LineKind) -> char {
    match kind {
        LineKind::Unmodified => ' ',
        LineKind::Added => '+',
        LineKind::Removed => '-',
        LineKind::Filler => '~',
    }
}

/// Raw body line of a hunk, before alignment
#[derive(Debug)]
enum Token {
    Context(String),
    Added(String),
    Removed(String),
}

/// Per-hunk buffers: the old side gets context and removals, the new side
/// gets context and additions
#[derive(Debug)]
struct RawHunk {
    old_start: u32,
    old_end: u32,
    new_start: u32,
    new_end: u32,
    old: Vec<Token>,
    new: Vec<Token>,
}

/// Parse the `git diff` output for one file into an aligned [`Diff`].
///
/// Never fails: text without a hunk header yields an empty diff, or a single
/// binary hunk pair when git reported the file as binary.
pub fn parse_diff(raw: &str) -> Diff {
    let mut diff = Diff::default();
    if raw.is_empty() {
        return diff;
    }

    let lines: Vec<&str> = raw.split('\n').collect();

    // File headers (diff --git, index, ---, +++) come before the first hunk
    let Some(first_hunk) = lines
        .iter()
        .position(|l| l.trim().starts_with("@@"))
    else {
        if lines.iter().any(|l| l.starts_with(BINARY_MARKER)) {
            diff.push(Hunk::binary(), Hunk::binary());
        }
        return diff;
    };

    let mut current: Option<RawHunk> = None;
    let tab = " ".repeat(TAB_WIDTH);

    for (idx, line) in lines[first_hunk..].iter().enumerate() {
        let line = line.trim_end_matches('\r').replace('\t', &tab);
        if line.is_empty() {
            continue;
        }

        // Only the first header may be indented
        if idx == 0 || line.starts_with("@@") {
            if let Some(raw_hunk) = current.take() {
                let (old, new) = align(raw_hunk);
                diff.push(old, new);
            }
            let (old_start, old_end, new_start, new_end) = parse_chunk_header(&line);
            current = Some(RawHunk {
                old_start,
                old_end,
                new_start,
                new_end,
                old: Vec::new(),
                new: Vec::new(),
            });
            continue;
        }

        let Some(hunk) = current.as_mut() else {
            continue;
        };

        if let Some(text) = line.strip_prefix('+') {
            hunk.new.push(Token::Added(text.to_string()));
        } else if let Some(text) = line.strip_prefix('-') {
            hunk.old.push(Token::Removed(text.to_string()));
        } else if line.starts_with('\\') {
            // "\ No newline at end of file"
        } else {
            let text = line.strip_prefix(' ').unwrap_or(line.as_str());
            hunk.old.push(Token::Context(text.to_string()));
            hunk.new.push(Token::Context(text.to_string()));
        }
    }

    if let Some(raw_hunk) = current {
        let (old, new) = align(raw_hunk);
        diff.push(old, new);
    }

    diff
}

/// Merge one hunk's raw buffers into two equal-length line arrays.
///
/// Rules are checked in order: shared context, removal paired with addition,
/// lone addition, lone removal. Removals and additions in the same block are
/// paired by position, not by content.
fn align(raw: RawHunk) -> (Hunk, Hunk) {
    let mut old = Hunk::with_range(raw.old_start, raw.old_end);
    let mut new = Hunk::with_range(raw.new_start, raw.new_end);

    let (mut i, mut j) = (0, 0);
    loop {
        let row = match (raw.old.get(i), raw.new.get(j)) {
            (None, None) => break,
            (Some(Token::Context(o)), Some(Token::Context(n))) => {
                i += 1;
                j += 1;
                (Line::new(o, LineKind::Unmodified), Line::new(n, LineKind::Unmodified))
            }
            (Some(Token::Removed(o)), Some(Token::Added(n))) => {
                i += 1;
                j += 1;
                (Line::new(o, LineKind::Removed), Line::new(n, LineKind::Added))
            }
            (_, Some(Token::Added(n))) => {
                j += 1;
                (Line::filler(), Line::new(n, LineKind::Added))
            }
            (Some(Token::Removed(o)), _) => {
                i += 1;
                (Line::new(o, LineKind::Removed), Line::filler())
            }
            // Context is pushed to both buffers, so one side can only run out
            // of it first if the buffers were built by hand
            (Some(o), None) => {
                i += 1;
                (Line::new(o.text(), LineKind::Unmodified), Line::filler())
            }
            (None, Some(n)) => {
                j += 1;
                (Line::filler(), Line::new(n.text(), LineKind::Unmodified))
            }
            (Some(o), Some(n)) => {
                i += 1;
                j += 1;
                (
                    Line::new(o.text(), LineKind::Unmodified),
                    Line::new(n.text(), LineKind::Unmodified),
                )
            }
        };
        old.lines.push(row.0);
        new.lines.push(row.1);
    }

    (old, new)
}

impl Token {
    fn text(&self) -> &str {
        match self {
            Token::Context(s) | Token::Added(s) | Token::Removed(s) => s,
        }
    }
}

/// Parse a hunk header like `@@ -10,4 +10,15 @@ fn foo()` into
/// `(old_start, old_end, new_start, new_end)`.
///
/// A range without a comma repeats its start as the end. Anything that
/// doesn't parse as a number becomes 0.
pub fn parse_chunk_header(line: &str) -> (u32, u32, u32, u32) {
    let ranges = line.trim().trim_matches('@').trim();
    let mut parts = ranges.split_whitespace();

    let old = parts.next().unwrap_or("");
    let new = parts.next().unwrap_or("");

    let (old_start, old_end) = parse_range(old.strip_prefix('-').unwrap_or(old));
    let (new_start, new_end) = parse_range(new.strip_prefix('+').unwrap_or(new));

    (old_start, old_end, new_start, new_end)
}

fn parse_range(s: &str) -> (u32, u32) {
    match s.split_once(',') {
        Some((start, end)) => (start.parse().unwrap_or(0), end.parse().unwrap_or(0)),
        None => {
            let start = s.parse().unwrap_or(0);
            (start, start)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(hunk: &Hunk) -> Vec<LineKind> {
        hunk.lines.iter().map(|l| l.kind).collect()
    }

    fn texts(hunk: &Hunk) -> Vec<&str> {
        hunk.lines.iter().map(|l| l.text.as_str()).collect()
    }

    fn assert_aligned(diff: &Diff) {
        assert_eq!(diff.old_hunks().len(), diff.new_hunks().len());
        for (old, new) in diff.hunk_pairs() {
            assert_eq!(old.lines.len(), new.lines.len());
        }
    }

    #[test]
    fn empty_input_has_no_hunks() {
        let diff = parse_diff("");
        assert!(diff.old_hunks().is_empty());
        assert!(diff.new_hunks().is_empty());
    }

    #[test]
    fn headers_without_hunks_are_empty() {
        let raw = "diff --git a/a.txt b/a.txt\nindex 123..456 100644\n";
        assert!(parse_diff(raw).is_empty());
    }

    #[test]
    fn replace_with_size_mismatch() {
        let raw = r#"diff --git a/f.txt b/f.txt
index abc123..def456 100644
--- a/f.txt
+++ b/f.txt
@@ -1,3 +1,4 @@
 line1
-line2
+line2 changed
+line2b
 line3
"#;
        let diff = parse_diff(raw);
        assert_eq!(diff.old_hunks().len(), 1);

        let old = &diff.old_hunks()[0];
        let new = &diff.new_hunks()[0];
        assert_eq!(texts(old), vec!["line1", "line2", "", "line3"]);
        assert_eq!(
            kinds(old),
            vec![
                LineKind::Unmodified,
                LineKind::Removed,
                LineKind::Filler,
                LineKind::Unmodified
            ]
        );
        assert_eq!(texts(new), vec!["line1", "line2 changed", "line2b", "line3"]);
        assert_eq!(
            kinds(new),
            vec![
                LineKind::Unmodified,
                LineKind::Added,
                LineKind::Added,
                LineKind::Unmodified
            ]
        );
        assert_eq!((old.start_line, old.end_line), (1, 3));
        assert_eq!((new.start_line, new.end_line), (1, 4));
    }

    #[test]
    fn pure_context_is_identical_on_both_sides() {
        let raw = "@@ -3,2 +3,2 @@\n alpha\n beta\n";
        let diff = parse_diff(raw);
        let (old, new) = diff.hunk_pairs().next().unwrap();
        assert_eq!(old.lines, new.lines);
        assert!(old.lines.iter().all(|l| l.kind == LineKind::Unmodified));
        assert_eq!(texts(old), vec!["alpha", "beta"]);
    }

    #[test]
    fn pure_addition_pads_old_side_with_fillers() {
        let raw = "diff --git a/new.rs b/new.rs\nnew file mode 100644\n--- /dev/null\n+++ b/new.rs\n@@ -0,0 +1,3 @@\n+a\n+b\n+c\n";
        let diff = parse_diff(raw);
        let (old, new) = diff.hunk_pairs().next().unwrap();
        assert_eq!(kinds(old), vec![LineKind::Filler; 3]);
        assert!(old.lines.iter().all(|l| l.text.is_empty()));
        assert_eq!(kinds(new), vec![LineKind::Added; 3]);
        assert_eq!(texts(new), vec!["a", "b", "c"]);
        assert_eq!((old.start_line, old.end_line), (0, 0));
    }

    #[test]
    fn pure_removal_pads_new_side_with_fillers() {
        let raw = "@@ -1,2 +0,0 @@\n-gone\n-also gone\n";
        let diff = parse_diff(raw);
        let (old, new) = diff.hunk_pairs().next().unwrap();
        assert_eq!(kinds(old), vec![LineKind::Removed; 2]);
        assert_eq!(kinds(new), vec![LineKind::Filler; 2]);
    }

    #[test]
    fn removals_pair_with_additions_by_position() {
        let raw = "@@ -1,3 +1,2 @@\n-one\n-two\n-three\n+uno\n+dos\n";
        let diff = parse_diff(raw);
        let (old, new) = diff.hunk_pairs().next().unwrap();
        assert_eq!(texts(old), vec!["one", "two", "three"]);
        assert_eq!(texts(new), vec!["uno", "dos", ""]);
        assert_eq!(
            kinds(new),
            vec![LineKind::Added, LineKind::Added, LineKind::Filler]
        );
    }

    #[test]
    fn addition_before_context_gets_filler() {
        let raw = "@@ -1,1 +1,2 @@\n+first\n kept\n";
        let diff = parse_diff(raw);
        let (old, new) = diff.hunk_pairs().next().unwrap();
        assert_eq!(kinds(old), vec![LineKind::Filler, LineKind::Unmodified]);
        assert_eq!(kinds(new), vec![LineKind::Added, LineKind::Unmodified]);
    }

    #[test]
    fn binary_marker_yields_one_binary_hunk() {
        let diff = parse_diff("Binary files a/img.png and b/img.png differ\n");
        assert_eq!(diff.old_hunks().len(), 1);
        assert_eq!(diff.new_hunks().len(), 1);
        for hunk in [&diff.old_hunks()[0], &diff.new_hunks()[0]] {
            assert!(hunk.is_binary);
            assert_eq!(hunk.start_line, 0);
            assert_eq!(hunk.end_line, 0);
            assert!(hunk.lines.is_empty());
        }
        assert!(diff.is_binary());
    }

    #[test]
    fn no_newline_marker_is_dropped() {
        let raw = "@@ -1 +1 @@\n-old\n\\ No newline at end of file\n+new\n\\ No newline at end of file\n";
        let diff = parse_diff(raw);
        let (old, new) = diff.hunk_pairs().next().unwrap();
        assert_eq!(old.lines.len(), 1);
        assert!(old
            .lines
            .iter()
            .chain(&new.lines)
            .all(|l| !l.text.contains("No newline")));
        assert_eq!(old.lines[0], Line::new("old", LineKind::Removed));
        assert_eq!(new.lines[0], Line::new("new", LineKind::Added));
    }

    #[test]
    fn multiple_hunks_keep_input_order() {
        let raw = "@@ -1,2 +1,2 @@\n a\n-b\n+B\n@@ -10,2 +10,3 @@\n x\n+y\n z\n";
        let diff = parse_diff(raw);
        assert_eq!(diff.old_hunks().len(), 2);
        assert_eq!(diff.old_hunks()[1].start_line, 10);
        assert_eq!(texts(&diff.new_hunks()[1]), vec!["x", "y", "z"]);
        assert_eq!(texts(&diff.old_hunks()[1]), vec!["x", "", "z"]);
        assert_aligned(&diff);
    }

    #[test]
    fn tabs_are_expanded() {
        let raw = "@@ -1 +1 @@\n-\tindented\n+\t\tmore\n";
        let diff = parse_diff(raw);
        let (old, new) = diff.hunk_pairs().next().unwrap();
        assert_eq!(old.lines[0].text, "    indented");
        assert_eq!(new.lines[0].text, "        more");
    }

    #[test]
    fn alignment_holds_for_mixed_hunks() {
        let inputs = [
            "@@ -1,4 +1,2 @@\n-a\n b\n-c\n-d\n+e\n",
            "@@ -1 +1,3 @@\n+a\n+b\n c\n-d\n",
            "@@ -1,2 +1,2 @@\n-x\n+y\n-z\n+w\n q\n+r\n",
            "@@ garbage @@\n+only\n",
        ];
        for raw in inputs {
            assert_aligned(&parse_diff(raw));
        }
    }

    #[test]
    fn binary_marker_after_git_headers() {
        let raw = "diff --git a/logo.png b/logo.png\nindex 1a2b3c4..5d6e7f8 100644\nBinary files a/logo.png and b/logo.png differ\n";
        let diff = parse_diff(raw);
        assert!(diff.is_binary());
        assert_eq!(diff.old_hunks().len(), 1);
        assert!(diff.old_hunks()[0].is_binary);
        assert!(diff.new_hunks()[0].lines.is_empty());
    }

    #[test]
    fn indented_first_header_opens_a_hunk() {
        let raw = "  @@ -3 +3 @@\n-a\n+b\n";
        let diff = parse_diff(raw);
        assert_eq!(diff.old_hunks().len(), 1);
        let (old, new) = diff.hunk_pairs().next().unwrap();
        assert_eq!((old.start_line, new.start_line), (3, 3));
        assert_eq!(old.lines[0], Line::new("a", LineKind::Removed));
        assert_eq!(new.lines[0], Line::new("b", LineKind::Added));
    }

    #[test]
    fn indented_later_header_is_context() {
        let raw = "@@ -1,2 +1,2 @@\n a\n @@ b\n";
        let diff = parse_diff(raw);
        assert_eq!(diff.old_hunks().len(), 1);
        assert_eq!(texts(&diff.old_hunks()[0]), vec!["a", "@@ b"]);
    }

    #[test]
    fn align_consumes_unbalanced_buffers() {
        let raw = RawHunk {
            old_start: 1,
            old_end: 2,
            new_start: 1,
            new_end: 1,
            old: vec![
                Token::Context("a".into()),
                Token::Context("b".into()),
            ],
            new: vec![Token::Context("a".into())],
        };
        let (old, new) = align(raw);
        assert_eq!(texts(&old), vec!["a", "b"]);
        assert_eq!(kinds(&new), vec![LineKind::Unmodified, LineKind::Filler]);
    }

    #[test]
    fn row_count_includes_separators() {
        let raw = "@@ -1,2 +1,2 @@\n a\n-b\n+B\n@@ -9 +9 @@\n+c\n";
        assert_eq!(parse_diff(raw).row_count(), 2 + 1 + 2);
        assert_eq!(Diff::default().row_count(), 0);
    }

    #[test]
    fn chunk_header_with_counts() {
        assert_eq!(parse_chunk_header("@@ -10,4 +10,15 @@ impl Foo"), (10, 4, 10, 15));
    }

    #[test]
    fn chunk_header_single_numbers() {
        assert_eq!(parse_chunk_header("@@ -5 +7 @@"), (5, 5, 7, 7));
    }

    #[test]
    fn chunk_header_garbage_degrades_to_zero() {
        assert_eq!(parse_chunk_header("@@ -x,y +3,z @@"), (0, 0, 3, 0));
        assert_eq!(parse_chunk_header("@@"), (0, 0, 0, 0));
    }

    #[test]
    fn numbered_lines_skip_fillers() {
        let raw = "@@ -4,2 +4,3 @@\n a\n+b\n c\n";
        let diff = parse_diff(raw);
        let old: Vec<Option<u32>> = diff.old_hunks()[0].numbered_lines().map(|(n, _)| n).collect();
        let new: Vec<Option<u32>> = diff.new_hunks()[0].numbered_lines().map(|(n, _)| n).collect();
        assert_eq!(old, vec![Some(4), None, Some(5)]);
        assert_eq!(new, vec![Some(4), Some(5), Some(6)]);
    }

    #[test]
    fn stats_count_changed_lines() {
        let raw = "@@ -1,3 +1,4 @@\n line1\n-line2\n+line2 changed\n+line2b\n line3\n";
        assert_eq!(parse_diff(raw).stats(), (2, 1));
    }
}
