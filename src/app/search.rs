/// Max rows the picker shows at once
pub const MAX_RESULTS: usize = 5;

/// How the query is matched against item labels (case-insensitive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMethod {
    BeginsWith,
    Includes,
}

/// What the picker chooses between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    Branch,
    Repository,
}

impl SearchTarget {
    pub fn placeholder(&self) -> &'static str {
        match self {
            SearchTarget::Branch => "Branch name",
            SearchTarget::Repository => "Repository name",
        }
    }
}

/// A pickable item: the label is matched and shown, the value is what the
/// caller acts on (e.g. repo dir name vs. full path)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    pub label: String,
    pub value: String,
}

/// Quick search popup state
#[derive(Debug, Clone)]
pub struct QuickSearch {
    pub target: SearchTarget,
    pub method: SearchMethod,
    pub query: String,
    items: Vec<SearchItem>,
    /// Indices into `items`, at most `MAX_RESULTS`
    results: Vec<usize>,
    active: Option<usize>,
}

impl QuickSearch {
    pub fn branches(branches: &[String]) -> Self {
        let items = branches
            .iter()
            .map(|b| SearchItem {
                label: b.clone(),
                value: b.clone(),
            })
            .collect();
        Self::new(SearchTarget::Branch, SearchMethod::Includes, items)
    }

    /// Repositories are matched on their directory name
    pub fn repositories(paths: &[String]) -> Self {
        let items = paths
            .iter()
            .map(|p| SearchItem {
                label: std::path::Path::new(p)
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| p.clone()),
                value: p.clone(),
            })
            .collect();
        Self::new(SearchTarget::Repository, SearchMethod::BeginsWith, items)
    }

    fn new(target: SearchTarget, method: SearchMethod, items: Vec<SearchItem>) -> Self {
        let mut search = QuickSearch {
            target,
            method,
            query: String::new(),
            items,
            results: Vec::new(),
            active: None,
        };
        search.update_results();
        search
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.update_results();
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
        self.update_results();
    }

    pub fn select_next(&mut self) {
        if let Some(i) = self.active {
            self.active = Some((i + 1).min(self.results.len().saturating_sub(1)));
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(i) = self.active {
            self.active = Some(i.saturating_sub(1));
        }
    }

    pub fn results(&self) -> impl Iterator<Item = &SearchItem> {
        self.results.iter().map(|&i| &self.items[i])
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn selected(&self) -> Option<&SearchItem> {
        self.active
            .and_then(|i| self.results.get(i))
            .map(|&i| &self.items[i])
    }

    fn update_results(&mut self) {
        let query = self.query.to_lowercase();
        let method = self.method;
        self.results = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                let label = item.label.to_lowercase();
                match method {
                    SearchMethod::BeginsWith => label.starts_with(&query),
                    SearchMethod::Includes => label.contains(&query),
                }
            })
            .map(|(i, _)| i)
            .take(MAX_RESULTS)
            .collect();
        self.active = if self.results.is_empty() { None } else { Some(0) };
    }
}
