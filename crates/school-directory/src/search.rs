//! Query and filtered-view model over the merged school list.
//!
//! The filtered view is stored as indices into the full list, recomputed
//! eagerly whenever the query or the list changes. Reads never scan.
//!
//! An empty query means "not filtering": the active view is the full list
//! and [`SchoolSearch::is_filtering`] is false.

use schools_common::School;

#[derive(Debug, Clone, Default)]
pub struct SchoolSearch {
    all: Vec<School>,
    /// Lowercased names, parallel to `all`
    folded_names: Vec<Option<String>>,
    query: String,
    filtered: Vec<usize>,
}

impl SchoolSearch {
    pub fn new(schools: Vec<School>) -> Self {
        let mut search = Self::default();
        search.replace_all(schools);
        search
    }

    /// Replace the query and recompute the active view.
    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
        self.refilter();
    }

    pub fn clear_query(&mut self) {
        self.set_query("");
    }

    /// Replace the whole list, keeping the current query.
    pub fn replace_all(&mut self, schools: Vec<School>) {
        self.folded_names = schools
            .iter()
            .map(|school| school.name.as_deref().map(str::to_lowercase))
            .collect();
        self.all = schools;
        self.refilter();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_filtering(&self) -> bool {
        !self.query.is_empty()
    }

    /// Schools in the active view, in list order.
    pub fn filtered_schools(&self) -> impl Iterator<Item = &School> + '_ {
        self.filtered.iter().map(move |&index| &self.all[index])
    }

    /// Length of the active view.
    pub fn count(&self) -> usize {
        self.filtered.len()
    }

    /// Length of the full list, regardless of the query.
    pub fn total_count(&self) -> usize {
        self.all.len()
    }

    /// Entry `index` of the active view, or `None` when out of range.
    pub fn item(&self, index: usize) -> Option<&School> {
        self.filtered
            .get(index)
            .and_then(|&position| self.all.get(position))
    }

    pub fn all_schools(&self) -> &[School] {
        &self.all
    }

    fn refilter(&mut self) {
        if !self.is_filtering() {
            self.filtered = (0..self.all.len()).collect();
            return;
        }

        let needle = self.query.to_lowercase();
        self.filtered = self
            .folded_names
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                name.as_deref()
                    .map_or(false, |name| name.contains(needle.as_str()))
            })
            .map(|(index, _)| index)
            .collect();
    }
}
