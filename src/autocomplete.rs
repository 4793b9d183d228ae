/// Case-insensitive substring match against the catalog, catalog order kept,
/// at most `limit` entries. Empty text matches nothing.
pub fn suggest(catalog: &[String], text: &str, limit: usize) -> Vec<String> {
    let needle = text.to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    catalog
        .iter()
        .filter(|candidate| candidate.to_lowercase().contains(&needle))
        .take(limit)
        .cloned()
        .collect()
}

/// Suggestion popup under the hostname field.
#[derive(Debug, Clone, Default)]
pub struct SuggestionList {
    items: Vec<String>,
    selected: usize,
}

impl SuggestionList {
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_visible(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    pub fn show(&mut self, items: Vec<String>) {
        self.items = items;
        self.selected = 0;
    }

    pub fn hide(&mut self) {
        self.items.clear();
        self.selected = 0;
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn next(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    /// Returns `false` when already at the top.
    pub fn previous(&mut self) -> bool {
        if self.selected == 0 {
            return false;
        }
        self.selected -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn matches_substring_ignoring_case() {
        let catalog = catalog(&["LAB01", "OFFICE02", "LAB-SERVER"]);
        assert_eq!(suggest(&catalog, "lab", 8), vec!["LAB01", "LAB-SERVER"]);
        assert_eq!(suggest(&catalog, "Fic", 8), vec!["OFFICE02"]);
        assert_eq!(suggest(&catalog, "0", 8), vec!["LAB01", "OFFICE02"]);
        assert!(suggest(&catalog, "zzz", 8).is_empty());
        assert!(suggest(&catalog, "", 8).is_empty());
    }

    #[test]
    fn caps_at_limit() {
        let names: Vec<String> = (0..20).map(|i| format!("LAB{i:02}")).collect();
        let matches = suggest(&names, "lab", 8);
        assert_eq!(matches.len(), 8);
        assert_eq!(matches[0], "LAB00");
        assert_eq!(matches[7], "LAB07");
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut list = SuggestionList::default();
        assert!(!list.is_visible());
        assert_eq!(list.selected_item(), None);

        list.show(catalog(&["A", "B"]));
        assert!(list.is_visible());
        list.next();
        list.next();
        assert_eq!(list.selected_item(), Some("B"));
        assert!(list.previous());
        assert!(!list.previous());
        assert_eq!(list.selected_item(), Some("A"));

        list.hide();
        assert!(!list.is_visible());
    }
}
