use std::collections::BTreeSet;

/// Which cells commands are sent to
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// All cells in catalog order
    cells: Vec<String>,
    active: BTreeSet<String>,
}

impl Selection {
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            cells,
            active: BTreeSet::new(),
        }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains(id)
    }

    pub fn has_selection(&self) -> bool {
        !self.active.is_empty()
    }

    /// Flip one cell; unknown ids are ignored
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.cells.iter().any(|c| c == id) {
            log::warn!("toggle: unknown cell {}", id);
            return false;
        }
        if !self.active.remove(id) {
            self.active.insert(id.to_string());
        }
        true
    }

    /// Select everything when nothing is selected, otherwise clear
    pub fn toggle_all(&mut self) {
        if self.active.is_empty() {
            self.active = self.cells.iter().cloned().collect();
        } else {
            self.active.clear();
        }
    }

    /// Active cells in catalog order
    pub fn active_cells(&self) -> impl Iterator<Item = &str> {
        self.cells
            .iter()
            .filter(|c| self.active.contains(c.as_str()))
            .map(String::as_str)
    }

    /// Command suffix addressing the active cells
    pub fn selector(&self) -> String {
        self.active_cells().map(|c| format!(" on {}", c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> Selection {
        Selection::new(vec!["a1".into(), "a2".into(), "b1".into()])
    }

    #[test]
    fn test_toggle() {
        let mut sel = selection();
        assert!(sel.toggle("b1"));
        assert!(sel.toggle("a1"));
        assert_eq!(sel.selector(), " on a1 on b1");
        sel.toggle("a1");
        assert_eq!(sel.selector(), " on b1");
        assert!(!sel.toggle("zz"));
    }

    #[test]
    fn test_toggle_all() {
        let mut sel = selection();
        sel.toggle_all();
        assert_eq!(sel.active_cells().count(), 3);
        sel.toggle_all();
        assert!(!sel.has_selection());

        // Partial selection clears
        sel.toggle("a2");
        sel.toggle_all();
        assert!(!sel.has_selection());
        assert_eq!(sel.selector(), "");
    }
}
