pub const PUSH_TAB: &str = "push";
pub const BULK_TAB: &str = "bulk";
pub const SESSIONS_TAB: &str = "sessions";
pub const LIVE_TAB: &str = "live";
pub const HISTORY_TAB: &str = "history";

/// Console panels, in display order.
pub const PANELS: [&str; 5] = [PUSH_TAB, BULK_TAB, SESSIONS_TAB, LIVE_TAB, HISTORY_TAB];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Panel {
    id: String,
    active: bool,
}

/// A fixed set of mutually exclusive panels, at most one active.
#[derive(Debug, Clone)]
pub struct TabController {
    panels: Vec<Panel>,
}

impl TabController {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut panels: Vec<Panel> = Vec::new();
        for id in ids {
            let id = id.into();
            if panels.iter().any(|p| p.id == id) {
                continue;
            }
            panels.push(Panel { id, active: false });
        }
        Self { panels }
    }

    /// Deactivates every panel, then activates `tab_id`.
    ///
    /// An unknown id leaves every panel inactive and returns `false`.
    pub fn show_tab(&mut self, tab_id: &str) -> bool {
        for panel in &mut self.panels {
            panel.active = false;
        }

        match self.panels.iter_mut().find(|p| p.id == tab_id) {
            Some(panel) => {
                panel.active = true;
                true
            }
            None => {
                tracing::debug!("No panel named {:?}", tab_id);
                false
            }
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.panels
            .iter()
            .find(|p| p.active)
            .map(|p| p.id.as_str())
    }

    pub fn is_active(&self, tab_id: &str) -> bool {
        self.panels.iter().any(|p| p.active && p.id == tab_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.panels.iter().map(|p| p.id.as_str())
    }
}

impl Default for TabController {
    fn default() -> Self {
        let mut tabs = Self::new(PANELS);
        tabs.show_tab(PUSH_TAB);
        tabs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switching_leaves_one_active() {
        let mut tabs = TabController::new(["foo", "bar", "baz"]);
        assert!(tabs.show_tab("foo"));
        assert!(tabs.show_tab("bar"));
        assert!(tabs.is_active("bar"));
        assert!(!tabs.is_active("foo"));
        assert_eq!(tabs.active(), Some("bar"));
    }

    #[test]
    fn test_every_pair_of_panels() {
        for a in PANELS {
            for b in PANELS.iter().filter(|b| **b != a) {
                let mut tabs = TabController::new(PANELS);
                tabs.show_tab(a);
                tabs.show_tab(b);
                let active: Vec<&str> = tabs.ids().filter(|id| tabs.is_active(id)).collect();
                assert_eq!(active, vec![*b]);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let mut tabs = TabController::default();
        tabs.show_tab(LIVE_TAB);
        tabs.show_tab(LIVE_TAB);
        assert_eq!(tabs.active(), Some(LIVE_TAB));
    }

    #[test]
    fn test_unknown_id_deactivates_all() {
        let mut tabs = TabController::default();
        assert_eq!(tabs.active(), Some(PUSH_TAB));
        assert!(!tabs.show_tab("missing"));
        assert_eq!(tabs.active(), None);
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let tabs = TabController::new(["a", "a", "b"]);
        assert_eq!(tabs.ids().count(), 2);
    }
}
