use std::collections::{BTreeSet, HashSet};

/// Which routes the map shows. Routes are hidden by name, or, in active-only
/// mode, every known route without a vehicle in service is hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityFilter {
    hidden: BTreeSet<String>,
    active_only: bool,
    active: HashSet<String>,
}

impl VisibilityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips a route's manual visibility. Returns whether it is now hidden,
    /// or `None` in active-only mode, where manual choices are locked.
    pub fn toggle(&mut self, route: &str) -> Option<bool> {
        if self.active_only {
            return None;
        }
        if self.hidden.remove(route) {
            Some(false)
        } else {
            self.hidden.insert(route.to_string());
            Some(true)
        }
    }

    pub fn hide(&mut self, route: &str) {
        self.hidden.insert(route.to_string());
    }

    pub fn show(&mut self, route: &str) {
        self.hidden.remove(route);
    }

    pub fn active_only(&self) -> bool {
        self.active_only
    }

    pub fn set_active_only(&mut self, enabled: bool) {
        self.active_only = enabled;
        if !enabled {
            self.active.clear();
        }
    }

    pub fn set_active_routes<I, S>(&mut self, routes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active = routes.into_iter().map(Into::into).collect();
    }

    pub fn hidden(&self) -> &BTreeSet<String> {
        &self.hidden
    }

    pub fn active_routes(&self) -> &HashSet<String> {
        &self.active
    }

    pub fn effective_hidden<'a, I>(&self, known: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.active_only {
            known
                .into_iter()
                .filter(|route| !self.active.contains(*route))
                .map(str::to_string)
                .collect()
        } else {
            self.hidden.clone()
        }
    }

    /// Active-only mode hides any route missing from the active set, known
    /// or not.
    pub fn is_visible(&self, route: &str) -> bool {
        if self.active_only {
            self.active.contains(route)
        } else {
            !self.hidden.contains(route)
        }
    }

    /// Keeps the items whose route is visible. Items with no route name are
    /// kept unless active-only mode is on.
    pub fn filter<T, F>(&self, items: Vec<T>, route_of: F) -> Vec<T>
    where
        F: Fn(&T) -> Option<&str>,
    {
        items
            .into_iter()
            .filter(|item| match route_of(item) {
                Some(route) => self.is_visible(route),
                None => !self.active_only,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [&str; 3] = ["Allston Loop", "Crimson Cruiser", "Quad Yard Express"];

    #[test]
    fn toggle_hides_then_shows() {
        let mut filter = VisibilityFilter::new();

        assert_eq!(filter.toggle("Allston Loop"), Some(true));
        assert!(!filter.is_visible("Allston Loop"));
        assert_eq!(filter.toggle("Allston Loop"), Some(false));
        assert!(filter.is_visible("Allston Loop"));
    }

    #[test]
    fn toggles_are_locked_in_active_only_mode() {
        let mut filter = VisibilityFilter::new();
        filter.hide("Crimson Cruiser");
        filter.set_active_only(true);

        assert_eq!(filter.toggle("Allston Loop"), None);
        assert_eq!(filter.toggle("Crimson Cruiser"), None);

        filter.set_active_only(false);
        assert!(filter.is_visible("Allston Loop"));
        assert!(!filter.is_visible("Crimson Cruiser"));
    }

    #[test]
    fn manual_hidden_set_is_effective_by_default() {
        let mut filter = VisibilityFilter::new();
        filter.hide("Crimson Cruiser");

        let hidden = filter.effective_hidden(KNOWN);
        assert_eq!(hidden.into_iter().collect::<Vec<_>>(), vec!["Crimson Cruiser"]);
    }

    #[test]
    fn active_only_overrides_manual_choices() {
        let mut filter = VisibilityFilter::new();
        filter.hide("Crimson Cruiser");
        filter.set_active_only(true);
        filter.set_active_routes(["Crimson Cruiser"]);

        let hidden = filter.effective_hidden(KNOWN);
        assert_eq!(
            hidden.into_iter().collect::<Vec<_>>(),
            vec!["Allston Loop", "Quad Yard Express"]
        );
        assert!(filter.is_visible("Crimson Cruiser"));
        assert!(!filter.is_visible("Allston Loop"));
    }

    #[test]
    fn leaving_active_only_restores_manual_set() {
        let mut filter = VisibilityFilter::new();
        filter.hide("Quad Yard Express");
        filter.set_active_only(true);
        filter.set_active_routes(["Allston Loop"]);
        filter.set_active_only(false);

        assert!(filter.active_routes().is_empty());
        assert!(filter.is_visible("Allston Loop"));
        assert!(!filter.is_visible("Quad Yard Express"));
    }

    #[test]
    fn filter_keeps_visible_items() {
        let mut filter = VisibilityFilter::new();
        filter.hide("Allston Loop");

        let items = vec![Some("Allston Loop"), Some("Crimson Cruiser"), None];
        let kept = filter.filter(items, |item| *item);
        assert_eq!(kept, vec![Some("Crimson Cruiser"), None]);

        filter.set_active_only(true);
        filter.set_active_routes(["Allston Loop"]);
        let items = vec![Some("Allston Loop"), Some("Crimson Cruiser"), None];
        assert_eq!(filter.filter(items, |item| *item), vec![Some("Allston Loop")]);
    }
}
