/// Tuning knobs for a [Reflower](crate::reflow::Reflower). The defaults suit
/// interactive editing of typical documents; hosts with very large pages or very slow
/// measurement may want a smaller batch budget so that they get control back sooner.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflowOptions {
    /// Number of primitive tree writes (committed moves and tentative text cuts)
    /// performed before control is handed back to the host's frame scheduler. Never
    /// less than 1. A text cut is never started in a batch that cannot hold all of
    /// its tentative writes.
    pub batch_budget: usize,
    /// Element names that always move as a whole (headings, table rows, ...),
    /// compared case-insensitively
    pub atomic_elements: Vec<String>,
    /// Length of generated lineage tags
    pub tag_length: usize,
}

/// Default number of moves per scheduling turn
pub const DEFAULT_BATCH_BUDGET: usize = 1000;

/// Default length of generated lineage tags
pub const DEFAULT_TAG_LENGTH: usize = 12;

impl Default for ReflowOptions {
    fn default() -> Self {
        ReflowOptions {
            batch_budget: DEFAULT_BATCH_BUDGET,
            atomic_elements: ["h1", "h2", "h3", "h4", "h5", "h6", "tr"]
                .into_iter()
                .map(String::from)
                .collect(),
            tag_length: DEFAULT_TAG_LENGTH,
        }
    }
}

impl ReflowOptions {
    /// Options that treat no element name as atomic. Only leaves, empty containers
    /// and whatever the caller's predicate flags move as a whole.
    pub fn without_atomic_elements() -> ReflowOptions {
        ReflowOptions {
            atomic_elements: Vec::new(),
            ..ReflowOptions::default()
        }
    }

    /// Replace the batch budget, clamping it to at least one move per turn
    pub fn with_batch_budget(&self, batch_budget: usize) -> ReflowOptions {
        ReflowOptions {
            batch_budget: batch_budget.max(1),
            ..self.clone()
        }
    }

    /// Add an element name to the set of atomic units
    pub fn with_atomic_element<S: Into<String>>(&self, name: S) -> ReflowOptions {
        let mut options = self.clone();
        options.atomic_elements.push(name.into());
        options
    }

    /// Replace the length of generated lineage tags (at least one character)
    pub fn with_tag_length(&self, tag_length: usize) -> ReflowOptions {
        ReflowOptions {
            tag_length: tag_length.max(1),
            ..self.clone()
        }
    }

    /// Whether an element named `name` must never be split across pages
    pub fn is_atomic_element(&self, name: &str) -> bool {
        self.atomic_elements
            .iter()
            .any(|atomic| atomic.eq_ignore_ascii_case(name))
    }

    pub(crate) fn budget(&self) -> usize {
        self.batch_budget.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_rows_are_atomic_by_default() {
        let options = ReflowOptions::default();
        assert!(options.is_atomic_element("h2"));
        assert!(options.is_atomic_element("TR"));
        assert!(!options.is_atomic_element("div"));
        assert!(!ReflowOptions::without_atomic_elements().is_atomic_element("h1"));
    }

    #[test]
    fn budget_never_drops_to_zero() {
        let options = ReflowOptions::default().with_batch_budget(0);
        assert_eq!(options.batch_budget, 1);

        let raw = ReflowOptions {
            batch_budget: 0,
            ..ReflowOptions::default()
        };
        assert_eq!(raw.budget(), 1);
    }

    #[test]
    fn builders_chain() {
        let options = ReflowOptions::default()
            .with_atomic_element("figure")
            .with_tag_length(6)
            .with_batch_budget(50);
        assert!(options.is_atomic_element("figure"));
        assert_eq!(options.tag_length, 6);
        assert_eq!(options.batch_budget, 50);
    }
}
