use std::collections::HashMap;

/// Read-only composition dictionary plus its derived reverse index.
///
/// `direct_components` keeps the dictionary's component order; the reverse
/// index is built once here by inverting every entry. Unknown ids resolve to
/// empty results, never errors, so an unrecognized character can still render
/// as an isolated node.
#[derive(Clone, Debug, Default)]
pub struct CompositionIndex {
    components: HashMap<String, Vec<String>>,
    used_in: HashMap<String, Vec<String>>,
}

impl CompositionIndex {
    pub fn from_entries(entries: HashMap<String, Vec<String>>) -> Self {
        let mut components = HashMap::with_capacity(entries.len());
        for (id, list) in entries {
            let list = list
                .into_iter()
                .filter(|component| !component.is_empty() && component != &id)
                .collect::<Vec<_>>();
            components.insert(id, list);
        }

        let mut used_in: HashMap<String, Vec<String>> = HashMap::new();
        for (composite, list) in &components {
            for component in list {
                let composites = used_in.entry(component.clone()).or_default();
                if !composites.contains(composite) {
                    composites.push(composite.clone());
                }
            }
        }
        for composites in used_in.values_mut() {
            composites.sort();
        }

        Self {
            components,
            used_in,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    pub fn direct_components(&self, id: &str) -> &[String] {
        self.components.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn used_as_component_in(&self, id: &str) -> &[String] {
        self.used_in.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn character_count(&self) -> usize {
        self.components.len()
    }

    pub fn character_ids(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> CompositionIndex {
        CompositionIndex::from_entries(HashMap::from([
            ("休".to_owned(), vec!["人".to_owned(), "木".to_owned()]),
            ("人".to_owned(), vec![]),
            ("木".to_owned(), vec![]),
            (
                "森".to_owned(),
                vec!["木".to_owned(), "木".to_owned(), "木".to_owned()],
            ),
        ]))
    }

    #[test]
    fn direct_components_preserve_order() {
        let index = index();
        assert_eq!(index.direct_components("休"), ["人", "木"]);
        assert_eq!(index.direct_components("木"), [] as [&str; 0]);
    }

    #[test]
    fn reverse_index_inverts_every_entry() {
        let index = index();
        assert_eq!(index.used_as_component_in("木"), ["休", "森"]);
        assert_eq!(index.used_as_component_in("人"), ["休"]);
        assert_eq!(index.used_as_component_in("休"), [] as [&str; 0]);
    }

    #[test]
    fn unknown_ids_resolve_empty() {
        let index = index();
        assert!(!index.contains("鬱"));
        assert!(index.direct_components("鬱").is_empty());
        assert!(index.used_as_component_in("鬱").is_empty());
    }

    #[test]
    fn self_references_are_dropped_at_construction() {
        let index = CompositionIndex::from_entries(HashMap::from([(
            "回".to_owned(),
            vec!["回".to_owned(), "口".to_owned()],
        )]));
        assert_eq!(index.direct_components("回"), ["口"]);
        assert!(index.used_as_component_in("回").is_empty());
    }
}
