use std::collections::{HashSet, VecDeque};

use super::index::CompositionIndex;
use super::tier::{Tier, TierLists};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterNode {
    pub id: String,
    pub tier: Tier,
}

/// `component` is a direct structural constituent of `composite`. Direction is
/// always component -> composite, also for the reverse-expansion edges.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompositionEdge {
    pub component: String,
    pub composite: String,
}

#[derive(Clone, Debug, Default)]
pub struct CompositionGraph {
    pub nodes: Vec<CharacterNode>,
    pub links: Vec<CompositionEdge>,
}

impl CompositionGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }
}

/// Both graph variants for one focus character. Built exactly once per focus
/// change and immutable for the lifetime of that focus; `decomposition_only`
/// is a subgraph of `decomposition_plus_reverse`.
#[derive(Clone, Debug)]
pub struct DualGraph {
    pub focus_id: String,
    pub decomposition_only: CompositionGraph,
    pub decomposition_plus_reverse: CompositionGraph,
}

impl DualGraph {
    pub fn variant(&self, with_reverse_links: bool) -> &CompositionGraph {
        if with_reverse_links {
            &self.decomposition_plus_reverse
        } else {
            &self.decomposition_only
        }
    }
}

struct GraphAccumulator {
    nodes: Vec<CharacterNode>,
    links: Vec<CompositionEdge>,
    node_ids: HashSet<String>,
    link_keys: HashSet<(String, String)>,
}

impl GraphAccumulator {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            node_ids: HashSet::new(),
            link_keys: HashSet::new(),
        }
    }

    fn add_node(&mut self, id: &str, tiers: &TierLists, focus_id: &str) {
        if self.node_ids.insert(id.to_owned()) {
            self.nodes.push(CharacterNode {
                id: id.to_owned(),
                tier: tiers.classify(id, focus_id),
            });
        }
    }

    fn add_link(&mut self, component: &str, composite: &str) {
        if component == composite {
            return;
        }
        if self
            .link_keys
            .insert((component.to_owned(), composite.to_owned()))
        {
            self.links.push(CompositionEdge {
                component: component.to_owned(),
                composite: composite.to_owned(),
            });
        }
    }

    fn finish(self) -> CompositionGraph {
        CompositionGraph {
            nodes: self.nodes,
            links: self.links,
        }
    }
}

/// Builds both variants for `focus_id`.
///
/// Decomposition is a breadth-first walk over the index with a visited set,
/// so shared sub-components collapse to one node and cycles through
/// already-visited characters stop expanding instead of recursing forever.
/// The reverse expansion is one hop from the focus only: composites that use
/// the focus directly gain a node and a focus -> composite edge, and nothing
/// inside those composites is walked.
pub fn build_dual_graph(
    index: &CompositionIndex,
    tiers: &TierLists,
    focus_id: &str,
) -> DualGraph {
    let mut base = GraphAccumulator::new();
    base.add_node(focus_id, tiers, focus_id);

    let mut visited = HashSet::from([focus_id.to_owned()]);
    let mut queue = VecDeque::from([focus_id.to_owned()]);

    while let Some(current) = queue.pop_front() {
        for component in index.direct_components(&current) {
            if component == &current {
                continue;
            }

            base.add_node(component, tiers, focus_id);
            base.add_link(component, &current);

            if visited.insert(component.clone()) {
                queue.push_back(component.clone());
            }
        }
    }

    let decomposition_only = base.finish();

    let mut expanded = GraphAccumulator::new();
    for node in &decomposition_only.nodes {
        expanded.add_node(&node.id, tiers, focus_id);
    }
    for link in &decomposition_only.links {
        expanded.add_link(&link.component, &link.composite);
    }
    for composite in index.used_as_component_in(focus_id) {
        expanded.add_node(composite, tiers, focus_id);
        expanded.add_link(focus_id, composite);
    }

    DualGraph {
        focus_id: focus_id.to_owned(),
        decomposition_only,
        decomposition_plus_reverse: expanded.finish(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn index(entries: &[(&str, &[&str])]) -> CompositionIndex {
        CompositionIndex::from_entries(
            entries
                .iter()
                .map(|(id, components)| {
                    (
                        (*id).to_owned(),
                        components.iter().map(|c| (*c).to_owned()).collect(),
                    )
                })
                .collect::<HashMap<_, _>>(),
        )
    }

    fn tiers() -> TierLists {
        TierLists::new(vec!["木".to_owned(), "人".to_owned()], vec![])
    }

    fn link_set(graph: &CompositionGraph) -> HashSet<(String, String)> {
        graph
            .links
            .iter()
            .map(|link| (link.component.clone(), link.composite.clone()))
            .collect()
    }

    fn node_set(graph: &CompositionGraph) -> HashSet<String> {
        graph.nodes.iter().map(|node| node.id.clone()).collect()
    }

    #[test]
    fn focus_is_present_and_base_is_subgraph_of_expanded() {
        let index = index(&[
            ("休", &["人", "木"]),
            ("人", &[]),
            ("木", &[]),
            ("森", &["木", "木", "木"]),
        ]);
        let dual = build_dual_graph(&index, &tiers(), "木");

        assert!(dual.decomposition_only.contains_node("木"));
        assert!(node_set(&dual.decomposition_only)
            .is_subset(&node_set(&dual.decomposition_plus_reverse)));
        assert!(link_set(&dual.decomposition_only)
            .is_subset(&link_set(&dual.decomposition_plus_reverse)));
    }

    #[test]
    fn no_duplicate_nodes_or_links() {
        let index = index(&[("林", &["木", "木"]), ("木", &[])]);
        let dual = build_dual_graph(&index, &tiers(), "林");

        let graph = &dual.decomposition_only;
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.link_count(), 1);
        assert_eq!(graph.links[0].component, "木");
        assert_eq!(graph.links[0].composite, "林");
    }

    #[test]
    fn diamond_composition_collapses_to_one_node() {
        // Both arms reach 木 along different paths.
        let index = index(&[
            ("X", &["林", "休"]),
            ("林", &["木"]),
            ("休", &["人", "木"]),
            ("木", &[]),
            ("人", &[]),
        ]);
        let dual = build_dual_graph(&index, &tiers(), "X");

        let graph = &dual.decomposition_only;
        assert_eq!(
            graph
                .nodes
                .iter()
                .filter(|node| node.id == "木")
                .count(),
            1
        );
        assert!(link_set(graph).contains(&("木".to_owned(), "林".to_owned())));
        assert!(link_set(graph).contains(&("木".to_owned(), "休".to_owned())));
    }

    #[test]
    fn cyclic_entries_terminate() {
        let index = index(&[("A", &["B"]), ("B", &["C"]), ("C", &["A"])]);
        let dual = build_dual_graph(&index, &tiers(), "A");

        let graph = &dual.decomposition_only;
        assert_eq!(graph.node_count(), 3);
        assert!(graph.link_count() <= 3);
    }

    #[test]
    fn self_reference_is_ignored() {
        let index = index(&[("回", &["回", "口"]), ("口", &[])]);
        let dual = build_dual_graph(&index, &tiers(), "回");

        let graph = &dual.decomposition_only;
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.link_count(), 1);
        assert!(!link_set(graph).contains(&("回".to_owned(), "回".to_owned())));
    }

    #[test]
    fn reverse_expansion_is_one_hop_from_focus_only() {
        let index = index(&[
            ("休", &["人", "木"]),
            ("人", &[]),
            ("木", &[]),
            ("森", &["木", "木", "木"]),
        ]);

        assert_eq!(index.used_as_component_in("木"), ["休", "森"]);

        let dual = build_dual_graph(&index, &tiers(), "休");
        let expanded = &dual.decomposition_plus_reverse;

        // 休 is not used by anything, so the reverse hop from 休 adds nothing.
        assert_eq!(
            node_set(expanded),
            node_set(&dual.decomposition_only)
        );

        let dual = build_dual_graph(&index, &tiers(), "木");
        let expanded = &dual.decomposition_plus_reverse;

        assert!(expanded.contains_node("森"));
        assert!(expanded.contains_node("休"));
        let links = link_set(expanded);
        assert!(links.contains(&("木".to_owned(), "森".to_owned())));
        assert!(links.contains(&("木".to_owned(), "休".to_owned())));
        // One hop only: 休's own components are not pulled in.
        assert!(!expanded.contains_node("人"));
        assert!(!links.contains(&("人".to_owned(), "休".to_owned())));
    }

    #[test]
    fn reverse_step_adds_exactly_one_edge_per_composite() {
        let index = index(&[
            ("休", &["人", "木"]),
            ("人", &[]),
            ("木", &[]),
            ("森", &["木", "木", "木"]),
        ]);
        let dual = build_dual_graph(&index, &tiers(), "木");

        let extra_links = link_set(&dual.decomposition_plus_reverse)
            .difference(&link_set(&dual.decomposition_only))
            .cloned()
            .collect::<HashSet<_>>();
        assert_eq!(
            extra_links,
            HashSet::from([
                ("木".to_owned(), "休".to_owned()),
                ("木".to_owned(), "森".to_owned()),
            ])
        );
    }

    #[test]
    fn unknown_focus_yields_single_focus_node() {
        let index = index(&[("木", &[])]);
        let dual = build_dual_graph(&index, &tiers(), "鬱");

        for graph in [&dual.decomposition_only, &dual.decomposition_plus_reverse] {
            assert_eq!(graph.node_count(), 1);
            assert_eq!(graph.link_count(), 0);
            assert_eq!(graph.nodes[0].id, "鬱");
            assert_eq!(graph.nodes[0].tier, Tier::Focus);
        }
    }

    #[test]
    fn nodes_are_tier_classified_against_the_focus() {
        let index = index(&[("休", &["人", "木"]), ("人", &[]), ("木", &[])]);
        let dual = build_dual_graph(&index, &tiers(), "休");

        let tier_of = |id: &str| {
            dual.decomposition_only
                .nodes
                .iter()
                .find(|node| node.id == id)
                .map(|node| node.tier)
        };
        assert_eq!(tier_of("休"), Some(Tier::Focus));
        assert_eq!(tier_of("人"), Some(Tier::Common));
        assert_eq!(tier_of("木"), Some(Tier::Common));
    }

    #[test]
    fn every_link_endpoint_exists_in_nodes() {
        let index = index(&[
            ("休", &["人", "木"]),
            ("人", &[]),
            ("木", &[]),
            ("森", &["木", "木", "木"]),
        ]);
        let dual = build_dual_graph(&index, &tiers(), "木");

        for graph in [&dual.decomposition_only, &dual.decomposition_plus_reverse] {
            let ids = node_set(graph);
            for link in &graph.links {
                assert!(ids.contains(&link.component));
                assert!(ids.contains(&link.composite));
            }
        }
    }

    #[test]
    fn repeated_builds_are_idempotent() {
        let index = index(&[
            ("休", &["人", "木"]),
            ("人", &[]),
            ("木", &[]),
            ("森", &["木", "木", "木"]),
        ]);

        let first = build_dual_graph(&index, &tiers(), "木");
        let second = build_dual_graph(&index, &tiers(), "木");

        assert_eq!(
            node_set(&first.decomposition_only),
            node_set(&second.decomposition_only)
        );
        assert_eq!(
            link_set(&first.decomposition_plus_reverse),
            link_set(&second.decomposition_plus_reverse)
        );
    }
}
