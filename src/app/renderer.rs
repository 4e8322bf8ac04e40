use std::collections::{HashMap, HashSet};

use eframe::egui::{Color32, Rect, Ui};

use crate::kanji::{CompositionGraph, Tier};
use crate::util::{stable_pair, stable_unit};

use super::physics::LayoutVec;

/// Per-frame inputs every renderer receives from the orchestrator. A change
/// of `focus_trigger` (any change, regardless of delta) means "recenter and
/// fit the view now"; a change of `graph_revision` means the node/link set
/// swapped underneath the running layout.
pub struct FrameInput<'a> {
    pub focus_id: &'a str,
    pub graph_revision: u64,
    pub focus_trigger: u64,
    pub show_flow_particles: bool,
    pub auto_rotate: bool,
    pub dt: f32,
}

#[derive(Default)]
pub struct RendererOutput {
    pub navigate_to: Option<String>,
    pub keep_animating: bool,
}

/// The one contract both projections implement; the orchestrator is written
/// against this trait and mounts exactly one implementation at a time.
/// Dropping the renderer ends its layout and animation state.
pub trait GraphRenderer {
    fn show(
        &mut self,
        ui: &mut Ui,
        rect: Rect,
        graph: &CompositionGraph,
        frame: &FrameInput<'_>,
    ) -> RendererOutput;
}

pub struct LayoutNode<V> {
    pub id: String,
    pub tier: Tier,
    pub pos: V,
    pub vel: V,
}

pub struct LayoutEdge {
    pub component: usize,
    pub composite: usize,
    pub outward: bool,
    pub particle_phase: f32,
}

/// Simulation-side mirror of the displayed graph variant, generic over the
/// projection's vector type. Re-synced whenever the graph revision changes:
/// surviving nodes keep position and velocity, new nodes are seeded next to a
/// neighbor that is already laid out (with a stable per-id jitter) so a
/// variant toggle never snaps the picture.
pub struct LayoutState<V> {
    pub nodes: Vec<LayoutNode<V>>,
    pub edges: Vec<LayoutEdge>,
    pub index_by_id: HashMap<String, usize>,
    synced_revision: Option<u64>,
}

pub const SEED_RADIUS: f32 = 110.0;
pub const NEIGHBOR_JITTER: f32 = 34.0;
/// Edge traversals per second for flow particles.
pub const PARTICLE_RATE: f32 = 0.45;

impl<V: LayoutVec> LayoutState<V> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            index_by_id: HashMap::new(),
            synced_revision: None,
        }
    }

    pub fn sync_if_needed(&mut self, graph: &CompositionGraph, revision: u64, focus_id: &str) {
        if self.synced_revision != Some(revision) {
            self.sync(graph, focus_id);
            self.synced_revision = Some(revision);
        }
    }

    fn sync(&mut self, graph: &CompositionGraph, focus_id: &str) {
        let mut prior_phases = HashMap::with_capacity(self.edges.len());
        for edge in &self.edges {
            if let (Some(component), Some(composite)) =
                (self.nodes.get(edge.component), self.nodes.get(edge.composite))
            {
                prior_phases.insert(
                    (component.id.clone(), composite.id.clone()),
                    edge.particle_phase,
                );
            }
        }

        let mut prior_nodes = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect::<HashMap<_, _>>();

        let mut next_nodes = Vec::with_capacity(graph.nodes.len());
        let mut index_by_id = HashMap::with_capacity(graph.nodes.len());
        let mut pending = Vec::new();

        for node in &graph.nodes {
            let index = next_nodes.len();
            index_by_id.insert(node.id.clone(), index);

            if let Some(mut kept) = prior_nodes.remove(&node.id) {
                kept.tier = node.tier;
                next_nodes.push(kept);
            } else {
                pending.push(index);
                next_nodes.push(LayoutNode {
                    id: node.id.clone(),
                    tier: node.tier,
                    pos: Self::ring_seed(&node.id),
                    vel: V::zero(),
                });
            }
        }

        // Seed newcomers next to an already-placed neighbor; the ring seed
        // above only stands when no link touches anything laid out yet
        // (initial mount, isolated node).
        let pending_set = pending.iter().copied().collect::<HashSet<_>>();
        for &index in &pending {
            let id = next_nodes[index].id.clone();
            let neighbor = graph.links.iter().find_map(|link| {
                let other = if link.component == id {
                    &link.composite
                } else if link.composite == id {
                    &link.component
                } else {
                    return None;
                };
                index_by_id
                    .get(other)
                    .filter(|other_index| !pending_set.contains(*other_index))
                    .copied()
            });

            if let Some(neighbor_index) = neighbor {
                let (jx, jy) = stable_pair(&id);
                let jz = (stable_unit(&id) * 2.0) - 1.0;
                next_nodes[index].pos = next_nodes[neighbor_index]
                    .pos
                    .add(V::from_units(jx, jy, jz).scale(NEIGHBOR_JITTER));
            }
        }

        let mut edges = Vec::with_capacity(graph.links.len());
        for link in &graph.links {
            let (Some(&component), Some(&composite)) = (
                index_by_id.get(&link.component),
                index_by_id.get(&link.composite),
            ) else {
                continue;
            };

            let key = (link.component.clone(), link.composite.clone());
            let particle_phase = prior_phases
                .get(&key)
                .copied()
                .unwrap_or_else(|| stable_unit(&format!("{}>{}", link.component, link.composite)));

            edges.push(LayoutEdge {
                component,
                composite,
                outward: link.component == focus_id,
                particle_phase,
            });
        }

        self.nodes = next_nodes;
        self.edges = edges;
        self.index_by_id = index_by_id;
    }

    fn ring_seed(id: &str) -> V {
        let (ux, uy) = stable_pair(id);
        let uz = (stable_unit(id) * 2.0) - 1.0;
        let seed = V::from_units(ux, uy, uz);
        let length = seed.length();
        if length <= 0.0001 {
            V::from_units(0.31, -0.77, 0.42).scale(SEED_RADIUS)
        } else {
            // Between half and full seed radius, never all at one point.
            seed.scale((0.5 + 0.5 * stable_unit(id)) * SEED_RADIUS / length)
        }
    }

    pub fn advance_particles(&mut self, dt: f32) {
        for edge in &mut self.edges {
            edge.particle_phase = (edge.particle_phase + dt * PARTICLE_RATE).fract();
        }
    }
}

pub fn tier_color(tier: Tier) -> Color32 {
    match tier {
        Tier::Focus => Color32::from_rgb(246, 196, 84),
        Tier::Common => Color32::from_rgb(96, 166, 236),
        Tier::ProperName => Color32::from_rgb(122, 196, 112),
        Tier::Rare => Color32::from_rgb(148, 148, 156),
    }
}

pub fn tier_radius(tier: Tier) -> f32 {
    match tier {
        Tier::Focus => 26.0,
        _ => 17.0,
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::Vec2;

    use crate::kanji::{CharacterNode, CompositionEdge, Tier};

    use super::*;

    fn graph(nodes: &[&str], links: &[(&str, &str)]) -> CompositionGraph {
        CompositionGraph {
            nodes: nodes
                .iter()
                .map(|id| CharacterNode {
                    id: (*id).to_owned(),
                    tier: Tier::Rare,
                })
                .collect(),
            links: links
                .iter()
                .map(|(component, composite)| CompositionEdge {
                    component: (*component).to_owned(),
                    composite: (*composite).to_owned(),
                })
                .collect(),
        }
    }

    #[test]
    fn sync_preserves_surviving_positions_and_velocities() {
        let mut layout = LayoutState::<Vec2>::new();
        layout.sync_if_needed(&graph(&["木", "林"], &[("木", "林")]), 1, "林");

        let moved = Vec2::new(40.0, -12.0);
        let speed = Vec2::new(3.0, 1.0);
        layout.nodes[0].pos = moved;
        layout.nodes[0].vel = speed;

        layout.sync_if_needed(
            &graph(&["木", "林", "森"], &[("木", "林"), ("木", "森")]),
            2,
            "林",
        );

        let kept = &layout.nodes[layout.index_by_id["木"]];
        assert_eq!(kept.pos, moved);
        assert_eq!(kept.vel, speed);
    }

    #[test]
    fn new_nodes_seed_near_an_existing_neighbor() {
        let mut layout = LayoutState::<Vec2>::new();
        layout.sync_if_needed(&graph(&["木", "林"], &[("木", "林")]), 1, "林");

        let anchor = Vec2::new(200.0, 150.0);
        layout.nodes[layout.index_by_id["木"]].pos = anchor;

        layout.sync_if_needed(
            &graph(&["木", "林", "森"], &[("木", "林"), ("木", "森")]),
            2,
            "林",
        );

        let seeded = layout.nodes[layout.index_by_id["森"]].pos;
        assert!(seeded.sub(anchor).length() <= NEIGHBOR_JITTER * 2.0);
        assert_ne!(seeded, Vec2::ZERO);
    }

    #[test]
    fn sync_is_a_no_op_for_the_same_revision() {
        let mut layout = LayoutState::<Vec2>::new();
        layout.sync_if_needed(&graph(&["木"], &[]), 7, "木");

        let moved = Vec2::new(-80.0, 5.0);
        layout.nodes[0].pos = moved;
        layout.sync_if_needed(&graph(&["木"], &[]), 7, "木");
        assert_eq!(layout.nodes[0].pos, moved);
    }

    #[test]
    fn outward_edges_are_flagged_by_focus_component() {
        let mut layout = LayoutState::<Vec2>::new();
        layout.sync_if_needed(
            &graph(&["木", "林", "森"], &[("木", "林"), ("木", "森")]),
            1,
            "木",
        );
        assert!(layout.edges.iter().all(|edge| edge.outward));

        layout.sync_if_needed(&graph(&["木", "林"], &[("木", "林")]), 2, "林");
        assert!(layout.edges.iter().all(|edge| !edge.outward));
    }

    #[test]
    fn particle_phases_loop_and_survive_resync() {
        let mut layout = LayoutState::<Vec2>::new();
        layout.sync_if_needed(&graph(&["木", "林"], &[("木", "林")]), 1, "林");

        layout.edges[0].particle_phase = 0.9;
        layout.advance_particles(0.5);
        let advanced = layout.edges[0].particle_phase;
        assert!((0.0..1.0).contains(&advanced));

        layout.sync_if_needed(
            &graph(&["木", "林", "森"], &[("木", "林"), ("木", "森")]),
            2,
            "林",
        );
        let kept = layout
            .edges
            .iter()
            .find(|edge| layout.nodes[edge.composite].id == "林")
            .unwrap();
        assert_eq!(kept.particle_phase, advanced);
    }
}
