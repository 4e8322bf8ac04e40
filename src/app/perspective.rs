use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, pos2};

use crate::kanji::CompositionGraph;

use super::physics::{LayoutParams, LayoutVec, Vec3, step_layout};
use super::renderer::{FrameInput, GraphRenderer, LayoutState, RendererOutput, tier_color, tier_radius};

const NEAR_PLANE: f32 = 24.0;
const FIT_PADDING: f32 = 56.0;
const CAMERA_EASE: f32 = 6.0;
const ORBIT_SENSITIVITY: f32 = 0.008;
const AUTO_ROTATE_RATE: f32 = 0.45;
const MIN_DISTANCE: f32 = 160.0;
const MAX_DISTANCE: f32 = 4_000.0;

struct Projected {
    screen: Pos2,
    scale: f32,
    depth: f32,
}

/// Perspective projection: the layout lives in 3D and an orbit camera
/// (yaw/pitch around the origin, at `distance`) looks at it. Background drag
/// orbits, the wheel changes the orbit distance, node drag moves the node in
/// its camera-facing plane, and auto-rotate spins the yaw while no drag is
/// active.
pub struct PerspectiveRenderer {
    layout: LayoutState<Vec3>,
    params: LayoutParams,
    yaw: f32,
    pitch: f32,
    distance: f32,
    node_drag: Option<usize>,
    distance_goal: Option<f32>,
    seen_focus_trigger: Option<u64>,
}

impl PerspectiveRenderer {
    pub fn new() -> Self {
        Self {
            layout: LayoutState::new(),
            params: LayoutParams::default(),
            yaw: 0.6,
            pitch: 0.35,
            distance: 760.0,
            node_drag: None,
            distance_goal: None,
            seen_focus_trigger: None,
        }
    }

    fn to_camera(&self, world: Vec3) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();

        let rx = world.x * cos_yaw + world.z * sin_yaw;
        let rz = -world.x * sin_yaw + world.z * cos_yaw;
        let ry = world.y * cos_pitch - rz * sin_pitch;
        let rz = world.y * sin_pitch + rz * cos_pitch;

        Vec3::new(rx, ry, rz)
    }

    fn to_world(&self, camera: Vec3) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let ry = camera.y * cos_pitch + camera.z * sin_pitch;
        let rz = -camera.y * sin_pitch + camera.z * cos_pitch;

        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let rx = camera.x * cos_yaw - rz * sin_yaw;
        let rz = camera.x * sin_yaw + rz * cos_yaw;

        Vec3::new(rx, ry, rz)
    }

    fn project(&self, rect: Rect, world: Vec3) -> Option<Projected> {
        let camera = self.to_camera(world);
        let depth = camera.z + self.distance;
        if depth < NEAR_PLANE {
            return None;
        }

        let scale = rect.height() / depth;
        Some(Projected {
            screen: pos2(
                rect.center().x + camera.x * scale,
                rect.center().y - camera.y * scale,
            ),
            scale,
            depth,
        })
    }

    fn fit_distance(&self, rect: Rect) -> Option<f32> {
        if self.layout.nodes.is_empty() {
            return None;
        }

        let inverse_count = 1.0 / self.layout.nodes.len() as f32;
        let mut centroid = Vec3::ZERO;
        for node in &self.layout.nodes {
            centroid = centroid.add(node.pos.scale(inverse_count));
        }

        let mut radius = 0.0_f32;
        for node in &self.layout.nodes {
            radius = radius.max(node.pos.sub(centroid).length());
        }
        let radius = radius + FIT_PADDING;

        // screen extent of the sphere: radius * (rect.height() / distance)
        // must fit the smaller half-axis.
        let half_extent = (rect.width().min(rect.height()) * 0.5) - FIT_PADDING * 0.5;
        if half_extent <= 0.0 {
            return None;
        }
        Some((radius * rect.height() / half_extent).clamp(MIN_DISTANCE, MAX_DISTANCE))
    }

    fn animate_camera(&mut self, dt: f32) -> bool {
        let Some(goal) = self.distance_goal else {
            return false;
        };

        let blend = (CAMERA_EASE * dt).clamp(0.0, 1.0);
        self.distance += (goal - self.distance) * blend;
        if (goal - self.distance).abs() < 1.0 {
            self.distance = goal;
            self.distance_goal = None;
        }
        true
    }

    fn handle_zoom(&mut self, ui: &Ui, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        self.distance_goal = None;
        let factor = (1.0 - (scroll * 0.0018)).clamp(0.85, 1.15);
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    fn hovered_index(&self, rect: Rect, pointer: Option<Pos2>) -> Option<usize> {
        let pointer = pointer?;
        if !rect.contains(pointer) {
            return None;
        }

        self.layout
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let projected = self.project(rect, node.pos)?;
                let radius = (tier_radius(node.tier) * projected.scale).clamp(6.0, 56.0);
                let distance = projected.screen.distance(pointer);
                (distance <= radius).then_some((index, distance, projected.depth))
            })
            // Prefer the closest hit on screen, nearest to the camera on ties.
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.2.total_cmp(&b.2)))
            .map(|(index, _, _)| index)
    }
}

impl GraphRenderer for PerspectiveRenderer {
    fn show(
        &mut self,
        ui: &mut Ui,
        rect: Rect,
        graph: &CompositionGraph,
        frame: &FrameInput<'_>,
    ) -> RendererOutput {
        self.layout
            .sync_if_needed(graph, frame.graph_revision, frame.focus_id);

        if self.seen_focus_trigger != Some(frame.focus_trigger) {
            if self.seen_focus_trigger.is_some() {
                self.distance_goal = self.fit_distance(rect);
            }
            self.seen_focus_trigger = Some(frame.focus_trigger);
        }

        let response = ui.allocate_rect(rect, Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(15, 17, 23));

        self.handle_zoom(ui, &response);

        let pointer = ui.input(|input| input.pointer.hover_pos());
        let hovered = self.hovered_index(rect, pointer);

        if response.drag_started_by(egui::PointerButton::Primary) {
            self.node_drag = hovered;
        }
        if !response.dragged_by(egui::PointerButton::Primary) {
            self.node_drag = None;
        }

        let drag_active = response.dragged();
        if let Some(dragged_index) = self.node_drag {
            // Move the node in the camera-facing plane at its current depth.
            let delta = response.drag_delta();
            if delta != egui::Vec2::ZERO {
                if let Some(projected) = self
                    .layout
                    .nodes
                    .get(dragged_index)
                    .and_then(|node| self.project(rect, node.pos))
                {
                    let camera_delta = Vec3::new(
                        delta.x / projected.scale,
                        -delta.y / projected.scale,
                        0.0,
                    );
                    let world_delta = self.to_world(camera_delta);
                    let node = &mut self.layout.nodes[dragged_index];
                    node.pos = node.pos.add(world_delta);
                    node.vel = Vec3::ZERO;
                }
            }
        } else if drag_active {
            let delta = response.drag_delta();
            self.yaw += delta.x * ORBIT_SENSITIVITY;
            self.pitch = (self.pitch + delta.y * ORBIT_SENSITIVITY).clamp(-1.45, 1.45);
        }

        // Auto-rotate yields to any in-progress drag and resumes on release.
        if frame.auto_rotate && !drag_active {
            self.yaw += AUTO_ROTATE_RATE * frame.dt;
        }

        let physics_moving = step_layout(
            &mut self.layout.nodes,
            &self.layout.edges,
            &self.params,
            frame.dt,
            self.node_drag,
        );
        if frame.show_flow_particles {
            self.layout.advance_particles(frame.dt);
        }
        let camera_moving = self.animate_camera(frame.dt);

        let depth_fade = |depth: f32| -> f32 {
            (1.35 - (depth / (self.distance * 2.2))).clamp(0.25, 1.0)
        };

        for edge in &self.layout.edges {
            let (Some(start), Some(end)) = (
                self.project(rect, self.layout.nodes[edge.component].pos),
                self.project(rect, self.layout.nodes[edge.composite].pos),
            ) else {
                continue;
            };

            let fade = depth_fade((start.depth + end.depth) * 0.5);
            let (width, base_alpha) = if edge.outward {
                (1.0, 140.0)
            } else {
                (1.3, 185.0)
            };
            let color = if edge.outward {
                Color32::from_rgba_unmultiplied(132, 112, 78, (base_alpha * fade) as u8)
            } else {
                Color32::from_rgba_unmultiplied(96, 104, 116, (base_alpha * fade) as u8)
            };
            painter.line_segment([start.screen, end.screen], Stroke::new(width, color));

            if frame.show_flow_particles {
                let from = self.layout.nodes[edge.component].pos;
                let to = self.layout.nodes[edge.composite].pos;
                let along = to.sub(from).scale(edge.particle_phase);
                if let Some(particle) = self.project(rect, from.add(along)) {
                    painter.circle_filled(
                        particle.screen,
                        (2.4 * particle.scale * 560.0 / rect.height()).clamp(1.2, 4.0),
                        Color32::from_rgba_unmultiplied(
                            222,
                            212,
                            158,
                            (235.0 * depth_fade(particle.depth)) as u8,
                        ),
                    );
                }
            }
        }

        // Painter's algorithm: far nodes first.
        let mut draw_order = Vec::with_capacity(self.layout.nodes.len());
        for (index, node) in self.layout.nodes.iter().enumerate() {
            if let Some(projected) = self.project(rect, node.pos) {
                draw_order.push((index, projected));
            }
        }
        draw_order.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));

        let mut navigate_to = None;
        for (index, projected) in &draw_order {
            let node = &self.layout.nodes[*index];
            let radius = (tier_radius(node.tier) * projected.scale).clamp(6.0, 56.0);
            let fade = depth_fade(projected.depth);
            let is_hovered = hovered == Some(*index);
            let is_focus = node.id == frame.focus_id;

            let base = tier_color(node.tier);
            let fill = Color32::from_rgb(
                (base.r() as f32 * fade) as u8,
                (base.g() as f32 * fade) as u8,
                (base.b() as f32 * fade) as u8,
            );
            painter.circle_filled(projected.screen, radius, fill);
            painter.circle_stroke(
                projected.screen,
                radius,
                Stroke::new(
                    if is_hovered { 2.2 } else { 1.1 },
                    Color32::from_rgba_unmultiplied(10, 10, 12, 210),
                ),
            );
            if is_focus {
                painter.circle_stroke(
                    projected.screen,
                    radius + 4.0,
                    Stroke::new(1.6, Color32::from_rgba_unmultiplied(246, 196, 84, 170)),
                );
            }

            painter.text(
                projected.screen,
                Align2::CENTER_CENTER,
                &node.id,
                FontId::proportional((radius * 1.15).clamp(9.0, 48.0)),
                Color32::from_rgb(14, 15, 18),
            );
        }

        if let Some(index) = hovered {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);

            if response.clicked_by(egui::PointerButton::Primary) {
                let id = &self.layout.nodes[index].id;
                if id != frame.focus_id {
                    navigate_to = Some(id.clone());
                }
            }
        }

        RendererOutput {
            navigate_to,
            keep_animating: physics_moving
                || camera_moving
                || drag_active
                || frame.auto_rotate
                || frame.show_flow_particles,
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use crate::kanji::{CharacterNode, CompositionEdge, Tier};

    use super::*;

    fn rect() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0))
    }

    #[test]
    fn camera_rotation_round_trips() {
        let mut renderer = PerspectiveRenderer::new();
        renderer.yaw = 0.83;
        renderer.pitch = -0.41;

        let world = Vec3::new(42.0, -17.0, 63.0);
        let back = renderer.to_world(renderer.to_camera(world));
        assert!(back.sub(world).length() < 0.001);
    }

    #[test]
    fn origin_projects_to_viewport_center() {
        let renderer = PerspectiveRenderer::new();
        let projected = renderer.project(rect(), Vec3::ZERO).unwrap();
        assert!((projected.screen.x - 400.0).abs() < 0.01);
        assert!((projected.screen.y - 300.0).abs() < 0.01);
        assert!((projected.depth - renderer.distance).abs() < 0.01);
    }

    #[test]
    fn points_behind_the_near_plane_are_culled() {
        let mut renderer = PerspectiveRenderer::new();
        renderer.yaw = 0.0;
        renderer.pitch = 0.0;
        let behind = Vec3::new(0.0, 0.0, -(renderer.distance + 10.0));
        assert!(renderer.project(rect(), behind).is_none());
    }

    #[test]
    fn fit_distance_grows_with_layout_radius() {
        let mut renderer = PerspectiveRenderer::new();
        let graph = CompositionGraph {
            nodes: vec![
                CharacterNode {
                    id: "木".to_owned(),
                    tier: Tier::Focus,
                },
                CharacterNode {
                    id: "林".to_owned(),
                    tier: Tier::Common,
                },
            ],
            links: vec![CompositionEdge {
                component: "木".to_owned(),
                composite: "林".to_owned(),
            }],
        };
        renderer.layout.sync_if_needed(&graph, 1, "木");

        renderer.layout.nodes[0].pos = Vec3::new(-80.0, 0.0, 0.0);
        renderer.layout.nodes[1].pos = Vec3::new(80.0, 0.0, 0.0);
        let near = renderer.fit_distance(rect()).unwrap();

        renderer.layout.nodes[0].pos = Vec3::new(-600.0, 0.0, 0.0);
        renderer.layout.nodes[1].pos = Vec3::new(600.0, 0.0, 0.0);
        let far = renderer.fit_distance(rect()).unwrap();

        assert!(far > near);
        assert!((MIN_DISTANCE..=MAX_DISTANCE).contains(&near));
        assert!((MIN_DISTANCE..=MAX_DISTANCE).contains(&far));
    }

    #[test]
    fn fit_distance_handles_an_empty_layout() {
        let renderer = PerspectiveRenderer::new();
        assert!(renderer.fit_distance(rect()).is_none());
    }

    #[test]
    fn distance_animation_converges() {
        let mut renderer = PerspectiveRenderer::new();
        renderer.distance = 300.0;
        renderer.distance_goal = Some(900.0);

        for _ in 0..600 {
            if !renderer.animate_camera(1.0 / 60.0) {
                break;
            }
        }
        assert!(renderer.distance_goal.is_none());
        assert!((renderer.distance - 900.0).abs() < 1.5);
    }
}
