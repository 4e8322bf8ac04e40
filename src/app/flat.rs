use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2, vec2};

use crate::kanji::CompositionGraph;

use super::physics::{LayoutParams, step_layout};
use super::renderer::{FrameInput, GraphRenderer, LayoutState, RendererOutput, tier_color, tier_radius};

const FIT_MARGIN: f32 = 70.0;
const CAMERA_EASE: f32 = 6.0;

struct CameraGoal {
    pan: Vec2,
    zoom: f32,
}

/// Flat projection: a pan/zoom camera over the 2D layout plane. Left-drag on
/// a node overrides its position, left-drag on the background pans, the wheel
/// zooms about the pointer.
pub struct FlatRenderer {
    layout: LayoutState<Vec2>,
    params: LayoutParams,
    pan: Vec2,
    zoom: f32,
    node_drag: Option<usize>,
    camera_goal: Option<CameraGoal>,
    seen_focus_trigger: Option<u64>,
}

impl FlatRenderer {
    pub fn new() -> Self {
        Self {
            layout: LayoutState::new(),
            params: LayoutParams::default(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            node_drag: None,
            camera_goal: None,
            seen_focus_trigger: None,
        }
    }

    fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.pan + world * self.zoom
    }

    fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.pan) / self.zoom
    }

    fn fit_goal(&self, rect: Rect) -> Option<CameraGoal> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for node in &self.layout.nodes {
            min.x = min.x.min(node.pos.x);
            min.y = min.y.min(node.pos.y);
            max.x = max.x.max(node.pos.x);
            max.y = max.y.max(node.pos.y);
        }
        if !min.x.is_finite() || !min.y.is_finite() {
            return None;
        }

        let span = vec2(
            (max.x - min.x) + FIT_MARGIN * 2.0,
            (max.y - min.y) + FIT_MARGIN * 2.0,
        );
        let zoom = (rect.width() / span.x)
            .min(rect.height() / span.y)
            .clamp(0.1, 2.5);
        let center = (min + max) * 0.5;
        Some(CameraGoal {
            pan: -center * zoom,
            zoom,
        })
    }

    fn animate_camera(&mut self, dt: f32) -> bool {
        let Some(goal) = &self.camera_goal else {
            return false;
        };

        let blend = (CAMERA_EASE * dt).clamp(0.0, 1.0);
        self.pan += (goal.pan - self.pan) * blend;
        self.zoom += (goal.zoom - self.zoom) * blend;

        if (goal.pan - self.pan).length() < 0.5 && (goal.zoom - self.zoom).abs() < 0.002 {
            self.pan = goal.pan;
            self.zoom = goal.zoom;
            self.camera_goal = None;
        }
        true
    }

    fn handle_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        self.camera_goal = None;
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = self.screen_to_world(rect, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.05, 6.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
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
                let position = self.world_to_screen(rect, node.pos);
                let radius = (tier_radius(node.tier) * self.zoom.powf(0.6)).clamp(8.0, 52.0);
                let distance = position.distance(pointer);
                (distance <= radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}

impl GraphRenderer for FlatRenderer {
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
                self.camera_goal = self.fit_goal(rect);
            }
            self.seen_focus_trigger = Some(frame.focus_trigger);
        }

        let response = ui.allocate_rect(rect, Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

        self.handle_zoom(ui, rect, &response);

        let pointer = ui.input(|input| input.pointer.hover_pos());
        let hovered = self.hovered_index(rect, pointer);

        if response.drag_started_by(egui::PointerButton::Primary) {
            self.node_drag = hovered;
        }
        if !response.dragged_by(egui::PointerButton::Primary) {
            self.node_drag = None;
        }

        if let Some(dragged_index) = self.node_drag {
            if let Some(pointer) = pointer {
                let world = self.screen_to_world(rect, pointer);
                if let Some(node) = self.layout.nodes.get_mut(dragged_index) {
                    node.pos = world;
                    node.vel = Vec2::ZERO;
                }
            }
        } else if response.dragged_by(egui::PointerButton::Primary) {
            self.camera_goal = None;
            self.pan += response.drag_delta();
        }

        let pinned = self.node_drag;
        let physics_moving = step_layout(
            &mut self.layout.nodes,
            &self.layout.edges,
            &self.params,
            frame.dt,
            pinned,
        );
        if frame.show_flow_particles {
            self.layout.advance_particles(frame.dt);
        }
        let camera_moving = self.animate_camera(frame.dt);

        let zoom_sqrt = self.zoom.sqrt();
        for edge in &self.layout.edges {
            let start = self.world_to_screen(rect, self.layout.nodes[edge.component].pos);
            let end = self.world_to_screen(rect, self.layout.nodes[edge.composite].pos);

            let (width, color) = if edge.outward {
                (
                    (1.0 * zoom_sqrt).clamp(0.5, 2.4),
                    Color32::from_rgba_unmultiplied(132, 112, 78, 150),
                )
            } else {
                (
                    (1.3 * zoom_sqrt).clamp(0.6, 3.0),
                    Color32::from_rgba_unmultiplied(96, 104, 116, 190),
                )
            };
            painter.line_segment([start, end], Stroke::new(width, color));

            if frame.show_flow_particles {
                let along = end - start;
                let position = start + along * edge.particle_phase;
                painter.circle_filled(
                    position,
                    (2.6 * zoom_sqrt).clamp(1.4, 4.2),
                    Color32::from_rgb(222, 212, 158),
                );
            }
        }

        let mut navigate_to = None;
        for (index, node) in self.layout.nodes.iter().enumerate() {
            let position = self.world_to_screen(rect, node.pos);
            let radius = (tier_radius(node.tier) * self.zoom.powf(0.6)).clamp(8.0, 52.0);
            let is_hovered = hovered == Some(index);
            let is_focus = node.id == frame.focus_id;

            let fill = tier_color(node.tier);
            painter.circle_filled(position, radius, fill);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    if is_hovered { 2.2 } else { 1.1 },
                    Color32::from_rgba_unmultiplied(12, 12, 14, 200),
                ),
            );
            if is_focus {
                painter.circle_stroke(
                    position,
                    radius + 4.0,
                    Stroke::new(1.6, Color32::from_rgba_unmultiplied(246, 196, 84, 170)),
                );
            }

            painter.text(
                position,
                Align2::CENTER_CENTER,
                &node.id,
                FontId::proportional((radius * 1.15).clamp(10.0, 46.0)),
                Color32::from_rgb(16, 18, 20),
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
                || response.dragged()
                || frame.show_flow_particles,
        }
    }
}
