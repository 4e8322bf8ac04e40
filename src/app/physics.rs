use eframe::egui::Vec2;

use super::renderer::{LayoutEdge, LayoutNode};

/// Minimal vector surface the integrator needs; implemented for the flat
/// renderer's `Vec2` and the perspective renderer's `Vec3` so the force pass
/// is written once.
pub trait LayoutVec: Copy + PartialEq {
    fn zero() -> Self;
    fn from_units(ux: f32, uy: f32, uz: f32) -> Self;
    fn add(self, other: Self) -> Self;
    fn sub(self, other: Self) -> Self;
    fn scale(self, factor: f32) -> Self;
    fn dot(self, other: Self) -> f32;

    fn length_sq(self) -> f32 {
        self.dot(self)
    }

    fn length(self) -> f32 {
        self.length_sq().sqrt()
    }
}

impl LayoutVec for Vec2 {
    fn zero() -> Self {
        Self::ZERO
    }

    fn from_units(ux: f32, uy: f32, _uz: f32) -> Self {
        Self::new(ux, uy)
    }

    fn add(self, other: Self) -> Self {
        self + other
    }

    fn sub(self, other: Self) -> Self {
        self - other
    }

    fn scale(self, factor: f32) -> Self {
        self * factor
    }

    fn dot(self, other: Self) -> f32 {
        (self.x * other.x) + (self.y * other.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl LayoutVec for Vec3 {
    fn zero() -> Self {
        Self::ZERO
    }

    fn from_units(ux: f32, uy: f32, uz: f32) -> Self {
        Self::new(ux, uy, uz)
    }

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    fn dot(self, other: Self) -> f32 {
        (self.x * other.x) + (self.y * other.y) + (self.z * other.z)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LayoutParams {
    pub repulsion: f32,
    pub spring: f32,
    pub spring_damping: f32,
    pub rest_length: f32,
    pub centering: f32,
    pub damping: f32,
    pub softening: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            repulsion: 58_000.0,
            spring: 0.028,
            spring_damping: 0.22,
            rest_length: 140.0,
            centering: 0.0012,
            damping: 0.88,
            softening: 520.0,
        }
    }
}

/// One integration step. All-pairs repulsion (the graphs here stay in the
/// tens of nodes), spring attraction along links toward `rest_length`, a weak
/// pull toward the origin, then damped integration with force/speed clamps
/// and a sleep threshold. A node held by the pointer (`pinned`) contributes
/// forces to its neighbors but is not integrated itself.
///
/// Returns whether anything is still moving, so the caller can stop
/// requesting repaints once the layout settles.
pub fn step_layout<V: LayoutVec>(
    nodes: &mut [LayoutNode<V>],
    edges: &[LayoutEdge],
    params: &LayoutParams,
    dt: f32,
    pinned: Option<usize>,
) -> bool {
    let node_count = nodes.len();
    if node_count == 0 {
        return false;
    }

    let mut forces = vec![V::zero(); node_count];
    let time_scale = (dt * 60.0).clamp(0.25, 3.0);
    let damping_factor = params.damping.powf(time_scale);

    for a in 0..node_count {
        for b in (a + 1)..node_count {
            let delta = nodes[a].pos.sub(nodes[b].pos);
            let distance_sq = delta.length_sq();
            let distance = distance_sq.sqrt();
            let direction = if distance > 0.0001 {
                delta.scale(1.0 / distance)
            } else {
                let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214)
                    * std::f32::consts::TAU;
                V::from_units(angle.cos(), angle.sin(), 0.31)
            };

            let push = direction.scale(params.repulsion / (distance_sq + params.softening));
            forces[a] = forces[a].add(push);
            forces[b] = forces[b].sub(push);
        }
    }

    for edge in edges {
        let (from, to) = (edge.component, edge.composite);
        if from >= node_count || to >= node_count || from == to {
            continue;
        }

        let delta = nodes[from].pos.sub(nodes[to].pos);
        let distance_sq = delta.length_sq();
        if distance_sq <= 0.0001 * 0.0001 {
            continue;
        }
        let distance = distance_sq.sqrt();
        let direction = delta.scale(1.0 / distance);

        let spring = (distance - params.rest_length) * params.spring;
        let relative_velocity = nodes[from].vel.sub(nodes[to].vel);
        let damping_force = relative_velocity.dot(direction) * params.spring_damping;
        let correction = direction.scale(spring + damping_force);

        forces[from] = forces[from].sub(correction);
        forces[to] = forces[to].add(correction);
    }

    for (index, force) in forces.iter_mut().enumerate() {
        *force = force.sub(nodes[index].pos.scale(params.centering));
    }

    let max_force = 180.0;
    let max_force_sq = max_force * max_force;
    let max_speed = 16.0;
    let max_speed_sq = max_speed * max_speed;
    let min_sleep_speed_sq = 0.02 * 0.02;
    let min_sleep_force_sq = 0.08 * 0.08;
    let mut any_motion = false;

    for (index, force_value) in forces.iter().enumerate() {
        if Some(index) == pinned {
            nodes[index].vel = V::zero();
            continue;
        }

        let mut force = *force_value;
        let force_sq = force.length_sq();
        if force_sq > max_force_sq {
            force = force.scale(max_force / force_sq.sqrt());
        }

        let mut velocity = nodes[index]
            .vel
            .add(force.scale(0.055 * time_scale))
            .scale(damping_factor);
        let mut speed_sq = velocity.length_sq();
        if speed_sq > max_speed_sq {
            velocity = velocity.scale(max_speed / speed_sq.sqrt());
            speed_sq = max_speed_sq;
        }

        if speed_sq < min_sleep_speed_sq && force_sq < min_sleep_force_sq {
            velocity = V::zero();
            speed_sq = 0.0;
        }

        nodes[index].vel = velocity;
        nodes[index].pos = nodes[index].pos.add(velocity.scale(time_scale));
        if speed_sq > 0.000_001 {
            any_motion = true;
        }
    }

    any_motion
}
