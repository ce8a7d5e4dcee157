use std::f32::consts::FRAC_PI_4;

use bevy::prelude::*;
use bevy_inspector_egui::{prelude::ReflectInspectorOptions, InspectorOptions};

#[derive(Reflect, Resource, InspectorOptions)]
#[reflect(Resource, InspectorOptions)]
pub struct Config {
    /// Gravitational acceleration in pixels per second squared.
    pub gravity: f32,
    /// Wall-clock multiplier applied to the fixed timestep.
    pub time_scale: f32,
    /// Per-step multiplicative decay of angular velocity.
    #[inspector(min = 0.9, max = 1.0)]
    pub damping: f32,
    #[inspector(min = 0.0, max = 1.0)]
    pub restitution: f32,
    #[inspector(min = 2, max = 16)]
    pub ball_count: u32,
    pub ball_mass: f32,
    pub ball_radius: f32,
    /// Gap between neighbouring balls at rest.
    pub spacing: f32,
    pub string_length: f32,
    /// Height of the common suspension line.
    pub anchor_y: f32,
    /// Starting displacement of the first ball.
    pub start_angle: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gravity: 980.0,
            time_scale: 2.0,
            damping: 0.9999,
            restitution: 1.0,
            ball_count: 5,
            ball_mass: 2.0,
            ball_radius: 20.0,
            spacing: 0.5,
            string_length: 200.0,
            anchor_y: 200.0,
            start_angle: -FRAC_PI_4,
        }
    }
}

/// Spawn-ordered ball entities; adjacency order for the collision pass.
#[derive(Reflect, Resource, Default)]
#[reflect(Resource)]
pub struct Cradle {
    pub balls: Vec<Entity>,
}
