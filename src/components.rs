use bevy::prelude::*;

use crate::resources::Config;

/// One ball of the cradle. `anchor` is the fixed top of the string;
/// `angle` is the signed offset from hanging straight down, so the ball
/// sits at `anchor + (length * sin(angle), -length * cos(angle))`.
#[derive(Reflect, Component, Default)]
#[reflect(Component)]
pub struct Ball {
    pub mass: f32,
    pub length: f32,
    pub radius: f32,
    pub angle: f32,
    pub angular_velocity: f32,
    pub angular_acceleration: f32,
    pub anchor: Vec2,
}

impl Ball {
    /// Simple pendulum step: gravity torque, semi-implicit Euler, damping.
    pub fn integrate(&mut self, dt: f32, config: &Config) {
        self.angular_acceleration = -(config.gravity / self.length) * self.angle.sin();
        self.angular_velocity += self.angular_acceleration * dt;
        self.angle += self.angular_velocity * dt;
        self.angular_velocity *= config.damping;
    }

    pub fn position(&self) -> Vec2 {
        self.anchor + Vec2::new(self.length * self.angle.sin(), -self.length * self.angle.cos())
    }

    /// Inverse of `position`: recover the string angle from a world point.
    pub fn set_angle_from(&mut self, pos: Vec2) {
        self.angle = (pos.x - self.anchor.x).atan2(self.anchor.y - pos.y);
    }
}
