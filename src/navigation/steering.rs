use bevy::prelude::*;

use super::agent::{AgentSettings, PathAgent, PathStatus};
use super::surface::NavSurface;

/// Per-step re-projection radius that keeps the agent glued to the surface.
const SURFACE_STICK_RADIUS: f32 = 0.5;
/// A sampled destination further than this from the request is a partial path.
const PARTIAL_PATH_EPSILON: f32 = 0.01;

/// Straight-line path follower for flat layouts.
///
/// Holds the simulated position separately from the body [`Transform`];
/// the navigation systems copy it over after every step.
#[derive(Component, Debug, Clone)]
pub struct SteeringAgent {
    pub speed: f32,
    pub acceleration: f32,
    /// Radians per second.
    pub angular_speed: f32,
    settings: AgentSettings,
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    destination: Option<Vec3>,
    /// The target as requested, before clamping onto the surface.
    requested: Option<Vec3>,
    status: PathStatus,
    stopped: bool,
    on_surface: bool,
}

impl Default for SteeringAgent {
    fn default() -> Self {
        Self {
            speed: 3.5,
            acceleration: 8.0,
            angular_speed: 2.0 * std::f32::consts::PI,
            settings: AgentSettings::default(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            destination: None,
            requested: None,
            status: PathStatus::Invalid,
            stopped: false,
            on_surface: false,
        }
    }
}

impl SteeringAgent {
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn settings(&self) -> AgentSettings {
        self.settings
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Adopt a body pose without binding to the surface.
    pub fn place(&mut self, transform: &Transform) {
        self.position = transform.translation;
        self.rotation = transform.rotation;
    }

    /// Pair the agent with the surface it walks on for one frame.
    pub fn bind<'a>(&'a mut self, surface: &'a dyn NavSurface) -> BoundAgent<'a> {
        BoundAgent {
            agent: self,
            surface,
        }
    }
}

/// A [`SteeringAgent`] that can see its navigable surface.
pub struct BoundAgent<'a> {
    agent: &'a mut SteeringAgent,
    surface: &'a dyn NavSurface,
}

impl BoundAgent<'_> {
    /// Advance locomotion by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        // Regions may have changed since the destination was clamped
        if self.agent.settings.auto_repath
            && !self.agent.stopped
            && let Some(target) = self.agent.requested
        {
            self.plan(target);
        }

        let agent = &mut *self.agent;
        if !agent.on_surface || dt <= 0.0 {
            return;
        }

        let mut travel = match agent.destination.filter(|_| !agent.stopped) {
            Some(destination) => {
                let to_target = destination - agent.position;
                let distance = to_target.length();
                let mut desired_speed = agent.speed;
                if agent.settings.auto_braking {
                    let braking_speed = (2.0 * agent.acceleration * distance).sqrt();
                    desired_speed = desired_speed.min(braking_speed);
                }
                let desired = to_target.normalize_or_zero() * desired_speed;
                agent.velocity = agent
                    .velocity
                    .move_towards(desired, agent.acceleration * dt);
                (agent.velocity * dt).clamp_length_max(distance)
            }
            None => {
                agent.velocity = agent
                    .velocity
                    .move_towards(Vec3::ZERO, agent.acceleration * dt);
                agent.velocity * dt
            }
        };

        if travel.length_squared() <= f32::EPSILON * f32::EPSILON {
            travel = Vec3::ZERO;
        }
        let moved = agent.position + travel;
        agent.position = self
            .surface
            .sample_position(moved, SURFACE_STICK_RADIUS)
            .unwrap_or(moved);

        let heading = Vec3::new(agent.velocity.x, 0.0, agent.velocity.z);
        if agent.settings.update_rotation
            && let Ok(direction) = Dir3::new(heading)
        {
            let facing = Transform::default().looking_to(direction, Vec3::Y).rotation;
            agent.rotation = agent
                .rotation
                .rotate_towards(facing, agent.angular_speed * dt);
        }
    }
}

impl BoundAgent<'_> {
    fn plan(&mut self, target: Vec3) -> bool {
        let Some(reachable) = self.surface.sample_position(target, f32::INFINITY) else {
            self.agent.destination = None;
            self.agent.requested = None;
            self.agent.status = PathStatus::Invalid;
            return false;
        };
        self.agent.status = if reachable.distance(target) <= PARTIAL_PATH_EPSILON {
            PathStatus::Complete
        } else {
            PathStatus::Partial
        };
        self.agent.destination = Some(reachable);
        self.agent.requested = Some(target);
        true
    }
}

impl PathAgent for BoundAgent<'_> {
    fn apply_settings(&mut self, settings: AgentSettings) {
        self.agent.settings = settings;
    }

    fn is_on_surface(&self) -> bool {
        self.agent.on_surface
    }

    fn warp(&mut self, position: Vec3) {
        let agent = &mut *self.agent;
        agent.position = position;
        agent.velocity = Vec3::ZERO;
        agent.destination = None;
        agent.requested = None;
        agent.status = PathStatus::Invalid;
        agent.on_surface = true;
    }

    fn set_destination(&mut self, target: Vec3) -> bool {
        if !self.agent.on_surface {
            return false;
        }
        self.plan(target)
    }

    fn destination(&self) -> Option<Vec3> {
        self.agent.destination
    }

    fn reset_path(&mut self) {
        self.agent.destination = None;
        self.agent.requested = None;
        self.agent.status = PathStatus::Invalid;
    }

    fn set_stopped(&mut self, stopped: bool) {
        self.agent.stopped = stopped;
    }

    fn is_stopped(&self) -> bool {
        self.agent.stopped
    }

    fn velocity(&self) -> Vec3 {
        self.agent.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.agent.velocity = velocity;
    }

    fn max_speed(&self) -> f32 {
        self.agent.speed
    }

    fn remaining_distance(&self) -> f32 {
        self.agent
            .destination
            .map_or(f32::INFINITY, |destination| {
                destination.distance(self.agent.position)
            })
    }

    fn has_path(&self) -> bool {
        self.agent.destination.is_some()
    }

    fn path_pending(&self) -> bool {
        false
    }

    fn path_status(&self) -> PathStatus {
        self.agent.status
    }

    fn next_position(&self) -> Vec3 {
        self.agent.position
    }

    fn set_next_position(&mut self, position: Vec3) {
        self.agent.position = position;
    }
}
