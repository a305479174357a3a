use bevy::prelude::*;

/// How much of the requested route the agent could actually plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum PathStatus {
    #[default]
    Invalid,
    /// The destination was clamped onto the navigable surface.
    Partial,
    Complete,
}

/// Locomotion knobs the controller pushes into the agent once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSettings {
    pub stopping_distance: f32,
    /// Rotate the body toward its travel direction.
    pub update_rotation: bool,
    pub auto_braking: bool,
    pub auto_repath: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            stopping_distance: 0.3,
            update_rotation: true,
            auto_braking: true,
            auto_repath: false,
        }
    }
}

/// The path-following service that owns per-step locomotion.
///
/// The navigation controller only decides *where* to go and when the agent
/// counts as arrived; everything between is up to the implementation.
pub trait PathAgent {
    fn apply_settings(&mut self, settings: AgentSettings);

    /// Whether the agent is currently bound to the navigable surface.
    fn is_on_surface(&self) -> bool;

    /// Teleport onto the surface without pathing.
    fn warp(&mut self, position: Vec3);

    /// Plan toward `target`. Returns false when no route could be started.
    fn set_destination(&mut self, target: Vec3) -> bool;

    fn destination(&self) -> Option<Vec3>;

    fn reset_path(&mut self);

    fn set_stopped(&mut self, stopped: bool);

    fn is_stopped(&self) -> bool;

    fn velocity(&self) -> Vec3;

    fn set_velocity(&mut self, velocity: Vec3);

    fn max_speed(&self) -> f32;

    /// `f32::INFINITY` when unknown.
    fn remaining_distance(&self) -> f32;

    fn has_path(&self) -> bool;

    fn path_pending(&self) -> bool;

    fn path_status(&self) -> PathStatus;

    fn next_position(&self) -> Vec3;

    fn set_next_position(&mut self, position: Vec3);
}
