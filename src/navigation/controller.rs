use avian3d::prelude::LayerMask;
use bevy::prelude::*;

use super::agent::{AgentSettings, PathAgent, PathStatus};
use super::error::NavError;
use super::surface::NavSurface;
use crate::scene::SceneQuery;

/// Tunables for tap-to-move navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationSettings {
    /// Layers a tap ray may land on.
    pub ground_mask: LayerMask,
    pub raycast_max_distance: f32,
    pub stopping_distance: f32,
    /// Slack added on top of the stopping distance before arrival fires.
    pub arrival_tolerance: f32,
    pub face_move_direction: bool,
    pub auto_snap_on_start: bool,
    /// Search radius when the agent has to be put back on the surface.
    pub snap_search_radius: f32,
    /// Tap hits further than this from the surface keep their raw point.
    pub destination_snap_radius: f32,
    /// Resample radius for the resting pose on arrival.
    pub arrival_snap_radius: f32,
    /// Animator float to receive the normalized speed. Empty disables it.
    pub speed_param: String,
    /// Turn a dynamic body kinematic so physics does not fight the agent.
    pub force_kinematic_body: bool,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            ground_mask: LayerMask::ALL,
            raycast_max_distance: 200.0,
            stopping_distance: 0.3,
            arrival_tolerance: 0.1,
            face_move_direction: true,
            auto_snap_on_start: true,
            snap_search_radius: 6.0,
            destination_snap_radius: 1.5,
            arrival_snap_radius: 0.8,
            speed_param: "Speed".to_string(),
            force_kinematic_body: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum MoveState {
    /// Nothing requested yet.
    #[default]
    Idle,
    Moving,
    /// Resting at the last accepted destination.
    Arrived,
}

/// Everything the controller touches during one frame.
pub struct NavContext<'a> {
    pub agent: &'a mut dyn PathAgent,
    pub surface: &'a dyn NavSurface,
    pub scene: &'a dyn SceneQuery,
    pub body: &'a mut Transform,
}

/// Turns taps into destinations and pins the body once it gets there.
#[derive(Component, Debug, Clone, Default)]
pub struct NavigationController {
    pub settings: NavigationSettings,
    authority: bool,
    initialized: bool,
    state: MoveState,
    last_stable_position: Vec3,
    normalized_speed: f32,
}

impl NavigationController {
    pub fn new(settings: NavigationSettings) -> Self {
        Self {
            settings,
            ..default()
        }
    }

    pub fn state(&self) -> MoveState {
        self.state
    }

    pub fn is_arrived(&self) -> bool {
        self.state == MoveState::Arrived
    }

    pub fn has_authority(&self) -> bool {
        self.authority
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn last_stable_position(&self) -> Vec3 {
        self.last_stable_position
    }

    /// Velocity magnitude over max speed from the most recent frame.
    pub fn normalized_speed(&self) -> f32 {
        self.normalized_speed
    }

    pub fn stop_edge(&self) -> f32 {
        (self.settings.stopping_distance + self.settings.arrival_tolerance).max(0.01)
    }

    /// Latch authority and prepare the agent. Without authority the
    /// controller stays inert until [`Self::reinitialize`].
    ///
    /// A failed startup snap is reported but still leaves the controller
    /// initialized; taps retry the snap on demand.
    pub fn initialize(
        &mut self,
        authority: bool,
        agent: &mut dyn PathAgent,
        surface: &dyn NavSurface,
        body: &mut Transform,
    ) -> Result<(), NavError> {
        self.authority = authority;
        self.initialized = true;
        self.state = MoveState::Idle;
        self.normalized_speed = 0.0;
        if !authority {
            return Ok(());
        }

        agent.apply_settings(AgentSettings {
            stopping_distance: self.settings.stopping_distance,
            update_rotation: self.settings.face_move_direction,
            auto_braking: true,
            auto_repath: false,
        });
        // Whatever the agent was doing under a previous owner is void
        agent.reset_path();
        agent.set_stopped(true);
        agent.set_velocity(Vec3::ZERO);

        let snapped = if self.settings.auto_snap_on_start {
            self.ensure_on_surface(agent, surface, body)
        } else {
            Ok(())
        };
        self.last_stable_position = body.translation;
        snapped
    }

    /// Drop all process-local state; authority is latched again on the
    /// next [`Self::initialize`].
    pub fn reinitialize(&mut self) {
        *self = Self::new(std::mem::take(&mut self.settings));
    }

    /// Warp the agent onto the nearest surface if it is not on one.
    pub fn ensure_on_surface(
        &self,
        agent: &mut dyn PathAgent,
        surface: &dyn NavSurface,
        body: &mut Transform,
    ) -> Result<(), NavError> {
        if agent.is_on_surface() {
            return Ok(());
        }
        let radius = self.settings.snap_search_radius;
        let position = surface
            .sample_position(agent.next_position(), radius)
            .ok_or(NavError::UnreachableSurface { radius })?;
        agent.warp(position);
        body.translation = position;
        Ok(())
    }

    /// One simulation frame: optional tap, then arrival tracking and drift
    /// suppression. Returns the destination accepted this frame, if any.
    pub fn simulate(
        &mut self,
        tap: Option<Ray3d>,
        cx: &mut NavContext<'_>,
    ) -> Result<Option<Vec3>, NavError> {
        if !self.authority || !self.initialized {
            return Ok(None);
        }

        let accepted = tap.map(|ray| self.accept_tap(ray, cx)).transpose();
        self.track_arrival(cx);

        let max_speed = cx.agent.max_speed().max(0.01);
        self.normalized_speed = cx.agent.velocity().length() / max_speed;

        accepted
    }

    fn accept_tap(&mut self, ray: Ray3d, cx: &mut NavContext<'_>) -> Result<Vec3, NavError> {
        if !cx.agent.is_on_surface() {
            self.ensure_on_surface(cx.agent, cx.surface, cx.body)?;
        }

        let hit = cx
            .scene
            .raycast(
                ray,
                self.settings.raycast_max_distance,
                self.settings.ground_mask,
            )
            .ok_or(NavError::NoDestinationHit)?;
        let destination = cx
            .surface
            .sample_position(hit.point, self.settings.destination_snap_radius)
            .unwrap_or(hit.point);

        cx.agent.set_stopped(false);
        cx.agent.reset_path();
        if !cx.agent.set_destination(destination) {
            self.transition(MoveState::Idle);
            return Err(NavError::NoDestinationHit);
        }
        self.transition(MoveState::Moving);
        Ok(destination)
    }

    fn track_arrival(&mut self, cx: &mut NavContext<'_>) {
        match self.state {
            MoveState::Idle => {}
            MoveState::Moving => {
                if cx.agent.has_path() && !cx.agent.path_pending() && self.reached(cx.agent) {
                    self.hard_stop(cx);
                }
            }
            MoveState::Arrived => {
                cx.agent.set_next_position(self.last_stable_position);
                cx.body.translation = self.last_stable_position;
                cx.agent.set_velocity(Vec3::ZERO);
            }
        }
    }

    fn reached(&self, agent: &dyn PathAgent) -> bool {
        let remaining = agent.remaining_distance();
        remaining.is_finite()
            && agent.path_status() == PathStatus::Complete
            && remaining <= self.stop_edge()
    }

    fn hard_stop(&mut self, cx: &mut NavContext<'_>) {
        cx.agent.set_stopped(true);
        cx.agent.set_velocity(Vec3::ZERO);
        cx.agent.reset_path();

        let resting = cx.agent.next_position();
        let resting = cx
            .surface
            .sample_position(resting, self.settings.arrival_snap_radius)
            .unwrap_or(resting);

        cx.body.translation = resting;
        cx.agent.set_next_position(resting);
        self.last_stable_position = resting;
        self.transition(MoveState::Arrived);
    }

    fn transition(&mut self, next: MoveState) {
        if self.state != next {
            debug!("navigation {} -> {}", self.state, next);
        }
        self.state = next;
    }
}
