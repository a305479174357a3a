use avian3d::prelude::*;
use bevy::prelude::*;

use super::controller::{NavContext, NavigationController};
use super::error::NavError;
use super::steering::SteeringAgent;
use super::surface::{NavRegions, NavSurface};
use crate::animation::{AnimationSink, AnimatorParams};
use crate::authority::{self, LocalAuthority};
use crate::camera::MainCamera;
use crate::input::PointerFrame;
use crate::scene::{SceneProbe, SceneQuery};

pub fn on_agent_added(
    on: On<Add, SteeringAgent>,
    mut agents: Query<(&mut SteeringAgent, &Transform)>,
) {
    if let Ok((mut agent, transform)) = agents.get_mut(on.event_target()) {
        agent.place(transform);
    }
}

/// Physics must not push a body the agent is steering.
pub fn configure_body(
    on: On<Add, NavigationController>,
    mut commands: Commands,
    q: Query<(&NavigationController, Option<&RigidBody>)>,
) {
    let entity = on.event_target();
    let Ok((controller, body)) = q.get(entity) else {
        return;
    };
    if controller.settings.force_kinematic_body && body.is_some() {
        commands
            .entity(entity)
            .insert((RigidBody::Kinematic, GravityScale(0.0)));
    }
}

/// A new [`LocalAuthority`] value means the entity changed hands.
pub fn reset_on_authority_change(
    mut q: Query<(Entity, &mut NavigationController, &LocalAuthority), Changed<LocalAuthority>>,
) {
    for (entity, mut controller, authority) in q.iter_mut() {
        if controller.is_initialized() && controller.has_authority() != authority.0 {
            info!("{entity}: navigation authority changed to {}", authority.0);
            controller.reinitialize();
        }
    }
}

/// Only locally owned agents whose controller has latched authority move.
#[allow(clippy::type_complexity)]
pub fn step_agents(
    time: Res<Time>,
    surface: Res<NavRegions>,
    mut q: Query<(
        &mut SteeringAgent,
        &mut Transform,
        Option<&NavigationController>,
        Option<&LocalAuthority>,
    )>,
) {
    let dt = time.delta_secs();
    for (mut agent, mut transform, controller, authority) in q.iter_mut() {
        if !authority::resolve(authority)
            || controller.is_some_and(|c| !c.is_initialized() || !c.has_authority())
        {
            continue;
        }
        agent.bind(&*surface).step(dt);
        crate::navigation::sync_body(&agent, &mut transform);
    }
}

#[allow(clippy::type_complexity)]
pub fn drive_navigation(
    frame: Res<PointerFrame>,
    surface: Res<NavRegions>,
    scene: SceneProbe,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut q: Query<(
        Entity,
        &mut NavigationController,
        &mut SteeringAgent,
        &mut Transform,
        Option<&LocalAuthority>,
        Option<&mut AnimatorParams>,
    )>,
) {
    let tap = frame.tap().and_then(|screen| {
        let (camera, camera_transform) = cameras.iter().find(|(camera, _)| camera.is_active)?;
        camera.viewport_to_world(camera_transform, screen).ok()
    });

    for (entity, mut controller, mut agent, mut transform, authority, mut animator) in q.iter_mut() {
        drive_controller(
            entity,
            tap,
            &mut controller,
            &mut agent,
            &mut transform,
            authority,
            animator.as_deref_mut(),
            &*surface,
            &scene,
        );
    }
}

/// The per-entity body of [`drive_navigation`], independent of where the
/// tap ray and scene queries come from.
#[allow(clippy::too_many_arguments)]
pub fn drive_controller(
    entity: Entity,
    tap: Option<Ray3d>,
    controller: &mut NavigationController,
    agent: &mut SteeringAgent,
    transform: &mut Transform,
    authority: Option<&LocalAuthority>,
    animator: Option<&mut AnimatorParams>,
    surface: &dyn NavSurface,
    scene: &dyn SceneQuery,
) {
    let mut bound = agent.bind(surface);

    if !controller.is_initialized()
        && let Err(err) =
            controller.initialize(authority::resolve(authority), &mut bound, surface, transform)
    {
        warn!("{entity}: {err}. Check the spawn point or the walkable regions.");
    }
    if !controller.has_authority() {
        return;
    }

    let mut cx = NavContext {
        agent: &mut bound,
        surface,
        scene,
        body: transform,
    };
    match controller.simulate(tap, &mut cx) {
        Ok(Some(destination)) => debug!("{entity}: heading to {destination}"),
        Ok(None) | Err(NavError::NoDestinationHit) => {}
        Err(err @ NavError::UnreachableSurface { .. }) => warn!("{entity}: {err}"),
    }

    if let Some(animator) = animator
        && !controller.settings.speed_param.is_empty()
    {
        animator.set_float(&controller.settings.speed_param, controller.normalized_speed());
    }
}
