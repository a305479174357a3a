use avian3d::prelude::LayerMask;
use bevy::prelude::*;

use super::MainCamera;
use crate::authority::{self, LocalAuthority};
use crate::math::{lerp_angle, smoothing_factor, wrap_angle, yaw_of};
use crate::scene::{SceneProbe, SceneQuery};

/// Shortest look-at to camera span worth testing for occlusion.
const MIN_BOOM_LENGTH: f32 = 0.001;

/// Tunables for the trailing camera
#[derive(Debug, Clone, PartialEq)]
pub struct FollowCameraSettings {
    /// Distance behind the target
    pub distance: f32,
    /// Height above the target
    pub height: f32,
    /// Camera position follow speed (higher = faster, more responsive)
    pub position_smoothing: f32,
    /// Camera rotation smoothing speed
    pub rotation_smoothing: f32,
    /// How quickly the orbit yaw catches up with the target's heading
    pub yaw_smoothing: f32,
    /// World-space offset from the target to the point the camera looks at
    pub look_at_offset: Vec3,
    /// Radius of the sphere swept toward the camera to detect walls
    pub clip_sphere_radius: f32,
    /// Layers that can push the camera in
    pub clip_mask: LayerMask,
    /// How far in front of an obstruction the camera stops
    pub clip_margin: f32,
    /// Frames between camera discovery attempts after the first retry
    pub camera_retry_frames: u32,
}

impl Default for FollowCameraSettings {
    fn default() -> Self {
        Self {
            distance: 4.5,
            height: 2.0,
            position_smoothing: 12.0,
            rotation_smoothing: 12.0,
            yaw_smoothing: 12.0,
            look_at_offset: Vec3::new(0.0, 1.3, 0.0),
            clip_sphere_radius: 0.2,
            clip_mask: LayerMask::ALL,
            clip_margin: 0.05,
            camera_retry_frames: 30,
        }
    }
}

/// Orbit math for a camera trailing behind a target's heading.
#[derive(Debug, Clone, Default)]
pub struct FollowCameraRig {
    pub settings: FollowCameraSettings,
    current_yaw: f32,
}

impl FollowCameraRig {
    pub fn new(settings: FollowCameraSettings) -> Self {
        Self {
            settings,
            current_yaw: 0.0,
        }
    }

    pub fn current_yaw(&self) -> f32 {
        self.current_yaw
    }

    /// Where the camera wants to be, ignoring obstructions.
    pub fn ideal_position(&self, target: &Transform) -> Vec3 {
        // -Z is forward, so behind the target is +Z
        let offset = Vec3::new(0.0, self.settings.height, self.settings.distance);
        target.translation + Quat::from_rotation_y(self.current_yaw) * offset
    }

    pub fn look_at_point(&self, target: &Transform) -> Vec3 {
        target.translation + self.settings.look_at_offset
    }

    /// Adopt the target's heading and return the exact ideal pose.
    pub fn snap(&mut self, target: &Transform) -> Transform {
        self.current_yaw = yaw_of(target.rotation);
        let position = self.ideal_position(target);
        let look_at = self.look_at_point(target);
        let mut pose = Transform::from_translation(position);
        if position.distance_squared(look_at) > f32::EPSILON {
            pose.look_at(look_at, Vec3::Y);
        }
        pose
    }

    /// Pull `ideal` toward `look_at` when a sphere swept between them hits
    /// something: the contact point backed off by `clip_margin`, projected
    /// onto the boom and kept short of `ideal`.
    pub fn occlusion_corrected(&self, look_at: Vec3, ideal: Vec3, scene: &dyn SceneQuery) -> Vec3 {
        let boom = ideal - look_at;
        let length = boom.length();
        if length <= MIN_BOOM_LENGTH {
            return ideal;
        }
        let Ok(direction) = Dir3::new(boom) else {
            return ideal;
        };

        match scene.sphere_cast(
            look_at,
            self.settings.clip_sphere_radius,
            direction,
            length,
            self.settings.clip_mask,
        ) {
            Some(hit) if hit.distance < length => {
                let margin = self.settings.clip_margin;
                let pulled = hit.point - direction * margin;
                let along = (pulled - look_at)
                    .dot(*direction)
                    .clamp(0.0, (length - margin).max(0.0));
                look_at + direction * along
            }
            _ => ideal,
        }
    }

    /// Advance one rendered frame.
    pub fn update(
        &mut self,
        dt: f32,
        target: &Transform,
        camera: &mut Transform,
        scene: &dyn SceneQuery,
    ) {
        let target_yaw = yaw_of(target.rotation);
        self.current_yaw = wrap_angle(lerp_angle(
            self.current_yaw,
            target_yaw,
            smoothing_factor(dt, self.settings.yaw_smoothing),
        ));

        let look_at = self.look_at_point(target);
        let ideal = self.occlusion_corrected(look_at, self.ideal_position(target), scene);

        camera.translation = camera
            .translation
            .lerp(ideal, smoothing_factor(dt, self.settings.position_smoothing));

        if let Ok(direction) = Dir3::new(look_at - camera.translation) {
            let target_rotation = Transform::default().looking_to(direction, Vec3::Y).rotation;
            camera.rotation = camera.rotation.slerp(
                target_rotation,
                smoothing_factor(dt, self.settings.rotation_smoothing),
            );
        }
    }
}

/// Drives the [`MainCamera`] to trail this entity (or [`Self::target`]).
#[derive(Component, Debug, Clone, Default)]
pub struct FollowCamera {
    pub rig: FollowCameraRig,
    /// Followed body; `None` follows the entity carrying this component.
    pub target: Option<Entity>,
    camera: Option<Entity>,
    authority: bool,
    initialized: bool,
    snapped: bool,
    misses: u32,
    retry_in: u32,
}

impl FollowCamera {
    pub fn new(settings: FollowCameraSettings) -> Self {
        Self {
            rig: FollowCameraRig::new(settings),
            ..default()
        }
    }

    pub fn with_target(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }

    pub fn camera(&self) -> Option<Entity> {
        self.camera
    }

    pub fn has_authority(&self) -> bool {
        self.authority
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn initialize(&mut self, authority: bool) {
        self.authority = authority;
        self.initialized = true;
    }

    /// Forget the camera and orbit state; authority is latched again next frame.
    pub fn reinitialize(&mut self) {
        let rig = FollowCameraRig::new(std::mem::take(&mut self.rig.settings));
        *self = Self {
            rig,
            target: self.target,
            ..default()
        };
    }

    /// The camera to drive this frame. Looks one up right away, again on
    /// the next frame, then only every `camera_retry_frames` frames.
    pub fn acquire_camera(
        &mut self,
        is_alive: impl Fn(Entity) -> bool,
        find: impl FnOnce() -> Option<Entity>,
    ) -> Option<Entity> {
        if !self.authority {
            return None;
        }
        if let Some(camera) = self.camera {
            if is_alive(camera) {
                return Some(camera);
            }
            self.camera = None;
            self.snapped = false;
        }
        if self.retry_in > 0 {
            self.retry_in -= 1;
            return None;
        }

        self.camera = find();
        match self.camera {
            Some(_) => self.misses = 0,
            None => {
                self.retry_in = match self.misses {
                    0 => 0,
                    _ => self.rig.settings.camera_retry_frames.saturating_sub(1),
                };
                self.misses += 1;
            }
        }
        self.camera
    }

    /// Snap on the first frame with a camera, follow smoothly afterwards.
    pub fn drive(
        &mut self,
        dt: f32,
        target: &Transform,
        camera: &mut Transform,
        scene: &dyn SceneQuery,
    ) {
        if self.snapped {
            self.rig.update(dt, target, camera, scene);
        } else {
            *camera = self.rig.snap(target);
            self.snapped = true;
        }
    }
}

pub fn reset_on_authority_change(
    mut q: Query<(Entity, &mut FollowCamera, &LocalAuthority), Changed<LocalAuthority>>,
) {
    for (entity, mut follow, authority) in q.iter_mut() {
        if follow.is_initialized() && follow.has_authority() != authority.0 {
            info!("{entity}: camera authority changed to {}", authority.0);
            follow.reinitialize();
        }
    }
}

/// Position the main camera behind its target with occlusion avoidance
pub fn update_camera_position(
    time: Res<Time>,
    scene: SceneProbe,
    mut rigs: Query<(Entity, &mut FollowCamera, Option<&LocalAuthority>)>,
    cameras: Query<(Entity, &Camera), With<MainCamera>>,
    mut transforms: Query<&mut Transform>,
) {
    let dt = time.delta_secs();

    for (entity, mut follow, authority) in rigs.iter_mut() {
        if !follow.is_initialized() {
            follow.initialize(authority::resolve(authority));
        }

        let Some(camera) = follow.acquire_camera(
            |camera| cameras.get(camera).is_ok_and(|(_, c)| c.is_active),
            || {
                cameras
                    .iter()
                    .find(|(_, c)| c.is_active)
                    .map(|(camera, _)| camera)
            },
        ) else {
            continue;
        };

        let target = follow.target.unwrap_or(entity);
        let Ok(target_transform) = transforms.get(target).copied() else {
            continue;
        };
        let Ok(mut camera_transform) = transforms.get_mut(camera) else {
            continue;
        };

        follow.drive(dt, &target_transform, &mut camera_transform, &scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneHit;

    struct OpenSky;

    impl SceneQuery for OpenSky {
        fn raycast(&self, _: Ray3d, _: f32, _: LayerMask) -> Option<SceneHit> {
            None
        }
        fn sphere_cast(&self, _: Vec3, _: f32, _: Dir3, _: f32, _: LayerMask) -> Option<SceneHit> {
            None
        }
    }

    fn authoritative() -> FollowCamera {
        let mut follow = FollowCamera::default();
        follow.initialize(true);
        follow
    }

    #[test]
    fn snap_lands_exactly_on_ideal_pose() {
        let mut rig = FollowCameraRig::default();
        let target = Transform::from_xyz(1.0, 0.0, -3.0);

        let pose = rig.snap(&target);

        assert_eq!(pose.translation, Vec3::new(1.0, 2.0, 1.5));
        let forward = pose.forward();
        let expected = (rig.look_at_point(&target) - pose.translation).normalize();
        assert!(forward.dot(expected) > 0.9999);
    }

    #[test]
    fn snap_adopts_target_heading() {
        let mut rig = FollowCameraRig::default();
        let target = Transform::from_rotation(Quat::from_rotation_y(1.2));
        rig.snap(&target);
        assert!((rig.current_yaw() - 1.2).abs() < 1e-5);
    }

    #[test]
    fn yaw_follows_target_heading_only() {
        let mut rig = FollowCameraRig::default();
        let mut camera = rig.snap(&Transform::default());
        let tilted = Transform::from_rotation(Quat::from_rotation_y(0.5) * Quat::from_rotation_x(0.8));

        for _ in 0..300 {
            rig.update(1.0 / 60.0, &tilted, &mut camera, &OpenSky);
        }

        assert!((rig.current_yaw() - 0.5).abs() < 1e-3);
        let ideal = rig.ideal_position(&tilted);
        assert!(camera.translation.distance(ideal) < 1e-3);
        assert!((ideal.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn discovery_retries_next_frame_then_backs_off() {
        let mut follow = authoritative();
        follow.rig.settings.camera_retry_frames = 3;
        let mut lookups = Vec::new();

        for frame in 0..8 {
            follow.acquire_camera(|_| true, || {
                lookups.push(frame);
                None
            });
        }

        assert_eq!(lookups, vec![0, 1, 4, 7]);
    }

    #[test]
    fn lost_camera_is_rediscovered_and_resnapped() {
        let camera = Entity::PLACEHOLDER;
        let mut follow = authoritative();
        assert_eq!(follow.acquire_camera(|_| true, || Some(camera)), Some(camera));

        let mut pose = Transform::default();
        follow.drive(0.016, &Transform::default(), &mut pose, &OpenSky);
        assert!(follow.snapped);

        assert_eq!(follow.acquire_camera(|_| false, || None), None);
        assert!(!follow.snapped);
        assert_eq!(follow.camera(), None);
    }

    #[test]
    fn without_authority_never_looks_for_a_camera() {
        let mut follow = FollowCamera::default();
        follow.initialize(false);
        let found = follow.acquire_camera(|_| true, || panic!("must not search"));
        assert_eq!(found, None);
        assert_eq!(follow.rig.current_yaw(), 0.0);
    }

    /// Sweep that touches a wall `at` units out; the contact sits one
    /// sphere radius further along.
    struct WallAt {
        at: f32,
    }

    impl SceneQuery for WallAt {
        fn raycast(&self, _: Ray3d, _: f32, _: LayerMask) -> Option<SceneHit> {
            None
        }
        fn sphere_cast(
            &self,
            origin: Vec3,
            radius: f32,
            direction: Dir3,
            max_distance: f32,
            _: LayerMask,
        ) -> Option<SceneHit> {
            (self.at <= max_distance).then(|| SceneHit {
                entity: Entity::PLACEHOLDER,
                point: origin + direction * (self.at + radius),
                normal: -direction.as_vec3(),
                distance: self.at,
            })
        }
    }

    #[test]
    fn occluded_camera_sits_margin_in_front_of_contact() {
        let rig = FollowCameraRig::default();
        let target = Transform::default();
        let look_at = rig.look_at_point(&target);
        let ideal = rig.ideal_position(&target);

        let corrected = rig.occlusion_corrected(look_at, ideal, &WallAt { at: 2.0 });

        assert!((corrected.distance(look_at) - 2.15).abs() < 1e-4);
        let boom = (ideal - look_at).normalize();
        assert!((corrected - look_at).normalize().dot(boom) > 0.9999);
    }

    #[test]
    fn contact_past_the_ideal_still_pulls_in() {
        let rig = FollowCameraRig::default();
        let target = Transform::default();
        let look_at = rig.look_at_point(&target);
        let ideal = rig.ideal_position(&target);
        let length = ideal.distance(look_at);

        let corrected = rig.occlusion_corrected(look_at, ideal, &WallAt { at: length - 0.01 });

        assert!((corrected.distance(look_at) - (length - 0.05)).abs() < 1e-4);
    }
}
