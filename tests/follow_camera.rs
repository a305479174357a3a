use avian3d::prelude::LayerMask;
use bevy::prelude::*;
use tap_to_move::camera::{FollowCamera, FollowCameraRig, FollowCameraSettings};
use tap_to_move::scene::{SceneHit, SceneQuery};

const DT: f32 = 1.0 / 60.0;

/// Every sweep stops `at` units from its origin, touching the wall one
/// sphere radius further on.
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
            normal: *-direction,
            distance: self.at,
        })
    }
}

struct OpenSky;

impl SceneQuery for OpenSky {
    fn raycast(&self, _: Ray3d, _: f32, _: LayerMask) -> Option<SceneHit> {
        None
    }

    fn sphere_cast(&self, _: Vec3, _: f32, _: Dir3, _: f32, _: LayerMask) -> Option<SceneHit> {
        None
    }
}

fn driving(camera: Entity) -> FollowCamera {
    let mut follow = FollowCamera::default();
    follow.initialize(true);
    assert_eq!(follow.acquire_camera(|_| true, || Some(camera)), Some(camera));
    follow
}

#[test]
fn first_frame_lands_on_the_ideal_pose() {
    let mut follow = driving(Entity::PLACEHOLDER);
    let target = Transform::from_xyz(2.0, 0.0, 1.0);
    let mut camera = Transform::from_xyz(-40.0, 17.0, 3.0);

    // A wall does not stop the initial snap
    follow.drive(DT, &target, &mut camera, &WallAt { at: 1.0 });

    assert_eq!(camera.translation, Vec3::new(2.0, 2.0, 5.5));
    let look_at = target.translation + Vec3::new(0.0, 1.3, 0.0);
    let expected = (look_at - camera.translation).normalize();
    assert!(camera.forward().dot(expected) > 0.9999);
}

#[test]
fn occluded_camera_settles_in_front_of_the_wall() {
    let mut follow = driving(Entity::PLACEHOLDER);
    let target = Transform::default();
    let look_at = Vec3::new(0.0, 1.3, 0.0);
    let wall = WallAt { at: 2.0 };
    let mut camera = Transform::default();
    follow.drive(DT, &target, &mut camera, &OpenSky);

    let mut previous = camera.translation.distance(look_at);
    for _ in 0..240 {
        follow.drive(DT, &target, &mut camera, &wall);
        let boom = camera.translation.distance(look_at);
        assert!(boom <= previous + 1e-5);
        previous = boom;
    }

    assert!((previous - (2.0 + 0.2 - 0.05)).abs() < 1e-3);
}

#[test]
fn corrected_position_never_passes_the_hit() {
    let rig = FollowCameraRig::new(FollowCameraSettings::default());
    let target = Transform::default();
    let look_at = rig.look_at_point(&target);
    let ideal = rig.ideal_position(&target);
    let full = ideal.distance(look_at);

    for at in [0.01, 0.5, 1.0, 2.5, full - 0.01] {
        let corrected = rig.occlusion_corrected(look_at, ideal, &WallAt { at });
        let along = corrected.distance(look_at);
        let contact = at + rig.settings.clip_sphere_radius;
        assert!(along < contact, "contact at {contact} left the camera at {along}");
        assert!(corrected.distance(ideal) > 0.0);
        // Stays on the segment between the look-at point and the ideal position
        let on_segment = (corrected - look_at).normalize_or_zero().dot((ideal - look_at).normalize());
        assert!(along == 0.0 || on_segment > 0.9999);
    }

    let clear = rig.occlusion_corrected(look_at, ideal, &WallAt { at: full + 1.0 });
    assert_eq!(clear, ideal);
}

#[test]
fn yaw_relaxes_toward_a_turned_target_without_overshoot() {
    let mut follow = driving(Entity::PLACEHOLDER);
    let mut camera = Transform::default();
    follow.drive(DT, &Transform::default(), &mut camera, &OpenSky);

    let turned = Transform::from_rotation(Quat::from_rotation_y(2.0));
    let mut yaw = follow.rig.current_yaw();
    for _ in 0..240 {
        follow.drive(DT, &turned, &mut camera, &OpenSky);
        let next = follow.rig.current_yaw();
        assert!(next >= yaw - 1e-6 && next <= 2.0 + 1e-5);
        yaw = next;
    }
    assert!((yaw - 2.0).abs() < 1e-3);
}

#[test]
fn released_authority_stops_driving_until_reinitialized() {
    let camera = Entity::PLACEHOLDER;
    let mut follow = driving(camera);

    follow.reinitialize();
    follow.initialize(false);
    assert_eq!(follow.acquire_camera(|_| true, || Some(camera)), None);

    follow.reinitialize();
    follow.initialize(true);
    assert_eq!(follow.acquire_camera(|_| true, || Some(camera)), Some(camera));
}
