pub mod controller;

pub use controller::*;

use bevy::prelude::*;

use crate::FramePhase;

/// The camera the follow rig drives and taps are cast from.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct MainCamera;

/// Plugin for the trailing follow camera
pub struct FollowCameraPlugin;

impl Plugin for FollowCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                controller::reset_on_authority_change,
                controller::update_camera_position,
            )
                .chain()
                .in_set(FramePhase::Camera),
        );
    }
}
