pub mod animation;
pub mod authority;
pub mod camera;
pub mod game;
pub mod hud;
pub mod input;
pub mod math;
pub mod navigation;
pub mod scene;

use bevy::prelude::*;

// Re-export commonly used items
pub use animation::{AnimationSink, AnimatorParams};
pub use authority::LocalAuthority;
pub use camera::{FollowCamera, FollowCameraPlugin, FollowCameraSettings, MainCamera};
pub use game::GamePlugin;
pub use navigation::{NavigationController, NavigationPlugin, NavigationSettings};

/// Per-frame ordering: the body settles before the camera reads it.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramePhase {
    Simulate,
    Camera,
}

/// Tap-to-move navigation plus the follow camera, phased in `Update`.
pub struct TapToMovePlugin;

impl Plugin for TapToMovePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(Update, (FramePhase::Simulate, FramePhase::Camera).chain());
        app.add_plugins((NavigationPlugin, FollowCameraPlugin));
    }
}
