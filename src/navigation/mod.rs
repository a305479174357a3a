pub mod agent;
pub mod controller;
pub mod error;
pub mod steering;
pub mod surface;
pub mod systems;

pub use agent::*;
pub use controller::*;
pub use error::NavError;
pub use steering::*;
pub use surface::*;

use bevy::prelude::*;

use crate::FramePhase;
use crate::input::{PointerFrame, collect_pointer_frame};

/// Tap-to-move for the locally controlled body.
pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NavRegions>();
        app.init_resource::<PointerFrame>();
        app.add_observer(systems::on_agent_added);
        app.add_observer(systems::configure_body);
        app.add_systems(
            Update,
            (
                collect_pointer_frame,
                systems::reset_on_authority_change,
                systems::step_agents,
                systems::drive_navigation,
            )
                .chain()
                .in_set(FramePhase::Simulate),
        );
    }
}

/// Copy the simulated agent pose onto its body.
pub fn sync_body(agent: &SteeringAgent, transform: &mut Transform) {
    transform.translation = agent.position();
    if agent.settings().update_rotation {
        transform.rotation = agent.rotation();
    }
}
