use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum NavError {
    /// No navigable surface within the search radius of the agent.
    #[error("no navigable surface within {radius}m of the agent")]
    UnreachableSurface { radius: f32 },
    /// The tap did not resolve to anything on the ground.
    #[error("tap did not hit the ground")]
    NoDestinationHit,
}
