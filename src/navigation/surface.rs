use bevy::prelude::*;

/// Answers "where is the closest walkable point near here".
pub trait NavSurface {
    fn sample_position(&self, point: Vec3, radius: f32) -> Option<Vec3>;
}

/// A flat, axis-aligned walkable rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavRegion {
    pub min: Vec2,
    pub max: Vec2,
    /// World Y of the walkable plane.
    pub height: f32,
}

impl NavRegion {
    /// Region centred on `center` spanning `size` on the XZ plane.
    pub fn from_center_size(center: Vec3, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center.xz() - half,
            max: center.xz() + half,
            height: center.y,
        }
    }

    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let xz = point.xz().clamp(self.min, self.max);
        Vec3::new(xz.x, self.height, xz.y)
    }
}

/// The navigable surface used by the built-in [`SteeringAgent`](super::SteeringAgent).
///
/// Generating these from level geometry is out of scope; levels register
/// their walkable rectangles directly.
#[derive(Resource, Debug, Clone, Default)]
pub struct NavRegions {
    pub regions: Vec<NavRegion>,
}

impl NavRegions {
    pub fn new(regions: impl IntoIterator<Item = NavRegion>) -> Self {
        Self {
            regions: regions.into_iter().collect(),
        }
    }

    pub fn push(&mut self, region: NavRegion) {
        self.regions.push(region);
    }
}

impl NavSurface for NavRegions {
    fn sample_position(&self, point: Vec3, radius: f32) -> Option<Vec3> {
        self.regions
            .iter()
            .map(|region| region.closest_point(point))
            .map(|candidate| (candidate, candidate.distance(point)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(candidate, _)| candidate)
    }
}
