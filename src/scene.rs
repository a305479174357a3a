use avian3d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// A single contact reported by a scene query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    pub entity: Entity,
    /// World-space contact point on the hit collider.
    pub point: Vec3,
    pub normal: Vec3,
    /// Distance travelled along the cast before the contact.
    pub distance: f32,
}

/// Ray and sphere sweeps against the scene. Trigger volumes never report hits.
pub trait SceneQuery {
    fn raycast(&self, ray: Ray3d, max_distance: f32, mask: LayerMask) -> Option<SceneHit>;

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Dir3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SceneHit>;
}

/// [`SceneQuery`] backed by the avian spatial query pipeline.
#[derive(SystemParam)]
pub struct SceneProbe<'w, 's> {
    spatial: SpatialQuery<'w, 's>,
    sensors: Query<'w, 's, (), With<Sensor>>,
}

impl SceneQuery for SceneProbe<'_, '_> {
    fn raycast(&self, ray: Ray3d, max_distance: f32, mask: LayerMask) -> Option<SceneHit> {
        let filter = SpatialQueryFilter::from_mask(mask);
        let hit = self.spatial.cast_ray_predicate(
            ray.origin,
            ray.direction,
            max_distance,
            true,
            &filter,
            &|entity| !self.sensors.contains(entity),
        )?;
        Some(SceneHit {
            entity: hit.entity,
            point: ray.get_point(hit.distance),
            normal: hit.normal,
            distance: hit.distance,
        })
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Dir3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<SceneHit> {
        let filter = SpatialQueryFilter::from_mask(mask);
        // Geometry already overlapping the sphere at the origin is not an occluder.
        let config = ShapeCastConfig {
            ignore_origin_penetration: true,
            ..ShapeCastConfig::from_max_distance(max_distance)
        };
        let hit = self.spatial.cast_shape_predicate(
            &Collider::sphere(radius),
            origin,
            Quat::IDENTITY,
            direction,
            &config,
            &filter,
            &|entity| !self.sensors.contains(entity),
        )?;
        Some(SceneHit {
            entity: hit.entity,
            point: hit.point1,
            normal: hit.normal1,
            distance: hit.distance,
        })
    }
}
