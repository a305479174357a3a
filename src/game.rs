use std::f32::consts::PI;

use avian3d::prelude::*;
use bevy::light::CascadeShadowConfigBuilder;
use bevy::prelude::*;
use bevy_inspector_egui::bevy_egui::EguiPlugin;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use crate::animation::AnimatorParams;
use crate::authority::LocalAuthority;
use crate::camera::{FollowCamera, FollowCameraSettings, MainCamera};
use crate::navigation::{NavRegion, NavRegions, NavigationController, NavigationSettings, SteeringAgent};

pub struct GamePlugin;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug)]
pub enum GameLayer {
    #[default]
    Default,
    Ground,
    Wall,
    Player,
}

const ARENA_SIZE: f32 = 24.0;
const WALL_HEIGHT: f32 = 3.0;
const GROUND_TOP: f32 = 0.05;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(avian3d::prelude::PhysicsPlugins::default());
        app.insert_resource(avian3d::prelude::Gravity(Vec3::NEG_Y * 9.0));
        //app.add_plugins(avian3d::prelude::PhysicsDebugPlugin::default());
        app.add_plugins(EguiPlugin::default());

        #[cfg(not(target_arch = "wasm32"))]
        app.add_plugins(WorldInspectorPlugin::new());

        app.add_plugins(crate::TapToMovePlugin);
        app.add_plugins(crate::hud::HudPlugin);
        app.insert_resource(ClearColor(Color::srgb(0.0, 0.0, 0.0))); // Very dark black background
        app.add_systems(Startup, setup);
    }
}

/// set up a walled arena
fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut ambient_light: ResMut<AmbientLight>,
    mut regions: ResMut<NavRegions>,
) {
    ambient_light.brightness = 100.0;

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::OVERCAST_DAY,
            shadows_enabled: true,
            ..default()
        },
        Transform {
            translation: Vec3::new(0.0, 2.0, 0.0),
            rotation: Quat::from_rotation_x(-PI / 4.),
            ..default()
        },
        CascadeShadowConfigBuilder {
            first_cascade_far_bound: 4.0,
            maximum_distance: 100.0,
            ..default()
        }
        .build(),
    ));

    let stone = materials.add(StandardMaterial {
        base_color: Color::srgb(0.35, 0.38, 0.33),
        perceptual_roughness: 1.0,
        ..default()
    });
    let wall = materials.add(StandardMaterial {
        base_color: Color::srgb(0.45, 0.4, 0.36),
        perceptual_roughness: 0.9,
        ..default()
    });

    // base
    commands.spawn((
        Name::new("Ground"),
        Mesh3d(meshes.add(Cuboid::new(ARENA_SIZE, 0.1, ARENA_SIZE))),
        MeshMaterial3d(stone),
        RigidBody::Static,
        Collider::cuboid(ARENA_SIZE, 0.1, ARENA_SIZE),
        CollisionLayers::new(GameLayer::Ground, LayerMask::ALL),
    ));
    // The outer metre is under the walls
    regions.push(NavRegion::from_center_size(
        Vec3::new(0.0, GROUND_TOP, 0.0),
        Vec2::splat(ARENA_SIZE - 2.0),
    ));

    let half = ARENA_SIZE * 0.5 - 0.5;
    for (name, center, size) in [
        ("North Wall", Vec3::new(0.0, 0.0, -half), Vec3::new(ARENA_SIZE, WALL_HEIGHT, 1.0)),
        ("South Wall", Vec3::new(0.0, 0.0, half), Vec3::new(ARENA_SIZE, WALL_HEIGHT, 1.0)),
        ("West Wall", Vec3::new(-half, 0.0, 0.0), Vec3::new(1.0, WALL_HEIGHT, ARENA_SIZE)),
        ("East Wall", Vec3::new(half, 0.0, 0.0), Vec3::new(1.0, WALL_HEIGHT, ARENA_SIZE)),
    ] {
        commands.spawn((
            Name::new(name),
            Mesh3d(meshes.add(Cuboid::from_size(size))),
            MeshMaterial3d(wall.clone()),
            Transform::from_translation(center + Vec3::Y * (WALL_HEIGHT * 0.5 + GROUND_TOP)),
            RigidBody::Static,
            Collider::cuboid(size.x, size.y, size.z),
            CollisionLayers::new(GameLayer::Wall, LayerMask::ALL),
        ));
    }

    // A trigger volume the camera must see through
    commands.spawn((
        Name::new("Trigger Zone"),
        Transform::from_xyz(-5.0, 1.0, 4.0),
        Collider::cuboid(3.0, 2.0, 3.0),
        Sensor,
        CollisionLayers::new(GameLayer::Wall, LayerMask::ALL),
    ));

    commands.spawn((
        Name::new("Main Camera"),
        Camera3d::default(),
        MainCamera,
        Transform::from_xyz(0.0, 3.0, 5.0).looking_at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y),
    ));

    // Spawned slightly above the floor so the startup snap puts it down
    commands.spawn((
        Name::new("Player"),
        Transform::from_xyz(0.0, 0.6, 0.0),
        Visibility::default(),
        RigidBody::Dynamic,
        NavigationController::new(NavigationSettings {
            ground_mask: GameLayer::Ground.into(),
            ..default()
        }),
        SteeringAgent::default().with_speed(4.0),
        FollowCamera::new(FollowCameraSettings {
            clip_mask: [GameLayer::Ground, GameLayer::Wall].into(),
            ..default()
        }),
        LocalAuthority(true),
        AnimatorParams::default(),
        children![(
            Mesh3d(meshes.add(Capsule3d::new(0.3, 1.0))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(0.8, 0.55, 0.2),
                ..default()
            })),
            // Capsule bottom on the agent's feet: 0.5 + 0.3
            Transform::from_xyz(0.0, 0.8, 0.0),
            Collider::capsule(0.3, 1.0),
            CollisionLayers::new(GameLayer::Player, [GameLayer::Default, GameLayer::Wall]),
        )],
    ));
}
