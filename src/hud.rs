use bevy::prelude::*;

use crate::authority::LocalAuthority;
use crate::navigation::NavigationController;
use crate::{AnimatorParams, FramePhase};

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hud).add_systems(
            Update,
            (toggle_control, update_status_text).after(FramePhase::Simulate),
        );
    }
}

#[derive(Component)]
struct StatusText;

#[derive(Component)]
struct ControlButton;

#[derive(Component)]
struct ControlButtonLabel;

fn spawn_hud(mut commands: Commands) {
    // Root overlay (non-interactive), otherwise every tap would count as over UI.
    let root = commands
        .spawn((
            Name::new("HUD Root"),
            GlobalZIndex(10),
            Pickable::IGNORE,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                ..default()
            },
        ))
        .id();

    let status = commands
        .spawn((
            StatusText,
            Name::new("Status Text"),
            Pickable::IGNORE,
            Text::new(""),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextColor(Color::srgb(0.9, 0.9, 0.9)),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(16.0),
                top: Val::Px(16.0),
                ..default()
            },
        ))
        .id();

    let button = commands
        .spawn((
            ControlButton,
            Name::new("Control Button"),
            Button,
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(16.0),
                top: Val::Px(16.0),
                padding: UiRect::axes(Val::Px(14.0), Val::Px(8.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.1, 0.1, 0.12, 0.85)),
            BorderRadius::all(Val::Px(6.0)),
            children![(
                ControlButtonLabel,
                Text::new("Release control"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
            )],
        ))
        .id();

    commands.entity(root).add_children(&[status, button]);
}

/// Handing the player back and forth re-initializes its controllers.
fn toggle_control(
    buttons: Query<&Interaction, (Changed<Interaction>, With<ControlButton>)>,
    mut players: Query<&mut LocalAuthority, With<NavigationController>>,
    mut labels: Query<&mut Text, With<ControlButtonLabel>>,
) {
    if !buttons.iter().any(|i| *i == Interaction::Pressed) {
        return;
    }
    for mut authority in players.iter_mut() {
        authority.0 = !authority.0;
        for mut label in labels.iter_mut() {
            label.0 = if authority.0 {
                "Release control".to_string()
            } else {
                "Take control".to_string()
            };
        }
    }
}

fn update_status_text(
    players: Query<(&NavigationController, Option<&AnimatorParams>)>,
    mut text: Single<&mut Text, With<StatusText>>,
) {
    let Ok((controller, animator)) = players.single() else {
        return;
    };
    let speed = animator
        .and_then(|params| params.float(&controller.settings.speed_param))
        .unwrap_or(0.0);
    text.0 = format!("{}  speed {:.2}", controller.state(), speed);
}
