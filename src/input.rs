use bevy::picking::hover::HoverMap;
use bevy::picking::pointer::PointerId;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// A pointer that went down this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPress {
    /// Logical window coordinates, origin top-left.
    pub position: Vec2,
    pub over_ui: bool,
}

/// Pointer presses sampled at the start of the simulation phase.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerFrame {
    /// Primary mouse button pressed this frame.
    pub mouse: Option<PointerPress>,
    /// The first active touch, if it began this frame.
    pub first_touch: Option<PointerPress>,
}

impl PointerFrame {
    /// At most one tap per frame. A mouse press wins over touch, and a
    /// mouse press over UI swallows the frame.
    pub fn tap(&self) -> Option<Vec2> {
        if let Some(press) = self.mouse {
            return (!press.over_ui).then_some(press.position);
        }
        self.first_touch
            .filter(|press| !press.over_ui)
            .map(|press| press.position)
    }
}

pub fn collect_pointer_frame(
    mut frame: ResMut<PointerFrame>,
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    touches: Option<Res<Touches>>,
    window: Query<&Window, With<PrimaryWindow>>,
    hover_map: Option<Res<HoverMap>>,
    ui_nodes: Query<(), With<Node>>,
) {
    let over_ui = |pointer: PointerId| {
        hover_map.as_ref().is_some_and(|map| {
            map.get(&pointer)
                .is_some_and(|hovered| hovered.keys().any(|entity| ui_nodes.contains(*entity)))
        })
    };

    let mouse_press = mouse
        .filter(|mouse| mouse.just_pressed(MouseButton::Left))
        .and_then(|_| window.single().ok()?.cursor_position());

    let touch_press = touches.as_ref().and_then(|touches| {
        let first = touches.iter().min_by_key(|touch| touch.id())?;
        touches
            .just_pressed(first.id())
            .then(|| (first.id(), first.position()))
    });

    *frame = PointerFrame {
        mouse: mouse_press.map(|position| PointerPress {
            position,
            over_ui: over_ui(PointerId::Mouse),
        }),
        first_touch: touch_press.map(|(id, position)| PointerPress {
            position,
            over_ui: over_ui(PointerId::Touch(id)),
        }),
    };
}
