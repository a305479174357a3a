use bevy::platform::collections::HashMap;
use bevy::prelude::*;

/// Receives named float parameters, one write per frame per name.
pub trait AnimationSink {
    fn set_float(&mut self, name: &str, value: f32);
}

/// Float parameters for whatever drives the character's animation blend.
#[derive(Component, Debug, Default, Clone)]
pub struct AnimatorParams {
    floats: HashMap<String, f32>,
}

impl AnimatorParams {
    pub fn float(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }
}

impl AnimationSink for AnimatorParams {
    fn set_float(&mut self, name: &str, value: f32) {
        match self.floats.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.floats.insert(name.to_owned(), value);
            }
        }
    }
}
