use bevy::prelude::*;

/// Whether this process drives the entity. Read once when the movement and
/// camera components initialize; an entity without it is locally owned.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Deref)]
pub struct LocalAuthority(pub bool);

impl Default for LocalAuthority {
    fn default() -> Self {
        Self(true)
    }
}

pub(crate) fn resolve(authority: Option<&LocalAuthority>) -> bool {
    authority.is_none_or(|authority| authority.0)
}
