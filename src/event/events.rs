//! Events emitted by the world itself.

use std::marker::PhantomData;
use std::{any, fmt};

use crate::comp::{Component, ComponentHandle};
use crate::entity::EntityId;
use crate::identity::Registered;
use crate::{Config, World};

/// Emitted right after an entity is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, crate::Registered)]
#[entwine(entwine_as(crate))]
pub struct OnEntityCreated {
    /// The new entity.
    pub entity: EntityId,
}

/// Emitted when an entity is marked for destruction,
/// before it is deallocated.
///
/// The entity and its components are still readable from the world
/// while this event is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, crate::Registered)]
#[entwine(entwine_as(crate))]
pub struct OnEntityDestroyed {
    /// The destroyed entity.
    pub entity: EntityId,
}

/// Emitted after a component of type `T` is assigned to an entity,
/// whether it was newly added or replaced.
pub struct OnComponentAssigned<T> {
    /// The entity the component was assigned to.
    pub entity: EntityId,
    _ph:        PhantomData<fn() -> T>,
}

impl<T> OnComponentAssigned<T> {
    pub(crate) fn new(entity: EntityId) -> Self { Self { entity, _ph: PhantomData } }

    /// Reads the assigned component from the world.
    ///
    /// The handle is invalid if the component has been removed
    /// or the entity has been deallocated since.
    pub fn component<'w, C: Config>(&self, world: &'w World<C>) -> ComponentHandle<'w, T>
    where
        T: Component<C>,
    {
        world.get_by_id(self.entity).map(|entity| entity.get::<T>()).unwrap_or_default()
    }
}

impl<T: Registered> Registered for OnComponentAssigned<T> {}

impl<T> Clone for OnComponentAssigned<T> {
    fn clone(&self) -> Self { *self }
}

impl<T> Copy for OnComponentAssigned<T> {}

impl<T> PartialEq for OnComponentAssigned<T> {
    fn eq(&self, other: &Self) -> bool { self.entity == other.entity }
}

impl<T> Eq for OnComponentAssigned<T> {}

impl<T> fmt::Debug for OnComponentAssigned<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "OnComponentAssigned<{}> {{ entity: {:?} }}", any::type_name::<T>(), self.entity)
    }
}
