//! An entity is an identified container of components.
//!
//! Entities are owned by their [`World`].
//! Read access goes through [`Entity`],
//! while mutation goes through [`EntityMut`],
//! which keeps the world borrowed so that assignments can notify subscribers.

use std::{any, fmt};

use crate::comp::{Component, ComponentHandle, ComponentHandleMut, ComponentStore, Signature};
use crate::event::events::OnComponentAssigned;
use crate::{Config, World};


/// Identifies an entity within its world.
///
/// IDs are handed out in increasing order starting from 1
/// and are never reused until the world is [reset](World::reset).
/// The value 0 is reserved as [`EntityId::INVALID`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    /// The reserved ID that never refers to an entity.
    pub const INVALID: Self = Self(0);

    /// Wraps a raw ID.
    pub const fn new(raw: u64) -> Self { Self(raw) }

    /// The raw value of this ID.
    pub fn get(self) -> u64 { self.0 }

    /// Whether this ID is not [`EntityId::INVALID`].
    pub fn is_valid(self) -> bool { self.0 != 0 }

    pub(crate) fn next(self) -> Self { Self(self.0 + 1) }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "#{}", self.0) }
}

/// An entity and its components.
pub struct Entity<C: Config> {
    id:              EntityId,
    components:      ComponentStore<C>,
    pending_destroy: bool,
}

impl<C: Config> Entity<C> {
    pub(crate) fn new(id: EntityId) -> Self {
        Self { id, components: ComponentStore::default(), pending_destroy: false }
    }

    /// The ID of this entity.
    pub fn id(&self) -> EntityId { self.id }

    /// Whether the entity was destroyed and awaits deallocation by [`World::cleanup`].
    ///
    /// Pending entities keep their components until they are deallocated.
    pub fn is_pending_destroy(&self) -> bool { self.pending_destroy }

    /// The components of this entity.
    pub fn components(&self) -> &ComponentStore<C> { &self.components }

    /// Whether the entity has a component of type `T`.
    pub fn has<T: Component<C>>(&self) -> bool { self.components.has::<T>() }

    /// Whether the entity has every component in `S`.
    pub fn has_all<S: Signature<C>>(&self) -> bool { self.components.has_all::<S>() }

    /// Returns a handle to the component of type `T`.
    pub fn get<T: Component<C>>(&self) -> ComponentHandle<'_, T> { self.components.get::<T>() }

    /// Calls `f` with the components in `S` if the entity has all of them.
    ///
    /// Returns whether `f` was called.
    pub fn with<S: Signature<C>>(&self, f: impl FnOnce(S::Refs<'_>)) -> bool {
        self.components.with::<S>(f)
    }

    pub(crate) fn components_mut(&mut self) -> &mut ComponentStore<C> { &mut self.components }

    /// Marks the entity as pending.
    ///
    /// Returns false if it was already pending.
    pub(crate) fn mark_pending(&mut self) -> bool {
        !std::mem::replace(&mut self.pending_destroy, true)
    }
}

impl<C: Config> fmt::Debug for Entity<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("pending_destroy", &self.pending_destroy)
            .field("components", &self.components)
            .finish()
    }
}

/// Mutable access to an entity, borrowing its world.
///
/// The entity is looked up by ID on every call,
/// because subscribers notified during [`assign`](Self::assign)
/// may restructure the world.
/// If the entity has been deallocated in the meantime,
/// queries report absence and mutations panic.
pub struct EntityMut<'w, C: Config> {
    world: &'w mut World<C>,
    id:    EntityId,
}

impl<'w, C: Config> EntityMut<'w, C> {
    pub(crate) fn new(world: &'w mut World<C>, id: EntityId) -> Self { Self { world, id } }

    /// The ID of the entity.
    pub fn id(&self) -> EntityId { self.id }

    /// The world that owns the entity.
    pub fn world(&mut self) -> &mut World<C> { &mut *self.world }

    /// The entity, or `None` if it has been deallocated.
    pub fn entity(&self) -> Option<&Entity<C>> { self.world.get_by_id(self.id) }

    /// Whether the entity is pending destruction.
    pub fn is_pending_destroy(&self) -> bool {
        self.entity().map_or(false, Entity::is_pending_destroy)
    }

    /// Whether the entity has a component of type `T`.
    pub fn has<T: Component<C>>(&self) -> bool { self.entity().map_or(false, Entity::has::<T>) }

    /// Whether the entity has every component in `S`.
    pub fn has_all<S: Signature<C>>(&self) -> bool {
        self.entity().map_or(false, Entity::has_all::<S>)
    }

    /// Returns a handle to the component of type `T`.
    pub fn get<T: Component<C>>(&self) -> ComponentHandle<'_, T> {
        self.entity().map(Entity::get::<T>).unwrap_or_default()
    }

    /// Returns a mutable handle to the component of type `T`.
    pub fn get_mut<T: Component<C>>(&mut self) -> ComponentHandleMut<'_, T> {
        match self.world.entity_parts(self.id) {
            Some((entity, _)) => entity.components_mut().get_mut::<T>(),
            None => ComponentHandleMut::invalid(),
        }
    }

    /// Calls `f` with the components in `S` if the entity has all of them.
    ///
    /// Returns whether `f` was called.
    pub fn with<S: Signature<C>>(&self, f: impl FnOnce(S::Refs<'_>)) -> bool {
        self.entity().map_or(false, |entity| entity.with::<S>(f))
    }

    /// Calls `f` with mutable references to the components in `S`
    /// if the entity has all of them.
    ///
    /// Returns whether `f` was called.
    pub fn with_mut<S: Signature<C>>(&mut self, f: impl FnOnce(S::RefsMut<'_>)) -> bool {
        match self.world.entity_parts(self.id) {
            Some((entity, _)) => entity.components_mut().with_mut::<S>(f),
            None => false,
        }
    }

    /// Assigns a component, replacing any existing component of the same type,
    /// then emits [`OnComponentAssigned<T>`] to the world's subscribers.
    ///
    /// The returned handle is resolved after every subscriber has run,
    /// so it is invalid if a subscriber removed the component or deallocated the entity.
    ///
    /// # Panics
    /// Panics if the entity has been deallocated.
    pub fn assign<T: Component<C>>(&mut self, value: T) -> ComponentHandleMut<'_, T> {
        let id = self.id;
        let (entity, arena) = self.world.entity_parts(id).unwrap_or_else(|| {
            panic!("Cannot assign {} to deallocated entity {}", any::type_name::<T>(), id)
        });
        if entity.components_mut().assign(arena, value) {
            log::trace!("Replaced {} on entity {}", any::type_name::<T>(), id);
        }

        self.world.emit_keyed(T::assigned_identity(), &OnComponentAssigned::<T>::new(id));
        self.get_mut::<T>()
    }

    /// Removes the component of type `T`.
    ///
    /// Returns whether the component was present.
    /// No event is emitted.
    pub fn remove<T: Component<C>>(&mut self) -> bool {
        match self.world.entity_parts(self.id) {
            Some((entity, arena)) => entity.components_mut().remove::<T>(arena),
            None => false,
        }
    }

    /// Removes every component of the entity.
    pub fn remove_all(&mut self) {
        if let Some((entity, arena)) = self.world.entity_parts(self.id) {
            entity.components_mut().remove_all(arena);
        }
    }

    /// Destroys the entity through [`World::destroy`].
    pub fn destroy(self, immediate: bool) -> bool { self.world.destroy(self.id, immediate) }
}

impl<'w, C: Config> fmt::Debug for EntityMut<'w, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.entity() {
            Some(entity) => fmt::Debug::fmt(entity, f),
            None => write!(f, "Entity {{ id: {:?}, deallocated }}", self.id),
        }
    }
}
