//! The world owns all entities, systems and event subscriptions.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::{any, fmt, mem};

use itertools::Itertools;

use crate::arena::{Arena, Product};
use crate::comp::Signature;
use crate::entity::{Entity, EntityId, EntityMut};
use crate::event::events::{OnEntityCreated, OnEntityDestroyed};
use crate::event::{Bus, Event, Subscriber};
use crate::identity::{Strategy, TypeIdentity};
use crate::system::{System, SystemId};
use crate::tracer::{self, Tracer};
use crate::{Config, DefaultConfig};

mod view;
pub use view::{Cursor, View};

#[cfg(test)]
mod tests;

static_assertions::assert_not_impl_any!(World: Send, Sync);

struct SystemSlot<C: Config> {
    id:     SystemId,
    /// `None` while the system is running.
    system: Option<Box<dyn System<C>>>,
}

/// The container of all entities, systems and subscriptions.
///
/// All objects owned by the world are allocated through its [arena](Config::Arena).
/// Dropping the world tears it down:
/// every remaining entity is destroyed (emitting [`OnEntityDestroyed`]) and deallocated,
/// then every system is unconfigured in registration order,
/// repeating while unconfigured systems leave entities behind,
/// then every subscriber list is released.
pub struct World<C: Config = DefaultConfig> {
    arena:          C::Arena,
    /// Entities in creation order.
    entities:       Vec<Box<Entity<C>>>,
    /// Maps entity IDs to their position in `entities`.
    positions:      HashMap<EntityId, usize>,
    last_entity_id: EntityId,
    /// Bumped whenever positions in `entities` shift.
    generation:     u64,
    /// Systems in registration order, which is also the order of their IDs.
    systems:        Vec<SystemSlot<C>>,
    next_system_id: u64,
    bus:            Bus<C>,
}

impl<C: Config> Default for World<C> {
    fn default() -> Self { Self::new() }
}

impl<C: Config> World<C> {
    /// Creates an empty world with a default arena.
    pub fn new() -> Self { Self::with_arena(C::Arena::default()) }

    /// Creates an empty world that allocates from `arena`.
    pub fn with_arena(arena: C::Arena) -> Self {
        log::debug!(
            "Creating world with {} arena and {} identities",
            any::type_name::<C::Arena>(),
            <C::Identity as Strategy>::NAME,
        );

        Self {
            arena,
            entities: Vec::new(),
            positions: HashMap::new(),
            last_entity_id: EntityId::INVALID,
            generation: 0,
            systems: Vec::new(),
            next_system_id: 1,
            bus: Bus::default(),
        }
    }

    /// Tears down the world.
    ///
    /// This is equivalent to dropping it.
    pub fn destroy_world(self) { drop(self) }

    /// The arena of this world.
    pub fn arena(&self) -> &C::Arena { &self.arena }

    /// Number of entities, including entities pending destruction.
    pub fn count(&self) -> usize { self.entities.len() }

    /// Returns the entity at `index` in creation order, including pending entities.
    pub fn get_by_index(&self, index: usize) -> Option<&Entity<C>> {
        self.entities.get(index).map(|entity| &**entity)
    }

    /// Returns the entity with the given ID if it has not been deallocated.
    pub fn get_by_id(&self, id: EntityId) -> Option<&Entity<C>> {
        let &position = self.positions.get(&id)?;
        Some(&*self.entities[position])
    }

    /// Returns mutable access to the entity with the given ID
    /// if it has not been deallocated.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<EntityMut<'_, C>> {
        if self.positions.contains_key(&id) {
            Some(EntityMut::new(self, id))
        } else {
            None
        }
    }

    pub(crate) fn entity_parts(
        &mut self,
        id: EntityId,
    ) -> Option<(&mut Entity<C>, &mut C::Arena)> {
        let &position = self.positions.get(&id)?;
        Some((&mut *self.entities[position], &mut self.arena))
    }

    /// Creates an entity with no components and emits [`OnEntityCreated`].
    pub fn create(&mut self) -> EntityId {
        let id = self.last_entity_id.next();
        self.last_entity_id = id;

        let entity = self.arena.allocate(Product::Entity, Entity::new(id));
        self.positions.insert(id, self.entities.len());
        self.entities.push(entity);
        log::trace!("Created entity {}", id);

        self.emit(&OnEntityCreated { entity: id });
        id
    }

    /// Destroys an entity.
    ///
    /// If the entity is alive, it is marked as pending and [`OnEntityDestroyed`] is emitted.
    /// If `immediate` is true, the entity is also deallocated right away,
    /// which invalidates all [`Cursor`]s;
    /// otherwise it is deallocated by the next [`cleanup`](Self::cleanup).
    ///
    /// Returns false if the entity does not exist or has already been deallocated.
    pub fn destroy(&mut self, id: EntityId, immediate: bool) -> bool {
        let &position = match self.positions.get(&id) {
            Some(position) => position,
            None => return false,
        };

        if self.entities[position].mark_pending() {
            log::trace!("Destroying entity {}", id);
            self.emit(&OnEntityDestroyed { entity: id });
        }

        if immediate {
            // subscribers may have moved or deallocated the entity
            if let Some(&position) = self.positions.get(&id) {
                self.deallocate(position);
            }
        }

        true
    }

    fn deallocate(&mut self, position: usize) {
        let mut entity = self.entities.remove(position);
        self.positions.remove(&entity.id());
        entity.components_mut().remove_all(&mut self.arena);
        self.arena.release(Product::Entity, entity);

        self.reindex(position);
        self.generation += 1;
    }

    fn reindex(&mut self, from: usize) {
        for (position, entity) in self.entities.iter().enumerate().skip(from) {
            self.positions.insert(entity.id(), position);
        }
    }

    /// Deallocates all entities pending destruction.
    ///
    /// Returns whether any entity was deallocated.
    pub fn cleanup(&mut self) -> bool { self.collect_pending() > 0 }

    fn collect_pending(&mut self) -> usize {
        let first = match self.entities.iter().position(|entity| entity.is_pending_destroy()) {
            Some(first) => first,
            None => return 0,
        };

        let (pending, alive): (Vec<_>, Vec<_>) = mem::take(&mut self.entities)
            .into_iter()
            .partition(|entity| entity.is_pending_destroy());
        self.entities = alive;

        let removed = pending.len();
        for mut entity in pending {
            self.positions.remove(&entity.id());
            entity.components_mut().remove_all(&mut self.arena);
            self.arena.release(Product::Entity, entity);
        }

        self.reindex(first);
        self.generation += 1;
        log::debug!("Cleaned up {} entities", removed);
        removed
    }

    /// Destroys and deallocates every entity, then restarts entity IDs from 1.
    ///
    /// [`OnEntityDestroyed`] is emitted for every entity that was not already pending.
    /// Systems and subscriptions are kept.
    pub fn reset(&mut self) {
        log::debug!("Resetting world with {} entities", self.count());
        self.destroy_all();
        self.last_entity_id = EntityId::INVALID;
    }

    fn destroy_all(&mut self) {
        let mut position = 0;
        while let Some(entity) = self.entities.get_mut(position) {
            position += 1;

            if entity.mark_pending() {
                let id = entity.id();
                let generation = self.generation;
                self.emit(&OnEntityDestroyed { entity: id });
                if self.generation != generation {
                    position = 0;
                }
            }
        }

        self.positions.clear();
        for mut entity in mem::take(&mut self.entities) {
            entity.components_mut().remove_all(&mut self.arena);
            self.arena.release(Product::Entity, entity);
        }
        self.generation += 1;
    }

    /// Iterates over all entities.
    pub fn all(&self, include_pending: bool) -> View<'_, C> { self.each::<()>(include_pending) }

    /// Iterates over the entities that have every component in `S`.
    pub fn each<S: Signature<C>>(&self, include_pending: bool) -> View<'_, C, S> {
        View::new(self, include_pending)
    }

    /// Creates a cursor over the entities that have every component in `S`.
    pub fn cursor<S: Signature<C>>(&self, include_pending: bool) -> Cursor<S> {
        Cursor::new(self, include_pending)
    }

    /// Calls `f` for each entity that has every component in `S`.
    ///
    /// `f` may create entities, which are not visited,
    /// and destroy entities lazily, which are skipped unless `include_pending` is true.
    ///
    /// # Panics
    /// Panics if `f` deallocates entities.
    pub fn for_each<S: Signature<C>>(
        &mut self,
        include_pending: bool,
        mut f: impl FnMut(EntityMut<'_, C>),
    ) {
        let mut cursor = self.cursor::<S>(include_pending);
        while let Some(id) = cursor.next(self) {
            f(EntityMut::new(self, id));
        }
    }

    /// Calls `f` for each entity.
    ///
    /// See [`for_each`](Self::for_each) for the rules on mutating the world from `f`.
    pub fn for_all(&mut self, include_pending: bool, f: impl FnMut(EntityMut<'_, C>)) {
        self.for_each::<()>(include_pending, f)
    }

    /// Registers a system and calls its [`configure`](System::configure) hook.
    pub fn register_system<S: System<C> + 'static>(&mut self, system: S) -> SystemId {
        let id = SystemId(self.next_system_id);
        self.next_system_id += 1;

        let mut system: Box<dyn System<C>> = self.arena.allocate(Product::System, system);
        log::debug!("Registering {} as {}", system.debug_name(), id);
        self.systems.push(SystemSlot { id, system: None });

        system.configure(self);
        self.restore_system(id, system);
        id
    }

    /// Unregisters a system, calls its [`unconfigure`](System::unconfigure) hook
    /// and hands it back to the caller.
    ///
    /// Returns `None` if the system is not registered.
    /// If the system is currently running, it is unconfigured and released
    /// as soon as it returns, and `None` is returned.
    pub fn unregister_system(&mut self, id: SystemId) -> Option<Box<dyn System<C>>> {
        let position = self.systems.iter().position(|slot| slot.id == id)?;
        let slot = self.systems.remove(position);

        match slot.system {
            Some(mut system) => {
                log::debug!("Unregistering {} ({})", system.debug_name(), id);
                system.unconfigure(self);
                Some(self.arena.disown(Product::System, system))
            }
            None => {
                log::debug!("Unregistering {} while it is running", id);
                None
            }
        }
    }

    /// Puts a system back into its slot after it has run,
    /// or releases it if it was unregistered meanwhile.
    fn restore_system(&mut self, id: SystemId, mut system: Box<dyn System<C>>) {
        match self.systems.iter_mut().find(|slot| slot.id == id) {
            Some(slot) => slot.system = Some(system),
            None => {
                log::debug!("Releasing {} ({}) after its unregistration", system.debug_name(), id);
                system.unconfigure(self);
                self.arena.release(Product::System, system);
            }
        }
    }

    /// Number of registered systems.
    pub fn system_count(&self) -> usize { self.systems.len() }

    /// Runs one tick.
    ///
    /// Pending entities are cleaned up first if [`Config::AUTO_CLEANUP`] is set,
    /// then every system ticks in registration order.
    /// Systems registered during the tick also run in the same tick.
    pub fn tick(&mut self, data: C::Tick) { self.tick_traced(data, &tracer::Noop) }

    /// Runs one tick, reporting its steps to `tracer`.
    pub fn tick_traced(&mut self, data: C::Tick, tracer: &impl Tracer) {
        tracer.start_tick(self.count());

        if C::AUTO_CLEANUP {
            let removed = self.collect_pending();
            tracer.cleanup(removed);
        }

        let mut position = 0;
        while let Some(slot) = self.systems.get_mut(position) {
            let id = slot.id;
            if let Some(mut system) = slot.system.take() {
                tracer.start_system(id, system.debug_name());
                system.tick(self, &data);
                tracer.end_system(id, system.debug_name());
                self.restore_system(id, system);
            }

            // systems before this one may have been unregistered during its tick
            position = self.systems.partition_point(|slot| slot.id <= id);
        }

        tracer.end_tick(self.count());
    }

    /// Subscribes to events of type `E`.
    ///
    /// The world only keeps a weak reference to the subscriber.
    /// Subscribing the same subscriber twice delivers each event to it twice.
    pub fn subscribe<E: Event<C>, S: Subscriber<E, C> + 'static>(
        &mut self,
        subscriber: &Rc<RefCell<S>>,
    ) {
        log::trace!("Subscribing {} to {:?}", any::type_name::<S>(), E::event_identity());
        self.bus.subscribe::<E, S>(&mut self.arena, E::event_identity(), subscriber)
    }

    /// Unsubscribes from events of type `E`.
    ///
    /// Returns the number of subscriptions removed.
    pub fn unsubscribe<E: Event<C>, S: ?Sized>(&mut self, subscriber: &Rc<RefCell<S>>) -> usize {
        self.bus.unsubscribe(&mut self.arena, E::event_identity(), subscriber)
    }

    /// Unsubscribes from all event types.
    ///
    /// Returns the number of subscriptions removed.
    pub fn unsubscribe_all<S: ?Sized>(&mut self, subscriber: &Rc<RefCell<S>>) -> usize {
        self.bus.unsubscribe_all(&mut self.arena, subscriber)
    }

    /// Number of live subscribers of `E`.
    pub fn subscriber_count<E: Event<C>>(&self) -> usize { self.bus.count(E::event_identity()) }

    /// Delivers an event to every subscriber of `E` in subscription order.
    ///
    /// Subscribers may reenter the world.
    /// The recipients are fixed before delivery starts,
    /// so subscriptions made during delivery only receive later events.
    pub fn emit<E: Event<C>>(&mut self, event: &E) { self.emit_keyed(E::event_identity(), event) }

    pub(crate) fn emit_keyed<E: 'static>(&mut self, identity: TypeIdentity, event: &E) {
        let snapshot = match self.bus.snapshot::<E>(identity) {
            Some(snapshot) => snapshot,
            None => return,
        };
        log::trace!("Emitting {:?} to {} subscribers", identity, snapshot.len());

        let mut dropped = false;
        for weak in snapshot {
            let subscriber = match weak.upgrade() {
                Some(subscriber) => subscriber,
                None => {
                    dropped = true;
                    continue;
                }
            };

            match subscriber.try_borrow_mut() {
                Ok(mut subscriber) => subscriber.receive(self, event),
                Err(_) => log::warn!(
                    "Skipped delivering {:?} to a subscriber that is still handling an event",
                    identity
                ),
            };
        }

        if dropped {
            self.bus.prune(&mut self.arena, identity);
        }
    }
}

impl<C: Config> Drop for World<C> {
    fn drop(&mut self) {
        log::debug!(
            "Tearing down world with {} entities and {} systems",
            self.count(),
            self.system_count()
        );

        // unconfigure hooks may create entities and subscribers may register systems
        while !self.entities.is_empty() || !self.systems.is_empty() {
            self.destroy_all();

            while !self.systems.is_empty() {
                let slot = self.systems.remove(0);
                if let Some(mut system) = slot.system {
                    system.unconfigure(self);
                    self.arena.release(Product::System, system);
                }
            }
        }

        self.bus.clear(&mut self.arena);
    }
}

impl<C: Config> fmt::Debug for World<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let systems = self.systems.iter().map(|slot| match &slot.system {
            Some(system) => format!("{}: {}", slot.id, system.debug_name()),
            None => format!("{}: <running>", slot.id),
        });

        f.debug_struct("World")
            .field("entities", &self.entities)
            .field("systems", &format_args!("[{}]", systems.format(", ")))
            .field("bus", &self.bus)
            .finish()
    }
}
