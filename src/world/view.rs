use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::slice;

use super::World;
use crate::comp::Signature;
use crate::entity::{Entity, EntityId};
use crate::Config;

fn admits<C: Config, S: Signature<C>>(entity: &Entity<C>, include_pending: bool) -> bool {
    (include_pending || !entity.is_pending_destroy()) && entity.has_all::<S>()
}

/// Iterates over the entities of a world that have every component in `S`,
/// in creation order.
///
/// The view borrows the world, so the entity list cannot change while it is alive.
/// Use a [`Cursor`] to mutate the world between steps.
pub struct View<'w, C: Config, S = ()> {
    entities:        slice::Iter<'w, Box<Entity<C>>>,
    include_pending: bool,
    _ph:             PhantomData<fn() -> S>,
}

impl<'w, C: Config, S: Signature<C>> View<'w, C, S> {
    pub(super) fn new(world: &'w World<C>, include_pending: bool) -> Self {
        Self { entities: world.entities.iter(), include_pending, _ph: PhantomData }
    }
}

impl<'w, C: Config, S: Signature<C>> Iterator for View<'w, C, S> {
    type Item = &'w Entity<C>;

    fn next(&mut self) -> Option<Self::Item> {
        let include_pending = self.include_pending;
        self.entities
            .by_ref()
            .map(|entity| &**entity)
            .find(|entity| admits::<C, S>(entity, include_pending))
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (0, Some(self.entities.len())) }
}

impl<'w, C: Config, S: Signature<C>> FusedIterator for View<'w, C, S> {}

/// An index-based view that does not borrow the world between steps.
///
/// The range of visited positions is fixed when the cursor is created,
/// so entities created during iteration are never visited.
/// Entities destroyed without deallocation are still skipped by their pending flag.
///
/// # Panics
/// [`next`](Self::next) panics if entities were deallocated
/// (by immediate destruction, [`World::cleanup`] or [`World::reset`])
/// after the cursor was created,
/// because the positions of the remaining entities have shifted.
pub struct Cursor<S = ()> {
    next:            usize,
    end:             usize,
    include_pending: bool,
    generation:      u64,
    _ph:             PhantomData<fn() -> S>,
}

impl<S> Cursor<S> {
    pub(super) fn new<C: Config>(world: &World<C>, include_pending: bool) -> Self {
        Self {
            next: 0,
            end: world.count(),
            include_pending,
            generation: world.generation,
            _ph: PhantomData,
        }
    }

    /// Returns the ID of the next admitted entity.
    pub fn next<C: Config>(&mut self, world: &World<C>) -> Option<EntityId>
    where
        S: Signature<C>,
    {
        assert_eq!(
            self.generation, world.generation,
            "Entities were deallocated while a cursor was iterating over the world"
        );

        while self.next < self.end {
            let entity = world
                .get_by_index(self.next)
                .expect("entity positions do not change without bumping the generation");
            self.next += 1;
            if admits::<C, S>(entity, self.include_pending) {
                return Some(entity.id());
            }
        }

        None
    }

    /// Number of positions not visited yet.
    pub fn remaining(&self) -> usize { self.end - self.next }
}

impl<S> Clone for Cursor<S> {
    fn clone(&self) -> Self {
        Self {
            next:            self.next,
            end:             self.end,
            include_pending: self.include_pending,
            generation:      self.generation,
            _ph:             PhantomData,
        }
    }
}

impl<S> fmt::Debug for Cursor<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("next", &self.next)
            .field("end", &self.end)
            .field("include_pending", &self.include_pending)
            .field("generation", &self.generation)
            .finish()
    }
}
