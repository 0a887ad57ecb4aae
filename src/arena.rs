//! Pluggable allocation strategies for world-owned objects.
//!
//! A [`World`](crate::World) holds exactly one arena
//! and routes every entity, component cell, system and subscriber list through it,
//! so an embedder can redirect all of the world's object memory by choosing
//! [`Config::Arena`](crate::Config::Arena).
//! Growable buffers (the entity list, maps) still use the global allocator.

use std::ops;

use strum::EnumCount;

mod heap;
pub use heap::Heap;

mod pool;
pub use pool::Pool;


/// The kinds of objects a world allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumCount, strum::EnumIter, strum::Display)]
pub enum Product {
    /// An entity together with its component map.
    Entity,
    /// A single component value.
    Component,
    /// A registered system.
    System,
    /// The subscriber list of one event type.
    SubscriberList,
}

/// An allocation strategy.
///
/// Objects are moved into memory obtained from the arena by [`allocate`](Self::allocate)
/// and given back by [`release`](Self::release),
/// which drops the value and frees or recycles its memory.
/// The returned boxes are ordinary global-allocator boxes,
/// so an object may leave the world through [`disown`](Self::disown)
/// and be dropped normally by its new owner.
pub trait Arena: Default + 'static {
    /// Moves `value` into arena memory.
    fn allocate<T: 'static>(&mut self, product: Product, value: T) -> Box<T>;

    /// Drops the object and returns its memory to the arena.
    ///
    /// `cell` should have been returned by [`allocate`](Self::allocate) of the same arena.
    /// Boxes from elsewhere are accepted, but the [`Stats`] of this arena no longer balance.
    fn release<T: ?Sized + 'static>(&mut self, product: Product, cell: Box<T>);

    /// Hands the object out of the world without dropping it.
    ///
    /// The same provenance rule as [`release`](Self::release) applies.
    fn disown<T: ?Sized + 'static>(&mut self, product: Product, cell: Box<T>) -> Box<T>;

    /// Returns the allocation counters of this arena.
    fn stats(&self) -> &Stats;
}

/// Allocation counters of an arena, indexed by [`Product`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    counters: [Counter; Product::COUNT],
}

/// Allocation counters of a single [`Product`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counter {
    /// Number of objects allocated.
    pub allocated: usize,
    /// Number of objects released back to the arena.
    pub released:  usize,
    /// Number of objects handed out through [`Arena::disown`].
    pub disowned:  usize,
    /// Number of allocations served from recycled memory.
    pub recycled:  usize,
}

impl Counter {
    /// Number of objects currently owned by the arena.
    ///
    /// Saturates at zero if foreign boxes were released or disowned.
    pub fn live(&self) -> usize {
        self.allocated.saturating_sub(self.released).saturating_sub(self.disowned)
    }
}

impl Stats {
    /// Number of live objects across all products.
    pub fn live(&self) -> usize { self.counters.iter().map(Counter::live).sum() }

    pub(crate) fn get_mut(&mut self, product: Product) -> &mut Counter {
        &mut self.counters[product as usize]
    }
}

impl ops::Index<Product> for Stats {
    type Output = Counter;

    fn index(&self, product: Product) -> &Counter { &self.counters[product as usize] }
}
