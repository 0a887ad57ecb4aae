//! A small, single-threaded entity-component-system runtime.
//!
//! # Overview
//! A [`World`] owns a list of [`Entity`] objects,
//! each holding at most one component of every type.
//! [`System`]s run once per [`World::tick`] in registration order
//! and typically iterate over entities with a given set of components.
//! The world also carries a typed event bus:
//! it emits lifecycle [`events`] on its own,
//! and user code can [`emit`](World::emit) any other event type.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use entwine::events::OnComponentAssigned;
//! use entwine::{Subscriber, World};
//!
//! #[derive(Debug, Clone, Copy, PartialEq)]
//! struct Position {
//!     x: f32,
//!     y: f32,
//! }
//!
//! #[derive(Default)]
//! struct Spawns(Vec<(f32, f32)>);
//!
//! impl Subscriber<OnComponentAssigned<Position>> for Spawns {
//!     fn receive(&mut self, world: &mut World, event: &OnComponentAssigned<Position>) {
//!         let position = event.component(world);
//!         self.0.push((position.x, position.y));
//!     }
//! }
//!
//! let mut world: World = World::new();
//! let spawns = Rc::new(RefCell::new(Spawns::default()));
//! world.subscribe::<OnComponentAssigned<Position>, _>(&spawns);
//!
//! let id = world.create();
//! world.entity_mut(id).unwrap().assign(Position { x: 1., y: 2. });
//! assert_eq!(spawns.borrow().0, vec![(1., 2.)]);
//!
//! for entity in world.each::<(Position,)>(false) {
//!     assert_eq!(*entity.get::<Position>(), Position { x: 1., y: 2. });
//! }
//!
//! world.destroy(id, false);
//! assert_eq!(world.each::<(Position,)>(false).count(), 0);
//! world.tick(1. / 60.);
//! assert_eq!(world.count(), 0);
//! ```
//!
//! # Configuration
//! Integration-specific choices are made at compile time through a [`Config`] type:
//! the per-tick payload type, the [arena](arena) that allocates every world-owned object,
//! and the [identity strategy](identity) that keys component and event types.
//! [`DefaultConfig`] passes an `f32` delta, allocates from the heap
//! and identifies types by reflection.
//!
//! # Reentrancy
//! Systems and subscribers receive `&mut World` and may freely
//! create and destroy entities, assign components, emit events,
//! (un)subscribe and (un)register systems.
//! The only restriction is that [`Cursor`](world::Cursor)s,
//! which back [`World::for_each`], do not survive the deallocation of entities;
//! destroy entities lazily (`immediate = false`) while iterating.

#![warn(missing_docs)]

mod macros;
#[doc(inline)]
pub use macros::*;

pub mod tracer;

pub mod arena;

pub mod comp;

mod config;
pub use config::{Config, DefaultConfig};

pub mod entity;
pub use entity::{Entity, EntityId, EntityMut};

pub mod event;
pub use event::{events, Event, Subscriber};

pub mod identity;

pub mod system;
pub use system::{System, SystemId};

#[cfg(any(test, feature = "internal-bench"))]
pub mod test_util;

pub mod world;
pub use world::World;

static_assertions::assert_impl_all!(EntityId: Copy, Send, Sync, std::hash::Hash);
