//! Systems are actions performed every tick to manipulate entities and components.
//!
//! Systems are owned by the world and run sequentially in registration order.
//! A system typically iterates over a filtered view of the world in [`System::tick`]:
//!
//! ```
//! use entwine::{System, World};
//!
//! #[derive(Debug, PartialEq)]
//! struct Position(f32);
//! struct Speed(f32);
//!
//! struct Movement;
//!
//! impl System for Movement {
//!     fn tick(&mut self, world: &mut World, delta: &f32) {
//!         world.for_each::<(Position, Speed)>(false, |mut entity| {
//!             entity.with_mut::<(Position, Speed)>(|(position, speed)| {
//!                 position.0 += speed.0 * delta;
//!             });
//!         });
//!     }
//! }
//!
//! let mut world: World = World::new();
//! let id = world.create();
//! let mut entity = world.entity_mut(id).unwrap();
//! entity.assign(Position(0.));
//! entity.assign(Speed(2.));
//!
//! world.register_system(Movement);
//! world.tick(0.5);
//! assert_eq!(*world.get_by_id(id).unwrap().get::<Position>(), Position(1.));
//! ```

use std::{any, fmt};

use crate::{Config, DefaultConfig, World};

/// A unit of per-tick behavior.
///
/// All methods have empty default implementations.
pub trait System<C: Config = DefaultConfig> {
    /// Called once when the system is registered to a world.
    ///
    /// This is the place to subscribe the system's subscribers to events.
    fn configure(&mut self, world: &mut World<C>) { let _ = world; }

    /// Called once when the system is unregistered or the world is torn down.
    fn unconfigure(&mut self, world: &mut World<C>) { let _ = world; }

    /// Called once per [`World::tick`].
    fn tick(&mut self, world: &mut World<C>, data: &C::Tick) { let _ = (world, data); }

    /// A name for logging and tracing.
    fn debug_name(&self) -> &str { any::type_name::<Self>() }
}

/// Identifies a registered system within its world.
///
/// IDs are never reused within the same world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemId(pub(crate) u64);

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "system#{}", self.0) }
}

impl<C: Config> fmt::Debug for dyn System<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "System({})", self.debug_name())
    }
}
