//! Typed publish/subscribe between the world and user code.
//!
//! Any `'static` type accepted by the world's identity strategy can be emitted as an [`Event`].
//! Subscribers are owned by the caller as `Rc<RefCell<S>>`;
//! the world only keeps weak references,
//! so dropping the last strong reference silently unsubscribes.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use entwine::events::OnEntityCreated;
//! use entwine::{Subscriber, World};
//!
//! #[derive(Default)]
//! struct Counter(usize);
//!
//! impl Subscriber<OnEntityCreated> for Counter {
//!     fn receive(&mut self, _: &mut World, _: &OnEntityCreated) { self.0 += 1; }
//! }
//!
//! let mut world: World = World::new();
//! let counter = Rc::new(RefCell::new(Counter::default()));
//! world.subscribe::<OnEntityCreated, _>(&counter);
//!
//! world.create();
//! world.create();
//! assert_eq!(counter.borrow().0, 2);
//! ```

use crate::identity::{Identify, TypeIdentity};
use crate::{Config, DefaultConfig, World};

mod bus;
pub(crate) use bus::Bus;

pub mod events;


/// A type that can be emitted to subscribers of worlds configured by `C`.
///
/// This trait is blanket-implemented for every type that the identity strategy of `C`
/// can identify, so it never needs to be implemented manually.
pub trait Event<C: Config>: 'static {
    /// The key of this event type.
    fn event_identity() -> TypeIdentity;
}

impl<C: Config, E: 'static> Event<C> for E
where
    C::Identity: Identify<E>,
{
    fn event_identity() -> TypeIdentity { <C::Identity as Identify<E>>::identity() }
}

/// Receives events of type `E`.
///
/// A type may implement this trait for any number of event types
/// and subscribe to each of them separately.
pub trait Subscriber<E, C: Config = DefaultConfig> {
    /// Handles an event.
    ///
    /// The world is available for reentrant calls,
    /// including emitting further events and (un)subscribing.
    /// Events emitted while this subscriber is still running are not delivered to it at all,
    /// so a subscriber to [`OnEntityCreated`](events::OnEntityCreated) that creates entities
    /// never receives the events of the entities it creates.
    fn receive(&mut self, world: &mut World<C>, event: &E);
}
