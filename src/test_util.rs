#![allow(missing_docs)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexSet;
use parking_lot::Once;

use crate::event::Subscriber;
use crate::{arena, identity, Config, World};

pub fn init() {
    static SET_LOGGER_ONCE: Once = Once::new();
    SET_LOGGER_ONCE.call_once(env_logger::init);
}

/// A configuration that only accepts registered types,
/// allocates from a pool and never cleans up automatically.
pub enum StrictConfig {}

impl Config for StrictConfig {
    type Tick = ();
    type Arena = arena::Pool;
    type Identity = identity::Registration;
    const AUTO_CLEANUP: bool = false;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, crate::Registered)]
#[entwine(entwine_as(crate))]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, crate::Registered)]
#[entwine(entwine_as(crate))]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, crate::Registered)]
#[entwine(entwine_as(crate), name = "health")]
pub struct Health(pub i32);

/// A zero-sized marker component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, crate::Registered)]
#[entwine(entwine_as(crate))]
pub struct Frozen;

/// A subscriber that records every event it receives.
pub struct Recorder<E> {
    pub events: Vec<E>,
}

impl<E> Recorder<E> {
    pub fn shared() -> Rc<RefCell<Self>> { Rc::new(RefCell::new(Self { events: Vec::new() })) }
}

impl<E: Clone, C: Config> Subscriber<E, C> for Recorder<E> {
    fn receive(&mut self, _: &mut World<C>, event: &E) { self.events.push(event.clone()); }
}

/// Records events and ensures that they are in the correct order.
pub struct Journal<T: fmt::Debug + Eq + Hash> {
    dependencies: HashMap<T, Vec<T>>,
    seen:         RefCell<IndexSet<T>>,
}

impl<T: fmt::Debug + Eq + Hash> Journal<T> {
    /// Creates a journal that ensures `b` happens after `a` for each `(a, b)` input.
    pub fn new(orders: impl IntoIterator<Item = (T, T)>) -> Rc<Self> {
        let mut dependencies: HashMap<T, Vec<T>> = HashMap::new();
        for (before, after) in orders {
            dependencies.entry(after).or_default().push(before);
        }

        Rc::new(Self { dependencies, seen: RefCell::new(IndexSet::new()) })
    }

    /// Records that `event` has happened.
    ///
    /// # Panics
    /// Panics if the same `event` was recorded twice or a dependency is not satisfied.
    pub fn trace(&self, event: T) {
        let mut seen = self.seen.borrow_mut();

        if let Some(deps) = self.dependencies.get(&event) {
            for dep in deps {
                assert!(seen.contains(dep), "{:?} should happen after {:?}", event, dep);
            }
        }

        let (index, new) = seen.insert_full(event);
        assert!(
            new,
            "{:?} is recorded twice",
            seen.get_index(index).expect("insert_full should return valid index")
        );
    }

    /// Returns the events recorded so far.
    pub fn events(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.seen.borrow().iter().cloned().collect()
    }
}
