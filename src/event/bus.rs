use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use itertools::Itertools;

use super::Subscriber;
use crate::arena::{Arena, Product};
use crate::identity::TypeIdentity;
use crate::Config;

/// A weak reference to a subscriber of `E`.
pub(crate) type SubscriberRef<E, C> = Weak<RefCell<dyn Subscriber<E, C>>>;

/// A copy of a subscriber list taken before delivery.
pub(crate) type Snapshot<E, C> = Vec<SubscriberRef<E, C>>;

/// The address of the `RefCell` behind a subscriber reference,
/// used to match subscribers regardless of the event types they are registered for.
fn address_of<T: ?Sized>(ptr: *const T) -> *const () { ptr.cast() }

/// Operations on a subscriber list that do not depend on its event type.
trait AnyList {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn len(&self) -> usize;

    fn live(&self) -> usize;

    /// Removes every entry pointing at `address` and returns the number removed.
    fn remove_address(&mut self, address: *const ()) -> usize;

    /// Removes every entry whose subscriber has been dropped and returns the number removed.
    fn prune(&mut self) -> usize;
}

struct List<E: 'static, C: Config> {
    subscribers: Vec<SubscriberRef<E, C>>,
}

impl<E: 'static, C: Config> AnyList for List<E, C> {
    fn as_any(&self) -> &dyn Any { self }

    fn as_any_mut(&mut self) -> &mut dyn Any { self }

    fn len(&self) -> usize { self.subscribers.len() }

    fn live(&self) -> usize {
        self.subscribers.iter().filter(|weak| weak.strong_count() > 0).count()
    }

    fn remove_address(&mut self, address: *const ()) -> usize {
        let before = self.subscribers.len();
        self.subscribers.retain(|weak| address_of(weak.as_ptr()) != address);
        before - self.subscribers.len()
    }

    fn prune(&mut self) -> usize {
        let before = self.subscribers.len();
        self.subscribers.retain(|weak| weak.strong_count() > 0);
        before - self.subscribers.len()
    }
}

/// Subscriber lists of a world, keyed by event identity.
///
/// Lists are created on first subscription and dropped once they become empty.
pub(crate) struct Bus<C: Config> {
    lists: IndexMap<TypeIdentity, Box<dyn AnyList>>,
    _ph:   PhantomData<fn() -> C>,
}

impl<C: Config> Default for Bus<C> {
    fn default() -> Self { Self { lists: IndexMap::new(), _ph: PhantomData } }
}

impl<C: Config> Bus<C> {
    fn typed_mut<E: 'static>(list: &mut dyn AnyList) -> &mut List<E, C> {
        list.as_any_mut()
            .downcast_mut::<List<E, C>>()
            .expect("subscriber lists are keyed by the identity of their event type")
    }

    fn typed<E: 'static>(list: &dyn AnyList) -> &List<E, C> {
        list.as_any()
            .downcast_ref::<List<E, C>>()
            .expect("subscriber lists are keyed by the identity of their event type")
    }

    /// Appends a subscriber to the list of `identity`.
    pub(crate) fn subscribe<E: 'static, S: Subscriber<E, C> + 'static>(
        &mut self,
        arena: &mut C::Arena,
        identity: TypeIdentity,
        subscriber: &Rc<RefCell<S>>,
    ) {
        let weak: SubscriberRef<E, C> = Rc::<RefCell<S>>::downgrade(subscriber);

        let list = self.lists.entry(identity).or_insert_with(|| {
            log::trace!("Creating subscriber list for {:?}", identity);
            let list: Box<dyn AnyList> =
                arena.allocate(Product::SubscriberList, List::<E, C> { subscribers: Vec::new() });
            list
        });
        Self::typed_mut::<E>(&mut **list).subscribers.push(weak);
    }

    /// Removes every entry of `subscriber` from the list of `identity`.
    ///
    /// Returns the number of entries removed.
    pub(crate) fn unsubscribe<T: ?Sized>(
        &mut self,
        arena: &mut C::Arena,
        identity: TypeIdentity,
        subscriber: &Rc<T>,
    ) -> usize {
        let list = match self.lists.get_mut(&identity) {
            Some(list) => list,
            None => return 0,
        };

        let removed = list.remove_address(address_of(Rc::as_ptr(subscriber)));
        if list.len() == 0 {
            self.drop_list(arena, identity);
        }
        removed
    }

    /// Removes every entry of `subscriber` from all lists.
    ///
    /// Returns the number of entries removed.
    pub(crate) fn unsubscribe_all<T: ?Sized>(
        &mut self,
        arena: &mut C::Arena,
        subscriber: &Rc<T>,
    ) -> usize {
        let address = address_of(Rc::as_ptr(subscriber));

        let mut removed = 0;
        let mut emptied = Vec::new();
        for (&identity, list) in &mut self.lists {
            removed += list.remove_address(address);
            if list.len() == 0 {
                emptied.push(identity);
            }
        }

        for identity in emptied {
            self.drop_list(arena, identity);
        }
        removed
    }

    /// Copies the list of `identity` for delivery.
    pub(crate) fn snapshot<E: 'static>(&self, identity: TypeIdentity) -> Option<Snapshot<E, C>> {
        let list = self.lists.get(&identity)?;
        Some(Self::typed::<E>(&**list).subscribers.clone())
    }

    /// Removes dropped subscribers from the list of `identity`.
    pub(crate) fn prune(&mut self, arena: &mut C::Arena, identity: TypeIdentity) {
        if let Some(list) = self.lists.get_mut(&identity) {
            let pruned = list.prune();
            log::trace!("Pruned {} dropped subscribers of {:?}", pruned, identity);
            if list.len() == 0 {
                self.drop_list(arena, identity);
            }
        }
    }

    /// Number of subscribers of `identity` that are still alive.
    pub(crate) fn count(&self, identity: TypeIdentity) -> usize {
        self.lists.get(&identity).map_or(0, |list| list.live())
    }

    /// Releases every list.
    pub(crate) fn clear(&mut self, arena: &mut C::Arena) {
        for (_, list) in self.lists.drain(..) {
            arena.release(Product::SubscriberList, list);
        }
    }

    fn drop_list(&mut self, arena: &mut C::Arena, identity: TypeIdentity) {
        if let Some(list) = self.lists.shift_remove(&identity) {
            log::trace!("Dropping empty subscriber list for {:?}", identity);
            arena.release(Product::SubscriberList, list);
        }
    }
}

impl<C: Config> fmt::Debug for Bus<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let lists =
            self.lists.iter().map(|(identity, list)| format!("{:?}: {}", identity, list.len()));
        write!(f, "Bus {{{}}}", lists.format(", "))
    }
}
