use std::any::{self, Any};
use std::fmt;
use std::marker::PhantomData;

use indexmap::map::Entry;
use indexmap::IndexMap;
use itertools::Itertools;

use super::{Component, ComponentHandle, ComponentHandleMut, Signature};
use crate::arena::{Arena, Product};
use crate::identity::TypeIdentity;
use crate::Config;

/// The components of a single entity, keyed by type.
///
/// Each component value lives in its own arena cell.
/// Cells are kept in insertion order.
pub struct ComponentStore<C: Config> {
    cells: IndexMap<TypeIdentity, Box<dyn Any>>,
    _ph:   PhantomData<fn() -> C>,
}

impl<C: Config> Default for ComponentStore<C> {
    fn default() -> Self { Self { cells: IndexMap::new(), _ph: PhantomData } }
}

impl<C: Config> ComponentStore<C> {
    /// Number of components in the store.
    pub fn len(&self) -> usize { self.cells.len() }

    /// Whether the store holds no components.
    pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    /// The identities of the stored components, in insertion order.
    pub fn identities(&self) -> impl Iterator<Item = TypeIdentity> + '_ {
        self.cells.keys().copied()
    }

    /// Whether a component of type `T` is present.
    pub fn has<T: Component<C>>(&self) -> bool {
        self.cells.contains_key(&T::component_identity())
    }

    /// Whether every component type in `S` is present.
    ///
    /// The empty signature `()` is satisfied by every store.
    pub fn has_all<S: Signature<C>>(&self) -> bool { S::matches(self) }

    /// Returns a handle to the component of type `T`,
    /// which is invalid if the component is absent.
    pub fn get<T: Component<C>>(&self) -> ComponentHandle<'_, T> {
        let cell = self.cells.get(&T::component_identity());
        ComponentHandle::new(cell.map(|cell| downcast_ref::<T>(&**cell)))
    }

    /// Returns a mutable handle to the component of type `T`,
    /// which is invalid if the component is absent.
    pub fn get_mut<T: Component<C>>(&mut self) -> ComponentHandleMut<'_, T> {
        let cell = self.cells.get_mut(&T::component_identity());
        ComponentHandleMut::new(cell.map(|cell| downcast_mut::<T>(&mut **cell)))
    }

    /// Calls `f` with the components in `S` if they are all present.
    ///
    /// Returns whether `f` was called.
    pub fn with<S: Signature<C>>(&self, f: impl FnOnce(S::Refs<'_>)) -> bool {
        match S::fetch(self) {
            Some(refs) => {
                f(refs);
                true
            }
            None => false,
        }
    }

    /// Calls `f` with mutable references to the components in `S` if they are all present.
    ///
    /// Returns whether `f` was called.
    pub fn with_mut<S: Signature<C>>(&mut self, f: impl FnOnce(S::RefsMut<'_>)) -> bool {
        match S::fetch_mut(self) {
            Some(refs) => {
                f(refs);
                true
            }
            None => false,
        }
    }

    pub(super) fn cells_mut(&mut self) -> impl Iterator<Item = (&TypeIdentity, &mut dyn Any)> {
        self.cells.iter_mut().map(|(identity, cell)| (identity, &mut **cell))
    }

    /// Stores `value`, overwriting any existing component of the same type in place.
    ///
    /// Returns whether an existing component was replaced.
    pub(crate) fn assign<T: Component<C>>(&mut self, arena: &mut C::Arena, value: T) -> bool {
        match self.cells.entry(T::component_identity()) {
            Entry::Occupied(entry) => {
                *downcast_mut::<T>(&mut **entry.into_mut()) = value;
                true
            }
            Entry::Vacant(entry) => {
                let cell: Box<dyn Any> = arena.allocate(Product::Component, value);
                entry.insert(cell);
                false
            }
        }
    }

    /// Removes the component of type `T`.
    ///
    /// Returns whether the component was present.
    pub(crate) fn remove<T: Component<C>>(&mut self, arena: &mut C::Arena) -> bool {
        match self.cells.shift_remove(&T::component_identity()) {
            Some(cell) => {
                arena.release(Product::Component, cell);
                true
            }
            None => false,
        }
    }

    /// Removes every component.
    pub(crate) fn remove_all(&mut self, arena: &mut C::Arena) {
        for (_, cell) in self.cells.drain(..) {
            arena.release(Product::Component, cell);
        }
    }
}

pub(super) fn downcast_ref<T: 'static>(cell: &dyn Any) -> &T {
    match cell.downcast_ref::<T>() {
        Some(value) => value,
        None => panic!("Component cell keyed as {} holds a different type", any::type_name::<T>()),
    }
}

pub(super) fn downcast_mut<T: 'static>(cell: &mut dyn Any) -> &mut T {
    match cell.downcast_mut::<T>() {
        Some(value) => value,
        None => panic!("Component cell keyed as {} holds a different type", any::type_name::<T>()),
    }
}

impl<C: Config> fmt::Debug for ComponentStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{:?}}}", self.cells.keys().format(", "))
    }
}
