//! Components are plain values attached to entities under a unique type key.
//!
//! Any `'static` type accepted by the world's [identity strategy](crate::Config::Identity)
//! is a [`Component`].
//! An entity holds at most one component of each type in its [`ComponentStore`].

use std::{any, fmt, ops};

use crate::event::events::OnComponentAssigned;
use crate::identity::{Identify, TypeIdentity};
use crate::Config;

mod store;
pub use store::ComponentStore;

mod signature;
pub use signature::Signature;


/// A type that can be stored as a component in worlds configured by `C`.
///
/// This trait is blanket-implemented for every type that the identity strategy of `C`
/// can identify, so it never needs to be implemented manually.
pub trait Component<C: Config>: 'static {
    /// The key of this component type.
    fn component_identity() -> TypeIdentity;

    /// The key of [`OnComponentAssigned<Self>`].
    fn assigned_identity() -> TypeIdentity;
}

impl<C: Config, T: 'static> Component<C> for T
where
    C::Identity: Identify<T> + Identify<OnComponentAssigned<T>>,
{
    fn component_identity() -> TypeIdentity { <C::Identity as Identify<T>>::identity() }

    fn assigned_identity() -> TypeIdentity {
        <C::Identity as Identify<OnComponentAssigned<T>>>::identity()
    }
}

/// A non-owning reference to a component that may be absent.
///
/// Dereferencing an invalid handle is a caller bug and panics.
/// Check [`is_valid`](Self::is_valid) or use [`into_option`](Self::into_option) first.
pub struct ComponentHandle<'t, T> {
    inner: Option<&'t T>,
}

impl<'t, T> ComponentHandle<'t, T> {
    pub(crate) fn new(inner: Option<&'t T>) -> Self { Self { inner } }

    /// A handle that does not point to any component.
    pub fn invalid() -> Self { Self { inner: None } }

    /// Whether the handle points to a component.
    pub fn is_valid(&self) -> bool { self.inner.is_some() }

    /// Converts the handle into an `Option`.
    pub fn into_option(self) -> Option<&'t T> { self.inner }
}

impl<'t, T> Clone for ComponentHandle<'t, T> {
    fn clone(&self) -> Self { *self }
}

impl<'t, T> Copy for ComponentHandle<'t, T> {}

impl<'t, T> Default for ComponentHandle<'t, T> {
    fn default() -> Self { Self::invalid() }
}

impl<'t, T> ops::Deref for ComponentHandle<'t, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.inner {
            Some(value) => value,
            None => panic!("Dereferenced an invalid handle to {}", any::type_name::<T>()),
        }
    }
}

impl<'t, T: fmt::Debug> fmt::Debug for ComponentHandle<'t, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.inner {
            Some(value) => f.debug_tuple("ComponentHandle").field(value).finish(),
            None => write!(f, "ComponentHandle(<invalid>)"),
        }
    }
}

/// A mutable variant of [`ComponentHandle`].
pub struct ComponentHandleMut<'t, T> {
    inner: Option<&'t mut T>,
}

impl<'t, T> ComponentHandleMut<'t, T> {
    pub(crate) fn new(inner: Option<&'t mut T>) -> Self { Self { inner } }

    /// A handle that does not point to any component.
    pub fn invalid() -> Self { Self { inner: None } }

    /// Whether the handle points to a component.
    pub fn is_valid(&self) -> bool { self.inner.is_some() }

    /// Converts the handle into an `Option`.
    pub fn into_option(self) -> Option<&'t mut T> { self.inner }
}

impl<'t, T> Default for ComponentHandleMut<'t, T> {
    fn default() -> Self { Self::invalid() }
}

impl<'t, T> ops::Deref for ComponentHandleMut<'t, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.inner {
            Some(value) => value,
            None => panic!("Dereferenced an invalid handle to {}", any::type_name::<T>()),
        }
    }
}

impl<'t, T> ops::DerefMut for ComponentHandleMut<'t, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.inner {
            Some(value) => value,
            None => panic!("Dereferenced an invalid handle to {}", any::type_name::<T>()),
        }
    }
}

impl<'t, T: fmt::Debug> fmt::Debug for ComponentHandleMut<'t, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.inner {
            Some(value) => f.debug_tuple("ComponentHandleMut").field(value).finish(),
            None => write!(f, "ComponentHandleMut(<invalid>)"),
        }
    }
}
