//! Runtime identification of component and event types.
//!
//! Every component and event type stored in a [`World`](crate::World) is keyed by a
//! [`TypeIdentity`].
//! How the identity is computed is a compile-time choice made through
//! [`Config::Identity`](crate::Config::Identity):
//!
//! - [`Reflection`] uses [`TypeId`] and accepts every `'static` type.
//! - [`Registration`] only accepts types that opt in by implementing [`Registered`]
//!   (usually through [`#[derive(Registered)]`](crate::Registered)),
//!   and hands out small sequential indices from a [`Registry`].

use std::any::{self, TypeId};
use std::{cmp, fmt, hash};

mod registry;
pub use registry::Registry;

/// An opaque key that identifies a concrete type for the duration of the process.
///
/// Two requests for the same type through the same strategy always yield equal identities.
/// The type name is only carried for debugging and does not participate in comparison.
#[derive(Clone, Copy)]
pub struct TypeIdentity {
    repr: Repr,
    name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Repr {
    Reflected(TypeId),
    Registered(u32),
}

impl TypeIdentity {
    /// The identity of `T` computed from [`TypeId`].
    pub fn reflected<T: ?Sized + 'static>() -> Self {
        Self { repr: Repr::Reflected(TypeId::of::<T>()), name: any::type_name::<T>() }
    }

    pub(crate) fn registered(index: u32, name: &'static str) -> Self {
        Self { repr: Repr::Registered(index), name }
    }

    /// The name of the identified type.
    pub fn name(&self) -> &'static str { self.name }

    /// The registry index if this identity was produced by [`Registration`].
    pub fn registered_index(&self) -> Option<u32> {
        match self.repr {
            Repr::Registered(index) => Some(index),
            Repr::Reflected(_) => None,
        }
    }
}

impl fmt::Debug for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.repr {
            Repr::Reflected(_) => write!(f, "{}", self.name),
            Repr::Registered(index) => write!(f, "{}#{}", self.name, index),
        }
    }
}

impl PartialEq for TypeIdentity {
    fn eq(&self, other: &Self) -> bool { self.repr == other.repr }
}

impl Eq for TypeIdentity {}

impl PartialOrd for TypeIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> { Some(self.cmp(other)) }
}

impl Ord for TypeIdentity {
    fn cmp(&self, other: &Self) -> cmp::Ordering { self.repr.cmp(&other.repr) }
}

impl hash::Hash for TypeIdentity {
    fn hash<H: hash::Hasher>(&self, state: &mut H) { self.repr.hash(state) }
}

/// A strategy for computing [`TypeIdentity`] values.
pub trait Strategy: 'static {
    /// A short name for logging.
    const NAME: &'static str;
}

/// Computes the identity of `T` under this strategy.
///
/// A strategy only implements this trait for the types it accepts,
/// so using a type the strategy does not know about is a compile error.
pub trait Identify<T: ?Sized>: Strategy {
    /// Returns the identity of `T`.
    fn identity() -> TypeIdentity;
}

/// Identifies types through [`TypeId`].
pub enum Reflection {}

impl Strategy for Reflection {
    const NAME: &'static str = "reflection";
}

impl<T: ?Sized + 'static> Identify<T> for Reflection {
    fn identity() -> TypeIdentity { TypeIdentity::reflected::<T>() }
}

/// Identifies types through indices assigned by [`Registry::global`].
///
/// Only types implementing [`Registered`] are accepted.
pub enum Registration {}

impl Strategy for Registration {
    const NAME: &'static str = "registration";
}

impl<T: ?Sized + Registered> Identify<T> for Registration {
    fn identity() -> TypeIdentity { Registry::global().identity_of::<T>() }
}

/// Marks a type as usable with the [`Registration`] strategy.
///
/// Prefer [`#[derive(Registered)]`](crate::Registered) over implementing this manually.
pub trait Registered: 'static {
    /// The name recorded for this type in the registry.
    fn registered_name() -> &'static str { any::type_name::<Self>() }
}
