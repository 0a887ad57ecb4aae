use std::any::TypeId;
use std::collections::HashMap;

use lazy_static::lazy_static;
use parking_lot::RwLock;

use super::{Registered, TypeIdentity};

lazy_static! {
    static ref GLOBAL: Registry = Registry::default();
}

/// Assigns sequential indices to [`Registered`] types.
///
/// Indices start from 1, are memoized on first request and are never recycled.
/// Identities produced by different registries must not be compared with each other;
/// the [`Registration`](super::Registration) strategy always uses [`Registry::global`].
#[derive(Default)]
pub struct Registry {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    indices: HashMap<TypeId, u32>,
    /// `names[i]` is the name of the type with index `i + 1`.
    names:   Vec<&'static str>,
}

impl Registry {
    /// The process-wide registry used by [`Registration`](super::Registration).
    pub fn global() -> &'static Registry { &GLOBAL }

    /// Returns the index of `T`, registering it if this is the first request.
    pub fn index_of<T: ?Sized + Registered>(&self) -> u32 {
        let type_id = TypeId::of::<T>();

        if let Some(&index) = self.inner.read().indices.get(&type_id) {
            return index;
        }

        let mut inner = self.inner.write();
        // another thread may have registered the type between the two locks
        if let Some(&index) = inner.indices.get(&type_id) {
            return index;
        }

        inner.names.push(T::registered_name());
        let index = u32::try_from(inner.names.len()).expect("too many registered types");
        inner.indices.insert(type_id, index);
        log::trace!("Registered type {} as #{index}", T::registered_name());
        index
    }

    /// Returns the identity of `T` under this registry.
    pub fn identity_of<T: ?Sized + Registered>(&self) -> TypeIdentity {
        TypeIdentity::registered(self.index_of::<T>(), T::registered_name())
    }

    /// Returns the name of the type registered with `index`.
    pub fn name_of(&self, index: u32) -> Option<&'static str> {
        let offset = usize::try_from(index.checked_sub(1)?).ok()?;
        self.inner.read().names.get(offset).copied()
    }

    /// Returns the number of types registered so far.
    pub fn len(&self) -> usize { self.inner.read().names.len() }

    /// Returns true if no types have been registered.
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}
