use std::any::Any;

use super::store::downcast_mut;
use super::{Component, ComponentStore};
use crate::identity::TypeIdentity;
use crate::Config;

/// A set of component types that an entity must all have.
///
/// Implemented for `()` (matches every entity)
/// and for tuples of up to eight distinct [`Component`] types.
pub trait Signature<C: Config> {
    /// Shared references to every component in the signature.
    type Refs<'t>;

    /// Mutable references to every component in the signature.
    type RefsMut<'t>;

    /// Whether `store` contains every component in the signature.
    fn matches(store: &ComponentStore<C>) -> bool;

    /// Borrows every component in the signature,
    /// or returns `None` if any of them is absent.
    fn fetch(store: &ComponentStore<C>) -> Option<Self::Refs<'_>>;

    /// Mutably borrows every component in the signature,
    /// or returns `None` if any of them is absent.
    ///
    /// # Panics
    /// Panics if the signature names the same component type twice.
    fn fetch_mut(store: &mut ComponentStore<C>) -> Option<Self::RefsMut<'_>>;
}

impl<C: Config> Signature<C> for () {
    type Refs<'t> = ();
    type RefsMut<'t> = ();

    fn matches(_: &ComponentStore<C>) -> bool { true }

    fn fetch(_: &ComponentStore<C>) -> Option<()> { Some(()) }

    fn fetch_mut(_: &mut ComponentStore<C>) -> Option<()> { Some(()) }
}

fn assert_distinct(identities: &[TypeIdentity]) {
    for (i, identity) in identities.iter().enumerate() {
        if identities[..i].contains(identity) {
            panic!("Component {:?} appears twice in the same signature", identity);
        }
    }
}

/// Collects the cells for `identities` in a single pass over the store,
/// so that every slot is a disjoint borrow.
fn collect_cells<'t, C: Config, const N: usize>(
    store: &'t mut ComponentStore<C>,
    identities: &[TypeIdentity; N],
) -> [Option<&'t mut dyn Any>; N] {
    assert_distinct(identities);

    let mut slots: [Option<&'t mut dyn Any>; N] = std::array::from_fn(|_| None);
    for (identity, cell) in store.cells_mut() {
        if let Some(position) = identities.iter().position(|wanted| wanted == identity) {
            slots[position] = Some(cell);
        }
    }
    slots
}

macro_rules! impl_signature {
    ($($ty:ident),*) => {
        impl<C: Config, $($ty: Component<C>),*> Signature<C> for ($($ty,)*) {
            type Refs<'t> = ($(&'t $ty,)*);
            type RefsMut<'t> = ($(&'t mut $ty,)*);

            fn matches(store: &ComponentStore<C>) -> bool { $(store.has::<$ty>())&&* }

            fn fetch(store: &ComponentStore<C>) -> Option<Self::Refs<'_>> {
                Some(($(store.get::<$ty>().into_option()?,)*))
            }

            fn fetch_mut(store: &mut ComponentStore<C>) -> Option<Self::RefsMut<'_>> {
                let identities = [$(<$ty as Component<C>>::component_identity()),*];
                let mut slots = collect_cells(store, &identities).into_iter();
                Some(($(downcast_mut::<$ty>(slots.next().flatten()?),)*))
            }
        }
    }
}

macro_rules! impl_signature_accumulate {
    () => {};
    ($first:ident $(, $rest:ident)*) => {
        impl_signature_accumulate!($($rest),*);
        impl_signature!($first $(, $rest)*);
    }
}

impl_signature_accumulate!(T1, T2, T3, T4, T5, T6, T7, T8);
