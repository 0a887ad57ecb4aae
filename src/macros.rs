/// Derives [`Registered`](crate::identity::Registered) for a type,
/// making it usable with the [`Registration`](crate::identity::Registration) strategy.
///
/// Type parameters are required to be `'static`.
///
/// # Options
/// Options are applied behind the `#[entwine(...)]` attribute:
///
/// - `name = "..."`: the name recorded in the registry. Defaults to the type name.
/// - `entwine_as(path)`: the path to the entwine crate. Defaults to `::entwine`.
///
/// # Example
/// ```
/// use entwine::identity::{Identify, Registration, Registry};
///
/// #[derive(entwine::Registered)]
/// #[entwine(name = "position")]
/// struct Position(f32, f32);
///
/// let identity = <Registration as Identify<Position>>::identity();
/// assert_eq!(identity, <Registration as Identify<Position>>::identity());
///
/// let index = identity.registered_index().unwrap();
/// assert_eq!(Registry::global().name_of(index), Some("position"));
/// ```
#[doc(inline)]
pub use entwine_codegen::Registered;
