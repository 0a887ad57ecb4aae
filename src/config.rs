//! Compile-time configuration of a world.

use crate::event::events;
use crate::{arena, identity};

/// Chooses the integration-specific types of a [`World`](crate::World).
///
/// These are compile-time choices made once per integration.
/// Implement this trait on an uninhabited type:
///
/// ```
/// enum Headless {}
///
/// impl entwine::Config for Headless {
///     type Tick = ();
///     type Arena = entwine::arena::Pool;
///     type Identity = entwine::identity::Reflection;
///     const AUTO_CLEANUP: bool = false;
/// }
///
/// let mut world = entwine::World::<Headless>::new();
/// world.tick(());
/// ```
pub trait Config: 'static {
    /// The data passed to every [`System::tick`](crate::System::tick).
    ///
    /// Use `()` if systems do not need per-frame data.
    type Tick;

    /// The allocation strategy for all world-owned objects.
    type Arena: arena::Arena;

    /// The strategy used to identify component and event types.
    ///
    /// The strategy must at least accept the lifecycle events emitted by the world itself.
    type Identity: identity::Strategy
        + identity::Identify<events::OnEntityCreated>
        + identity::Identify<events::OnEntityDestroyed>;

    /// Whether [`World::tick`](crate::World::tick) starts by calling
    /// [`World::cleanup`](crate::World::cleanup).
    ///
    /// If this is false, pending entities are only deallocated when `cleanup` is called explicitly.
    const AUTO_CLEANUP: bool = true;
}

/// The default configuration.
///
/// Systems receive the frame delta as an `f32`,
/// objects are heap-allocated and types are identified through reflection.
pub enum DefaultConfig {}

impl Config for DefaultConfig {
    type Tick = f32;
    type Arena = arena::Heap;
    type Identity = identity::Reflection;
}
