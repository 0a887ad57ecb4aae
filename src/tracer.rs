//! Exposes testing, profiling and tracing capabilities.
//!
//! Pass a [`Tracer`] to [`World::tick_traced`](crate::World::tick_traced)
//! to observe the steps of a tick.

use crate::system::SystemId;

/// Defines the [`Tracer`] trait and implements the [`Log`] and [`Aggregate`] types.
///
/// All tracer method parameters must be [`Copy`].
macro_rules! define_tracer {
    (
        $(
            $(#[$meta:meta])*
            fn $name:ident(&self $(, $arg_ident:ident: $arg_ty:ty)* $(,)?);
        )*
    ) => {
        /// A tracer used for recording the steps of a tick.
        ///
        /// Can be used for profiling and testing.
        pub trait Tracer {
            $(
                $(#[$meta])*
                #[allow(unused_variables)]
                fn $name(&self, $($arg_ident: $arg_ty,)*) {}
            )*
        }

        impl Tracer for Log {
            $(
                fn $name(&self, $($arg_ident: $arg_ty,)*) {
                    log::log!(self.0, concat!(stringify!($name), "(", $(
                        stringify!($arg_ident),
                        " = {",
                        stringify!($arg_ident),
                        ":?}, ",
                    )* ")"), $($arg_ident = $arg_ident,)*);
                }
            )*
        }

        impl_tuple_accumulate! {
            @TYPES (T1, T2, T3, T4, T5, T6, T7, T8);
            $(
                @VARS (t1, t2, t3, t4, t5, t6, t7, t8);
                @METHOD {fn $name(&self, $($arg_ident: $arg_ty,)*);}
            )*
        }
    };
}

macro_rules! impl_tuple {
    (
        @TYPES ($($ty:ident),* $(,)?);
        $(
            @VARS ($($vars:ident),* $(,)?);
            @METHOD {fn $name:ident(&self, $($arg_ident:ident: $arg_ty:ty,)*);}
        )*
    ) => {
        impl<$($ty: Tracer),*> Tracer for Aggregate<($($ty,)*)> {
            $(
                fn $name(&self, $($arg_ident: $arg_ty),*) {
                    #[allow(unused_mut, unused_variables)]
                    let mut args = ($($arg_ident,)*);

                    #[allow(dead_code)]
                    fn call_with_args(tracer: &impl Tracer, ($($arg_ident,)*): &mut ($($arg_ty,)*)) {
                        tracer.$name($(*$arg_ident,)*);
                    }

                    let Aggregate(($($vars,)*)) = self;
                    $(
                        call_with_args($vars, &mut args);
                    )*
                }
            )*
        }
    };
}

macro_rules! impl_tuple_accumulate {
    (@TYPES (); $(@VARS (); @METHOD {$($body:tt)*})*) => {
        impl_tuple! {
            @TYPES ();
            $(
                @VARS ();
                @METHOD {$($body)*}
            )*
        }
    };
    (
        @TYPES ($first_ty:ident $(, $rest_ty:ident)* $(,)?);
        $(
            @VARS ($first_var:ident $(, $rest_var:ident)* $(,)?);
            @METHOD {$($body:tt)*}
        )*
    ) => {
        impl_tuple! {
            @TYPES ($first_ty $(, $rest_ty)* );
            $(
                @VARS ($first_var $(, $rest_var)*);
                @METHOD {$($body)*}
            )*
        }

        impl_tuple_accumulate! {
            @TYPES ($($rest_ty),*);
            $(
                @VARS ($($rest_var),*);
                @METHOD {$($body)*}
            )*
        }
    };
}

define_tracer! {
    /// A tick starts.
    fn start_tick(&self, entities: usize);

    /// Pending entities were deallocated at the start of a tick.
    ///
    /// Not called if the configuration disables automatic cleanup.
    fn cleanup(&self, removed: usize);

    /// A system starts ticking.
    fn start_system(&self, system: SystemId, debug_name: &str);

    /// A system stops ticking.
    fn end_system(&self, system: SystemId, debug_name: &str);

    /// A tick ends.
    fn end_tick(&self, entities: usize);
}

/// An empty tracer.
pub struct Noop;

impl Tracer for Noop {}

/// Groups multiple tracers into a tuple and dispatches each call to them in serial.
pub struct Aggregate<T>(
    /// A tuple of child tracers to execute in serial.
    pub T,
);

/// A tracer that logs all events.
pub struct Log(
    /// The log level to log events with.
    pub log::Level,
);
