//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use sparse_ecs::prelude::*;
//! ```

pub use crate::bitset::BitSet;
pub use crate::clock::{Clock, FixedStep};
pub use crate::component::{
    Component, ComponentId, ComponentStore, Components, FloatStore, GenericStore, IntStore,
    MaskStore, ScalarStore, XyStore,
};
pub use crate::config::WorldConfig;
pub use crate::debug::WorldInspector;
pub use crate::entity::{DrainOrder, Entity, EntityId, EntityMut};
pub use crate::error::{EcsError, Result};
pub use crate::event::LifecycleEvent;
pub use crate::int_list::IntList;
pub use crate::observer::Observer;
pub use crate::unit::{Context, ProcessingUnit, UnitId};
pub use crate::world::World;
