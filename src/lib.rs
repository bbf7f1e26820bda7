// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Sparse ECS - block-allocated component stores and deferred, priority-ordered processing units
//!
//! Entities are plain `u32` ids. Component values live in per-component
//! stores laid out in lazily allocated blocks of 256 slots. Processing units
//! declare which entities they care about and keep their own active sets,
//! which the world maintains through three mutation queues drained once per
//! [`World::update`].
//!
//! ```
//! use sparse_ecs::prelude::*;
//!
//! struct Movers {
//!     pos: Component<XyStore>,
//! }
//!
//! impl ProcessingUnit for Movers {
//!     fn is_interested(&self, entity: &Entity, _: &Components) -> bool {
//!         entity.has(&self.pos)
//!     }
//!
//!     fn update(&mut self, _: &Clock, entities: &IntList, cx: &mut Context<'_>) {
//!         let pos = cx.store_mut(&self.pos);
//!         for id in entities.iter() {
//!             pos.add(id, 1.0, 0.0);
//!         }
//!     }
//! }
//!
//! let mut world = World::new();
//! let pos = world.register_component(XyStore::new());
//! let movers = world.register_unit(Movers { pos });
//!
//! let id = world
//!     .create(true)?
//!     .add_with(&pos, |store, id| store.set(id, 3.0, 4.0))?
//!     .id();
//! world.update(&Clock::new());
//!
//! assert_eq!(world.active_entities(movers).unwrap().as_slice(), &[id]);
//! assert_eq!(world.store(&pos).get_x(id), 4.0);
//! # Ok::<(), sparse_ecs::EcsError>(())
//! ```

pub mod bitset;
pub mod clock;
pub mod component;
pub mod config;
pub mod debug;
pub mod entity;
pub mod error;
pub mod event;
pub mod int_list;
pub mod observer;
pub mod prelude;
#[cfg(feature = "profiling")]
pub mod profiling;
pub mod storage;
pub mod unit;
pub mod world;


pub use bitset::BitSet;
pub use clock::*;
pub use component::*;
pub use config::*;
pub use entity::*;
pub use error::*;
pub use event::*;
pub use int_list::IntList;
pub use observer::*;
pub use unit::*;
pub use world::*;
