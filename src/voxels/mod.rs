//! # Voxel World Core
//!
//! This module contains the voxel data model and everything that stores it.
//!
//! ## Architecture
//!
//! * **Block**: block types, the static property registry, tools and drops
//! * **Chunk**: 16x16 columns of sparse block storage, and the builder the
//!   generator writes through
//! * **Chunk store**: residency, the pending set and LRU eviction
//! * **World**: the facade combining the store, the generator and the task manager
//! * **Tasks**: chunk generation jobs for the task manager
//!
//! ## Data Flow
//!
//! 1. The world moves its reference point; the store requests missing chunks
//! 2. The world turns requests into generation tasks
//! 3. Finished tasks hand their blocks back to the store on the owner thread
//! 4. The renderer reads visible and dirty chunks

pub mod block;
pub mod chunk;
pub mod chunk_store;
pub mod tasks;
pub mod world;
