//! # Voxel Task System
//!
//! Tasks that run voxel work on the task manager's workers.

pub mod chunk_generation_task;
