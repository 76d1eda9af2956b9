//! Implementation of the 3 phases of a synthesis run.
//!
//! ## Overview
//!
//! A run follows 3 phases:
//! 1. Base Project - Lay down the default files and merge dependency lists
//! 2. Operations - Apply the declared file operations in order
//! 3. Writing - Render every file and commit it to a destination
//!
//! Phases 1 and 2 only touch the in-memory store. Nothing reaches the
//! destination unless both succeed, so a validation error leaves the output
//! directory as it was.

pub mod operations;
pub mod orchestrator;
pub mod write;
