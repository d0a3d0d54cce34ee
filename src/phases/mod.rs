//! Implementation of the phases of a merge run.
//!
//! ## Overview
//!
//! A merge run follows 5 phases:
//! 1. Collection - Snapshot BASE and SOURCE concurrently (see [`crate::snapshot`])
//! 2. Classification - Label every path added, removed, modified or unchanged
//! 3. Output Preparation - Validate the layout, reset and seed the output tree
//! 4. Execution - Apply the content strategies across a bounded worker pool
//! 5. Reporting - Render and write the sorted report (see [`crate::report`])
//!
//! Classification must finish before execution starts: the full, sorted record
//! list is what makes runs deterministic. The [`orchestrator`] chains the
//! phases and repeats 1, 2 and 4 for every additional SOURCE.

pub mod classify;
pub mod execute;
pub mod orchestrator;
pub mod seed;

