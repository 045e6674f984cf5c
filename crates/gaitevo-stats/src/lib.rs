//! Dependency-free sample statistics for the optimizer.
//!
//! The optimizer recomputes population statistics after every steady-state
//! trial, feeding samples one at a time. [`incremental::SampleStats`] is
//! built for that access pattern: it accumulates min/max/sum as samples
//! arrive and only derives the mean on demand, so a full statistics pass is
//! a single loop over the population with no intermediate allocation.

pub mod incremental;

pub use incremental::SampleStats;
