//! Concrete [`Evaluation`](gaitevo_evolution::Evaluation) implementations.
//!
//! The optimizer was built for trials on a physical or simulated robot,
//! which is exactly what makes it painful to exercise: a single trial can
//! take minutes. This crate supplies synthetic stand-ins with the same
//! interface and the same statistical character (a deterministic objective
//! surface corrupted by Gaussian measurement noise), so the whole harness
//! (seeding, steady state, checkpointing, resume, playback) can be run and
//! tested end to end in milliseconds.

pub mod benchmark;

pub use benchmark::{BenchmarkEvaluation, Objective};
