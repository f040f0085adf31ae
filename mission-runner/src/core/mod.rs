//! Deterministic, pure logic shared by the mission runner.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod prompt;
pub mod sources;
pub mod types;
