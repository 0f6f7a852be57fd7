//! Integration tests for Layer 3: History
//!
//! Tests for the undo/redo stack, coalescing, capacity, and enabled flags.

mod limits;
mod round_trip;
