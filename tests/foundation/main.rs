//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Record, Patch, Schema, and Error.

mod errors;
mod records;
