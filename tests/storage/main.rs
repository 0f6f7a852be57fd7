//! Integration tests for Layer 1: Storage
//!
//! Tests for archetype tables, entity locations, queries, and snapshots.

mod entities;
mod queries;
mod snapshots;
