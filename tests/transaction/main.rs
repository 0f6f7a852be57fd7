//! Integration tests for Layer 2: Transactions
//!
//! Tests for operation logs, rollback, replay, and database observers.

mod records;
mod replay;
