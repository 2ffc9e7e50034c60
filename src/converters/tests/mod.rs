//! Tests for the backend converter implementations
//!
//! One module per dialect. Behaviour every backend must share (match-all,
//! validation before emission, determinism) is covered in
//! `tests/converter_trait_compliance_tests.rs`.
