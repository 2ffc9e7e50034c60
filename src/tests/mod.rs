// Test modules for vector-filter crate
//
// Test organization follows the template pattern where each source file
// has a corresponding test file that focuses on business logic verification.
// Per-backend conversion tests live next to the converters in
// converters/tests/.

// Test helper utilities
pub mod helpers;

pub mod converter;
