// All checking functionality is in formatcheck-core
// This CLI acts as a thin wrapper around the core library

// Re-export core types for convenience
pub use formatcheck_core::*;
