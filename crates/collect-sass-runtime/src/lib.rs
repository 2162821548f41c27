/*
 * collect-sass-runtime
 * Copyright (c) 2025 Posit, PBC
 *
 * Runtime capability layer for the collect-sass plugin.
 *
 * This crate provides a trait-based abstraction over the operations the
 * plugin core needs from its environment:
 *
 * - File existence checks used by import resolution
 * - Node-style package resolution restricted to an extension set
 * - Single-shot SASS compilation (grass on native targets)
 * - The deferred side-artifact write (the one async operation)
 *
 * The core depends only on the BuildRuntime trait, so hosts can substitute
 * their own environment and tests can run against in-memory fakes.
 */

mod native;
mod traits;

// Re-export core types (API surface)
pub use traits::{BuildRuntime, PathKind, RuntimeError, RuntimeResult};

// Re-export runtime implementations
pub use native::NativeRuntime;

/// Create a default runtime for the current platform.
pub fn default_runtime() -> NativeRuntime {
    NativeRuntime::new()
}
