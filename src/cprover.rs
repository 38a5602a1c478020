// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Names of the distinguished symbols the instrumentation relies on.
//!
//! These objects are introduced by the front-end (or by the modelling
//! library) and are recognised by name, exactly like the corresponding CBMC
//! intrinsics.

/// Prefix of every reserved instrumentation identifier.
pub const CPROVER_PREFIX: &str = "__CPROVER_";

/// Intrinsic registering an explicitly allocated `(address, size)` region.
pub const ALLOCATED_MEMORY: &str = "__CPROVER_allocated_memory";

/// The heap allocation primitive the modelling library lowers `malloc` to.
pub const ALLOCATE: &str = "__CPROVER_allocate";

/// Sentinel pointing at some local whose lifetime has ended.
pub const DEAD_OBJECT: &str = "__CPROVER_dead_object";

/// Sentinel pointing at some freed heap object.
pub const DEALLOCATED: &str = "__CPROVER_deallocated";

/// Sentinel identifying the most recent heap allocation.
pub const MALLOC_OBJECT: &str = "__CPROVER_malloc_object";

/// Size of the most recent heap allocation.
pub const MALLOC_SIZE: &str = "__CPROVER_malloc_size";

/// Sentinel tracking an allocation that is never freed.
pub const MEMORY_LEAK: &str = "__CPROVER_memory_leak";

/// Name of the synthetic program entry point.
pub const ENTRY_POINT: &str = "__CPROVER__start";
