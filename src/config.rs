// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration constants.

/// Separator used when validation errors are joined into one detail message.
pub const VALIDATION_SEPARATOR: &str = ", ";

/// Detail attached to the precomputed out-of-time-bounds entry.
pub const OUT_OF_TIME_BOUNDS_DETAILS: &str =
    "Package upload pre-execution result expired before commit";

/// Version tag folded into every outcome hash.
pub const OUTCOME_HASH_VERSION: u32 = 1;
