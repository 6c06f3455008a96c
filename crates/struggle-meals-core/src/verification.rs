//! Verification arithmetic.
//!
//! The caller supplies the target state and optionally an explicit count.
//! When the count is omitted it is derived from the current one: verifying
//! adds one, unverifying removes one and never goes below zero.

use crate::meal::VerificationUpdate;

/// Compute the verification pair a toggle should write.
pub fn next_verification(
    current_count: u32,
    target_verified: bool,
    explicit_count: Option<u32>,
) -> VerificationUpdate {
    let verifications = explicit_count.unwrap_or(if target_verified {
        current_count.saturating_add(1)
    } else {
        current_count.saturating_sub(1)
    });

    VerificationUpdate {
        is_verified: target_verified,
        verifications,
    }
}
