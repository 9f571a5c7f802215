//! Capacity arithmetic for volume creation.
//!
//! The provider allocates in MiB units while orchestrator requests arrive in
//! bytes. Conversions always round up so the granted capacity is never below
//! the requested one.

/// Allocation unit backing the provider's `sizeInMBs` field.
pub const MIB: u64 = 1024 * 1024;

/// Result of applying the minimum-size floor to a requested capacity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EffectiveCapacity {
    /// Capacity to provision, in bytes.
    pub bytes: u64,
    /// Whether the request was raised to the configured minimum.
    pub rounded: bool,
}

/// Converts a byte capacity into provider allocation units, rounding up.
///
/// A zero request yields zero units; callers reject zero-capacity requests
/// before reaching this point.
///
/// # Panics
///
/// Panics when `unit_size_bytes` is zero.
#[must_use]
pub const fn allocation_units(requested_bytes: u64, unit_size_bytes: u64) -> u64 {
    requested_bytes.div_ceil(unit_size_bytes)
}

/// Applies the minimum-size floor policy to a requested capacity.
///
/// The floor only takes effect when rounding is enabled both globally and for
/// the individual request; otherwise the requested capacity passes through
/// unchanged even when it sits below the minimum. The `rounded` flag tells the
/// caller to surface a warning rather than an error.
#[must_use]
pub const fn apply_minimum_floor(
    requested_bytes: u64,
    minimum_bytes: u64,
    rounding_enabled_globally: bool,
    rounding_enabled_for_request: bool,
) -> EffectiveCapacity {
    if rounding_enabled_globally && rounding_enabled_for_request && requested_bytes < minimum_bytes
    {
        return EffectiveCapacity {
            bytes: minimum_bytes,
            rounded: true,
        };
    }
    EffectiveCapacity {
        bytes: requested_bytes,
        rounded: false,
    }
}
