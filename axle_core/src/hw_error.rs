//! Maps `Box<dyn Error>` from trait boundaries to typed `AxleError`.
//!
//! The traits in `axle_traits` use `Box<dyn Error + Send + Sync>` for maximum
//! flexibility; this module converts those to our typed error enum, with an
//! optional feature-gated path for `axle_hardware::HwError` downcasting.

use crate::error::AxleError;

/// Map a trait-boundary error to a typed `AxleError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> AxleError {
    // Feature-gated: try to downcast to HwError for precise mapping
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<axle_hardware::error::HwError>() {
            return match hw {
                axle_hardware::error::HwError::Timeout => AxleError::Timeout,
                axle_hardware::error::HwError::NotAttached => AxleError::NoDevice,
                axle_hardware::error::HwError::Protocol(_) => AxleError::Protocol,
                other => AxleError::Hardware(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        AxleError::Timeout
    } else {
        AxleError::Hardware(s)
    }
}
