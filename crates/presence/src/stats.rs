use serde::{Deserialize, Serialize};

/// Residency threshold used when none is configured.
pub const DEFAULT_TARGET_DAYS: u32 = 730;

/// Progress toward the residency threshold, in the shape result consumers
/// serialize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidencyStats {
    #[serde(rename = "totalDaysInCanada")]
    pub total_days: u32,
    pub remaining_days: u32,
    pub target_days: u32,
    pub percentage_complete: f64,
}

impl ResidencyStats {
    /// Derive remaining days and percentage from a day count.
    ///
    /// A zero target is treated as already met.
    pub fn from_total(total_days: u32, target_days: u32) -> Self {
        let percentage_complete = if target_days == 0 {
            100.0
        } else {
            (f64::from(total_days) / f64::from(target_days) * 100.0).clamp(0.0, 100.0)
        };

        Self {
            total_days,
            remaining_days: target_days.saturating_sub(total_days),
            target_days,
            percentage_complete,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_days == 0
    }
}
