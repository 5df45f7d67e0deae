//! Static field-priority resolution
//!
//! When more than one source can populate the same unified field, the
//! candidates are evaluated in a fixed order and the first non-null value
//! wins for that date. Only contested fields live here (single-source
//! fields are taken directly in the unifier), so every resolution order is
//! auditable in one place and testable apart from the join mechanics.

use crate::unifier::DaySources;

/// Resting heart rate: WHOOP, then the Pison wristband
pub(crate) fn resting_heart_rate(day: &DaySources) -> Option<f64> {
    day.whoop
        .and_then(|w| w.resting_hr_bpm)
        .or_else(|| day.pison.and_then(|p| p.heart_rate_bpm))
}

/// Heart rate variability: the dedicated chest strap first, then WHOOP,
/// then the Pison wristband
pub(crate) fn heart_rate_variability(day: &DaySources) -> Option<f64> {
    day.elitehrv
        .and_then(|e| e.hrv)
        .or_else(|| day.whoop.and_then(|w| w.hrv_ms))
        .or_else(|| day.pison.and_then(|p| p.hrv_ms))
}

/// Sleep efficiency: WHOOP, then the Pison wristband
pub(crate) fn sleep_efficiency(day: &DaySources) -> Option<f64> {
    day.whoop
        .and_then(|w| w.sleep_efficiency_pct)
        .or_else(|| day.pison.and_then(|p| p.sleep_efficiency_pct))
}

/// Energy expenditure: WHOOP, then the Pison wristband
pub(crate) fn energy_expenditure(day: &DaySources) -> Option<f64> {
    day.whoop
        .and_then(|w| w.energy_burned_cal)
        .or_else(|| day.pison.and_then(|p| p.calories_burned))
}

/// Skin temperature: WHOOP, then the Pison wristband
pub(crate) fn skin_temperature(day: &DaySources) -> Option<f64> {
    day.whoop
        .and_then(|w| w.skin_temp_celsius)
        .or_else(|| day.pison.and_then(|p| p.skin_temp_celsius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ElitehrvDaily, PisonDaily, WhoopDaily};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    #[test]
    fn test_hrv_prefers_chest_strap_over_all() {
        let elitehrv = ElitehrvDaily {
            hrv: Some(58.0),
            ..ElitehrvDaily::empty(date())
        };
        let whoop = WhoopDaily {
            hrv_ms: Some(65.0),
            ..WhoopDaily::empty(date())
        };
        let pison = PisonDaily {
            hrv_ms: Some(61.0),
            ..PisonDaily::empty(date())
        };
        let day = DaySources {
            whoop: Some(&whoop),
            elitehrv: Some(&elitehrv),
            pison: Some(&pison),
            ..DaySources::default()
        };

        assert_eq!(heart_rate_variability(&day), Some(58.0));
    }

    #[test]
    fn test_hrv_falls_back_through_the_chain() {
        let elitehrv = ElitehrvDaily::empty(date());
        let whoop = WhoopDaily {
            hrv_ms: Some(65.0),
            ..WhoopDaily::empty(date())
        };
        let day = DaySources {
            whoop: Some(&whoop),
            elitehrv: Some(&elitehrv),
            ..DaySources::default()
        };
        // Strap present but null for the date; WHOOP wins
        assert_eq!(heart_rate_variability(&day), Some(65.0));

        let pison = PisonDaily {
            hrv_ms: Some(61.0),
            ..PisonDaily::empty(date())
        };
        let day = DaySources {
            pison: Some(&pison),
            ..DaySources::default()
        };
        assert_eq!(heart_rate_variability(&day), Some(61.0));

        assert_eq!(heart_rate_variability(&DaySources::default()), None);
    }

    #[test]
    fn test_resting_heart_rate_priority() {
        let whoop = WhoopDaily {
            resting_hr_bpm: Some(52.0),
            ..WhoopDaily::empty(date())
        };
        let pison = PisonDaily {
            heart_rate_bpm: Some(64.0),
            ..PisonDaily::empty(date())
        };
        let day = DaySources {
            whoop: Some(&whoop),
            pison: Some(&pison),
            ..DaySources::default()
        };

        assert_eq!(resting_heart_rate(&day), Some(52.0));

        let day = DaySources {
            pison: Some(&pison),
            ..DaySources::default()
        };
        assert_eq!(resting_heart_rate(&day), Some(64.0));
    }

    #[test]
    fn test_energy_expenditure_priority() {
        let whoop = WhoopDaily {
            energy_burned_cal: Some(2200.0),
            ..WhoopDaily::empty(date())
        };
        let pison = PisonDaily {
            calories_burned: Some(1900.0),
            ..PisonDaily::empty(date())
        };
        let day = DaySources {
            whoop: Some(&whoop),
            pison: Some(&pison),
            ..DaySources::default()
        };

        assert_eq!(energy_expenditure(&day), Some(2200.0));
    }
}
