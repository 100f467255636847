//! Hourly volume model.
//!
//! Converts a per-category base event count into an hour-by-hour schedule:
//! `base × hour_weight × weekend × monday × noise`. The noise factor is drawn
//! once per (date, category) and reused for every hour of that day, so a
//! day's shape stays smooth while neighboring days differ slightly.

use crate::config::types::VolumeProfileConfig;
use crate::seed;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::Rng;
use std::collections::HashMap;

/// Normalized per-category activity curve. Hourly weights always sum to 1.0.
#[derive(Debug, Clone)]
pub struct VolumeProfile {
    pub hourly_weights: [f64; 24],
    pub weekend_multiplier: f64,
    pub monday_multiplier: f64,
    pub noise_amplitude: f64,
    pub base_count: f64,
}

impl VolumeProfile {
    /// Flat fallback used for categories with no registered profile: uniform
    /// hours, no weekday shaping, no noise. New sources run without any
    /// profile registration.
    pub fn flat(base_count: f64) -> Self {
        Self {
            hourly_weights: [1.0 / 24.0; 24],
            weekend_multiplier: 1.0,
            monday_multiplier: 1.0,
            noise_amplitude: 0.0,
            base_count,
        }
    }

    fn from_config(cfg: &VolumeProfileConfig) -> Self {
        let sum: f64 = cfg.hourly_weights.iter().sum();
        let hourly_weights = if sum > 0.0 {
            let mut w = cfg.hourly_weights;
            for v in &mut w {
                *v /= sum;
            }
            w
        } else {
            [1.0 / 24.0; 24]
        };
        Self {
            hourly_weights,
            weekend_multiplier: cfg.weekend_multiplier,
            monday_multiplier: cfg.monday_multiplier,
            noise_amplitude: cfg.noise_amplitude.clamp(0.0, 1.0),
            base_count: cfg.base_count,
        }
    }
}

/// Profile table plus the computation in `events_for_hour`. Immutable after
/// construction; safe to share across worker threads.
#[derive(Debug, Clone)]
pub struct VolumeModel {
    profiles: HashMap<String, VolumeProfile>,
    default_profile: VolumeProfile,
}

impl VolumeModel {
    pub fn from_config(profiles: &HashMap<String, VolumeProfileConfig>) -> Self {
        let profiles = profiles
            .iter()
            .map(|(k, v)| (k.clone(), VolumeProfile::from_config(v)))
            .collect();
        Self {
            profiles,
            default_profile: VolumeProfile::flat(1000.0),
        }
    }

    pub fn profile(&self, category: &str) -> &VolumeProfile {
        self.profiles.get(category).unwrap_or(&self.default_profile)
    }

    /// Registered base count for a category, already scaled.
    pub fn base_count(&self, category: &str, scale: f64) -> f64 {
        self.profile(category).base_count * scale
    }

    /// Event count for one hour of one day.
    ///
    /// Never fails: unknown categories use the flat default profile, and a
    /// non-finite or negative `base_count` clamps to zero (which also skips
    /// the RNG draw, so zero-volume categories consume no randomness).
    pub fn events_for_hour(
        &self,
        base_count: f64,
        date: NaiveDate,
        hour: u32,
        category: &str,
    ) -> u64 {
        let base = if base_count.is_finite() {
            base_count.max(0.0)
        } else {
            0.0
        };
        if base == 0.0 {
            return 0;
        }

        let profile = self.profile(category);
        let weight = profile.hourly_weights[(hour % 24) as usize];
        let weekend = match date.weekday() {
            Weekday::Sat | Weekday::Sun => profile.weekend_multiplier,
            _ => 1.0,
        };
        let monday = if date.weekday() == Weekday::Mon {
            profile.monday_multiplier
        } else {
            1.0
        };
        let noise = self.noise_factor(date, category, profile);

        (base * weight * weekend * monday * noise).round().max(0.0) as u64
    }

    /// Bounded noise in `[1 - amplitude, 1 + amplitude]`, drawn once per
    /// (date, category). Hour is deliberately not part of the seed: every
    /// hour of the same day shares the draw.
    fn noise_factor(&self, date: NaiveDate, category: &str, profile: &VolumeProfile) -> f64 {
        if profile.noise_amplitude == 0.0 {
            return 1.0;
        }
        let mut rng = seed::sub_rng(date, category, "volume-noise");
        rng.gen_range(1.0 - profile.noise_amplitude..=1.0 + profile.noise_amplitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn model_with(category: &str, cfg: VolumeProfileConfig) -> VolumeModel {
        let mut profiles = HashMap::new();
        profiles.insert(category.to_string(), cfg);
        VolumeModel::from_config(&profiles)
    }

    fn firewall_config() -> VolumeProfileConfig {
        // Business-hours hump with a 9:00 peak.
        let mut weights = [1.0f64; 24];
        for (h, w) in weights.iter_mut().enumerate() {
            if (8..18).contains(&h) {
                *w = 6.0;
            }
        }
        weights[9] = 8.0;
        VolumeProfileConfig {
            hourly_weights: weights,
            weekend_multiplier: 0.3,
            monday_multiplier: 1.15,
            noise_amplitude: 0.15,
            base_count: 1000.0,
        }
    }

    #[test]
    fn test_zero_base_is_zero_everywhere() {
        let model = model_with("firewall", firewall_config());
        for hour in 0..24 {
            assert_eq!(model.events_for_hour(0.0, date(2026, 1, 5), hour, "firewall"), 0);
        }
    }

    #[test]
    fn test_invalid_base_clamps_to_zero() {
        let model = model_with("firewall", firewall_config());
        let d = date(2026, 1, 5);
        assert_eq!(model.events_for_hour(-50.0, d, 9, "firewall"), 0);
        assert_eq!(model.events_for_hour(f64::NAN, d, 9, "firewall"), 0);
        assert_eq!(model.events_for_hour(f64::INFINITY, d, 9, "firewall"), 0);
    }

    #[test]
    fn test_unknown_category_uses_flat_profile() {
        let model = model_with("firewall", firewall_config());
        // Flat profile: every hour equal, no weekday shaping, no noise.
        let monday = model.events_for_hour(2400.0, date(2026, 1, 5), 3, "badge-reader");
        let saturday = model.events_for_hour(2400.0, date(2026, 1, 10), 17, "badge-reader");
        assert_eq!(monday, 100);
        assert_eq!(saturday, 100);
    }

    #[test]
    fn test_conservation_over_day() {
        let model = model_with("firewall", firewall_config());
        let d = date(2026, 1, 7); // Wednesday
        let total: u64 = (0..24)
            .map(|h| model.events_for_hour(1000.0, d, h, "firewall"))
            .sum();
        // Weights are normalized, so the total is base × noise ± rounding.
        let mut rng = seed::sub_rng(d, "firewall", "volume-noise");
        let noise: f64 = rng.gen_range(0.85..=1.15);
        let expected = 1000.0 * noise;
        assert!((total as f64 - expected).abs() <= 24.0, "total={total} expected≈{expected}");
    }

    #[test]
    fn test_weekend_below_weekday() {
        let model = model_with("firewall", firewall_config());
        let friday = date(2026, 1, 9);
        let saturday = date(2026, 1, 10);
        let fri_total: u64 = (0..24)
            .map(|h| model.events_for_hour(1000.0, friday, h, "firewall"))
            .sum();
        let sat_total: u64 = (0..24)
            .map(|h| model.events_for_hour(1000.0, saturday, h, "firewall"))
            .sum();
        // weekend_multiplier 0.3 dominates the ±15% noise band.
        assert!(sat_total < fri_total, "sat={sat_total} fri={fri_total}");
    }

    #[test]
    fn test_monday_peak_hour_worked_example() {
        // 1000 × 0.08 × 1.15 × noise with noise in [0.85, 1.15] → 78..=106.
        let mut weights = [0.04f64; 24];
        weights[9] = 0.08;
        let remainder = (1.0 - 0.08) / 23.0;
        for (h, w) in weights.iter_mut().enumerate() {
            if h != 9 {
                *w = remainder;
            }
        }
        let model = model_with(
            "firewall",
            VolumeProfileConfig {
                hourly_weights: weights,
                weekend_multiplier: 0.3,
                monday_multiplier: 1.15,
                noise_amplitude: 0.15,
                base_count: 1000.0,
            },
        );
        let monday = date(2026, 1, 5);
        let n = model.events_for_hour(1000.0, monday, 9, "firewall");
        assert!((78..=106).contains(&n), "peak-hour count {n} out of band");
        // Reproducible exactly.
        assert_eq!(n, model.events_for_hour(1000.0, monday, 9, "firewall"));
    }
}
