use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Where generated files land. Scratch is for test runs and lives under the
/// configured scratch root (system temp by default); Durable is the real
/// ingest directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Scratch,
    Durable,
}

/// One generation invocation. Built once from the CLI (or the remote trigger)
/// and passed by reference everywhere; never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRun {
    pub start_date: NaiveDate,
    pub days: u32,
    pub scale: f64,
    pub sources: Vec<String>,
    pub scenarios: Vec<String>,
    pub output_mode: OutputMode,
    pub workers: usize,
    pub show_files: bool,
}

impl GenerationRun {
    /// Calendar date for a zero-based day index within the run window.
    pub fn date_for(&self, day: u32) -> NaiveDate {
        self.start_date + Duration::days(day as i64)
    }

    /// (day index, date) pairs covering the whole window.
    pub fn days_iter(&self) -> impl Iterator<Item = (u32, NaiveDate)> + '_ {
        (0..self.days).map(|d| (d, self.date_for(d)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_run() -> GenerationRun {
        GenerationRun {
            start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            days: 3,
            scale: 1.0,
            sources: vec!["firewall".to_string()],
            scenarios: vec![],
            output_mode: OutputMode::Scratch,
            workers: 2,
            show_files: false,
        }
    }

    #[test]
    fn test_date_for_offsets() {
        let run = make_run();
        assert_eq!(run.date_for(0), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        assert_eq!(run.date_for(2), NaiveDate::from_ymd_opt(2026, 1, 7).unwrap());
    }

    #[test]
    fn test_days_iter_covers_window() {
        let run = make_run();
        let days: Vec<_> = run.days_iter().collect();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].0, 0);
        assert_eq!(days[2].1, NaiveDate::from_ymd_opt(2026, 1, 7).unwrap());
    }
}
