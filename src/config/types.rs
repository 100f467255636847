use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration. Constructed once at run start and passed by
/// reference into the volume model and every generator invocation; nothing
/// reads config as ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub company: CompanyConfig,
    #[serde(default = "default_volumes")]
    pub volumes: HashMap<String, VolumeProfileConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            company: CompanyConfig::default(),
            volumes: default_volumes(),
            output: OutputConfig::default(),
            orchestrator: OrchestratorConfig::default(),
        }
    }
}

/// The fictitious company whose telemetry we fabricate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyConfig {
    pub name: String,
    pub domain: String,
    /// Workforce roster; generators pick actors from this list.
    pub users: Vec<String>,
    /// First two octets of the internal address space, e.g. "10.20".
    pub internal_net: String,
    /// The NAT egress address all outbound traffic appears from.
    pub egress_ip: String,
    /// Products sold on the web store; the order ledger draws from these.
    pub products: Vec<String>,
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            name: "Coppermine Dynamics".to_string(),
            domain: "coppermine.example".to_string(),
            users: [
                "avery.cole", "brianna.okafor", "carl.lindqvist", "dana.whitfield",
                "elias.moreau", "farah.nazari", "gus.tanaka", "hana.petrov",
                "ivan.reyes", "jules.acheampong", "kira.solberg", "liam.dube",
                "mona.kessler", "nate.oduya", "priya.raman", "tomas.vela",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            internal_net: "10.20".to_string(),
            egress_ip: "203.0.113.40".to_string(),
            products: [
                "copperline-basic", "copperline-pro", "minecart-addon",
                "smelter-suite", "orebot-license",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Raw per-category volume shape as it appears in YAML. Weights need not sum
/// to 1.0; the volume model normalizes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeProfileConfig {
    pub hourly_weights: [f64; 24],
    #[serde(default = "default_one")]
    pub weekend_multiplier: f64,
    #[serde(default = "default_one")]
    pub monday_multiplier: f64,
    #[serde(default)]
    pub noise_amplitude: f64,
    pub base_count: f64,
}

fn default_one() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root for `--no-test` (durable) runs.
    #[serde(default = "default_durable_dir")]
    pub durable_dir: PathBuf,
    /// Root for scratch runs. Defaults to a fixed directory under the system
    /// temp dir so repeated test runs overwrite rather than accumulate.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            durable_dir: default_durable_dir(),
            scratch_dir: default_scratch_dir(),
        }
    }
}

fn default_durable_dir() -> PathBuf {
    PathBuf::from("/var/lib/logforge/output")
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("logforge-scratch")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Worker pool bound. Zero means "use available parallelism".
    #[serde(default)]
    pub workers: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { workers: 0 }
    }
}

impl OrchestratorConfig {
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        }
    }
}

/// Built-in volume tables. Illustrative shapes, not measurements: office-hour
/// humps for internal categories, a flatter curve with weekend traffic for
/// customer-facing web, and a light email rhythm.
fn default_volumes() -> HashMap<String, VolumeProfileConfig> {
    let mut volumes = HashMap::new();

    volumes.insert(
        "firewall".to_string(),
        VolumeProfileConfig {
            hourly_weights: office_hours_curve(2.0, 10.0),
            weekend_multiplier: 0.3,
            monday_multiplier: 1.15,
            noise_amplitude: 0.15,
            base_count: 24000.0,
        },
    );
    volumes.insert(
        "cloud".to_string(),
        VolumeProfileConfig {
            hourly_weights: office_hours_curve(3.0, 8.0),
            weekend_multiplier: 0.5,
            monday_multiplier: 1.1,
            noise_amplitude: 0.12,
            base_count: 6000.0,
        },
    );
    volumes.insert(
        "auth".to_string(),
        VolumeProfileConfig {
            hourly_weights: office_hours_curve(0.5, 12.0),
            weekend_multiplier: 0.15,
            monday_multiplier: 1.25,
            noise_amplitude: 0.2,
            base_count: 3500.0,
        },
    );
    volumes.insert(
        "web".to_string(),
        VolumeProfileConfig {
            hourly_weights: office_hours_curve(4.0, 9.0),
            // Customer-facing: weekends are busier than weekdays.
            weekend_multiplier: 1.3,
            monday_multiplier: 1.0,
            noise_amplitude: 0.18,
            base_count: 15000.0,
        },
    );
    volumes.insert(
        "email".to_string(),
        VolumeProfileConfig {
            hourly_weights: office_hours_curve(1.0, 9.0),
            weekend_multiplier: 0.1,
            monday_multiplier: 1.3,
            noise_amplitude: 0.2,
            base_count: 2200.0,
        },
    );
    volumes.insert(
        "business".to_string(),
        VolumeProfileConfig {
            hourly_weights: office_hours_curve(0.5, 10.0),
            weekend_multiplier: 0.8,
            monday_multiplier: 1.1,
            noise_amplitude: 0.1,
            base_count: 900.0,
        },
    );

    volumes
}

/// Curve with `night` weight overnight and `day` weight 08:00-18:00, with a
/// lunchtime dip.
fn office_hours_curve(night: f64, day: f64) -> [f64; 24] {
    let mut weights = [night; 24];
    for (hour, w) in weights.iter_mut().enumerate() {
        if (8..18).contains(&hour) {
            *w = day;
        }
    }
    weights[12] = day * 0.7;
    weights
}
