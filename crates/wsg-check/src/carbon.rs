/// Carbon estimation using the Sustainable Web Design model (v3).
///
/// Energy per byte is split across system segments; only the data-centre segment
/// benefits from green hosting. Per-view emissions blend first visits with returning
/// visits that reload a small share of the data.
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SWD_MODEL: &str = "swd-v3";

const KWH_PER_GB: f64 = 0.81;
const BYTES_PER_GB: f64 = 1_000_000_000.0;

const CONSUMER_DEVICE_SHARE: f64 = 0.52;
const NETWORK_SHARE: f64 = 0.14;
const DATA_CENTRE_SHARE: f64 = 0.15;
const PRODUCTION_SHARE: f64 = 0.19;

/// g CO2e per kWh
const GLOBAL_GRID_INTENSITY: f64 = 442.0;
const RENEWABLE_INTENSITY: f64 = 50.0;

const FIRST_VISIT_SHARE: f64 = 0.75;
const RETURN_VISIT_SHARE: f64 = 0.25;
const RETURN_VISIT_RELOAD: f64 = 0.02;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarbonEstimate {
    pub grams_co2_per_view: f64,
    pub model: String,
    pub green_hosting: bool,
}

impl CarbonEstimate {
    pub fn swd(bytes: u64, green_hosting: bool) -> Self {
        Self {
            grams_co2_per_view: swd_grams_per_view(bytes, green_hosting),
            model: SWD_MODEL.to_string(),
            green_hosting,
        }
    }
}

/// Produces a carbon estimate for a page. Implementations must not fail: any lookup
/// problem degrades to "not green".
pub trait CarbonEstimator: Send + Sync {
    fn estimate<'a>(&'a self, host: &'a str, bytes: u64) -> BoxFuture<'a, CarbonEstimate>;
}

/// SWD figures without a hosting lookup; every host counts as not green.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineEstimator;

impl CarbonEstimator for OfflineEstimator {
    fn estimate<'a>(&'a self, _host: &'a str, bytes: u64) -> BoxFuture<'a, CarbonEstimate> {
        Box::pin(async move { CarbonEstimate::swd(bytes, false) })
    }
}

fn grams_per_transfer(bytes: u64, green_hosting: bool) -> f64 {
    let energy_kwh = bytes as f64 / BYTES_PER_GB * KWH_PER_GB;
    let data_centre_intensity = if green_hosting {
        RENEWABLE_INTENSITY
    } else {
        GLOBAL_GRID_INTENSITY
    };

    let grid_segments = CONSUMER_DEVICE_SHARE + NETWORK_SHARE + PRODUCTION_SHARE;
    energy_kwh * grid_segments * GLOBAL_GRID_INTENSITY
        + energy_kwh * DATA_CENTRE_SHARE * data_centre_intensity
}

/// Grams of CO2e for one page view transferring `bytes`.
pub fn swd_grams_per_view(bytes: u64, green_hosting: bool) -> f64 {
    let per_transfer = grams_per_transfer(bytes, green_hosting);
    per_transfer * FIRST_VISIT_SHARE + per_transfer * RETURN_VISIT_SHARE * RETURN_VISIT_RELOAD
}
