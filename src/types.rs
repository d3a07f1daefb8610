use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

// Raw CSV rows. The `rename` strings are the upstream export's column names
// and are a fixed contract with the data producer.

#[derive(Debug, Deserialize)]
pub struct RawIncentiveRow {
    #[serde(rename = "NAMA_SIGESIT")]
    pub courier: Option<String>,
    #[serde(rename = "NAMA_GERAI")]
    pub outlet: Option<String>,
    #[serde(rename = "PICKUP_DATE_TIME")]
    pub pickup_date_time: Option<String>,
    #[serde(rename = "COURIER_INSENTIVE")]
    pub courier_insentive: Option<String>,
    #[serde(rename = "Total Pickup")]
    pub total_pickup: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawSlaRow {
    #[serde(rename = "NAMA_GERAI")]
    pub outlet: Option<String>,
    #[serde(rename = "PICKUP_DATE_TIME")]
    pub pickup_date_time: Option<String>,
    #[serde(rename = "% SLA")]
    pub sla_percent: Option<String>,
}

// Cleaned, typed records the rest of the pipeline works with.

#[derive(Debug, Clone)]
pub struct IncentiveRecord {
    pub courier: String,
    pub outlet: String,
    pub picked_up_at: NaiveDateTime,
    pub incentive: f64,
    pub pickup_count: f64,
}

#[derive(Debug, Clone)]
pub struct SlaRecord {
    // Stays optional here; the SLA aggregator owns the drop/trim policy.
    pub outlet: Option<String>,
    pub picked_up_at: NaiveDateTime,
    pub sla_percent: f64,
}

// Aggregate rows, rebuilt from scratch on every render.

#[derive(Debug, Clone, Tabled)]
pub struct CourierOutletRow {
    #[tabled(rename = "NAMA_SIGESIT")]
    pub courier: String,
    #[tabled(rename = "NAMA_GERAI")]
    pub outlet: String,
    #[tabled(rename = "COURIER_INSENTIVE", display_with = "crate::util::fmt_amount")]
    pub total_incentive: f64,
    #[tabled(rename = "Total Pickup", display_with = "crate::util::fmt_count")]
    pub total_pickups: f64,
}

#[derive(Debug, Clone, Tabled)]
pub struct OutletSlaRow {
    #[tabled(rename = "NAMA_GERAI")]
    pub outlet: String,
    #[tabled(rename = "SLA_RataRata", display_with = "crate::util::fmt_amount")]
    pub sla_mean: f64,
}

#[derive(Debug, Clone, Tabled)]
pub struct OutletLoadRow {
    #[tabled(rename = "NAMA_GERAI")]
    pub outlet: String,
    #[tabled(rename = "Jumlah_Load", display_with = "crate::util::fmt_count")]
    pub total_load: f64,
    #[tabled(rename = "Total_Insentif", display_with = "crate::util::fmt_amount")]
    pub total_incentive: f64,
}

/// Unweighted means over the kept top-N rows, drawn as reference lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadMeans {
    pub load: f64,
    pub incentive: f64,
}

/// Allowed values for the top-outlets truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopN {
    #[default]
    Ten,
    Twenty,
    Thirty,
}

impl TopN {
    pub fn limit(self) -> usize {
        match self {
            TopN::Ten => 10,
            TopN::Twenty => 20,
            TopN::Thirty => 30,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "10" => Some(TopN::Ten),
            "20" => Some(TopN::Twenty),
            "30" => Some(TopN::Thirty),
            _ => None,
        }
    }
}

/// Headline figures for the filtered range, printed as one JSON line after a
/// render.
#[derive(Debug, Serialize)]
pub struct RenderSummary {
    pub total_couriers: usize,
    pub total_outlets: usize,
    pub total_pickups: f64,
    pub total_incentive: f64,
}
