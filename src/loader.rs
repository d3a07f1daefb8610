use crate::error::DashboardError;
use crate::types::{IncentiveRecord, RawIncentiveRow, RawSlaRow, SlaRecord};
use crate::util::{parse_datetime_safe, parse_f64_safe};
use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Diagnostics from cleaning one source file.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub parse_errors: usize,
}

// Process-wide read-through caches, keyed by path, populated on the first
// load and never invalidated within a session. A restart reloads from disk.
static INCENTIVE_CACHE: Lazy<Mutex<HashMap<String, (Arc<Vec<IncentiveRecord>>, LoadReport)>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
static SLA_CACHE: Lazy<Mutex<HashMap<String, (Arc<Vec<SlaRecord>>, LoadReport)>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Load and clean the courier incentive file. Repeated calls with the same
/// path return the cached table without touching the disk. A missing or
/// malformed file propagates as an error; nothing is cached for it.
pub fn load_incentives(
    path: &str,
) -> Result<(Arc<Vec<IncentiveRecord>>, LoadReport), DashboardError> {
    if let Some((data, report)) = INCENTIVE_CACHE.lock().unwrap().get(path) {
        return Ok((Arc::clone(data), report.clone()));
    }
    let (data, report) = read_incentives(path)?;
    let data = Arc::new(data);
    INCENTIVE_CACHE
        .lock()
        .unwrap()
        .insert(path.to_string(), (Arc::clone(&data), report.clone()));
    Ok((data, report))
}

/// Load and clean the pickup SLA file, with the same caching contract as
/// [`load_incentives`].
pub fn load_sla(path: &str) -> Result<(Arc<Vec<SlaRecord>>, LoadReport), DashboardError> {
    if let Some((data, report)) = SLA_CACHE.lock().unwrap().get(path) {
        return Ok((Arc::clone(data), report.clone()));
    }
    let (data, report) = read_sla(path)?;
    let data = Arc::new(data);
    SLA_CACHE
        .lock()
        .unwrap()
        .insert(path.to_string(), (Arc::clone(&data), report.clone()));
    Ok((data, report))
}

fn read_incentives(path: &str) -> Result<(Vec<IncentiveRecord>, LoadReport), DashboardError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records: Vec<IncentiveRecord> = Vec::new();

    for result in rdr.deserialize::<RawIncentiveRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };

        let courier = match row.courier.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => {
                parse_errors += 1;
                continue;
            }
        };
        let outlet = match row.outlet.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => {
                parse_errors += 1;
                continue;
            }
        };
        let picked_up_at = match parse_datetime_safe(row.pickup_date_time.as_deref()) {
            Some(dt) => dt,
            None => {
                parse_errors += 1;
                continue;
            }
        };
        let incentive = match parse_f64_safe(row.courier_insentive.as_deref()) {
            Some(v) => v,
            None => {
                parse_errors += 1;
                continue;
            }
        };
        let pickup_count = match parse_f64_safe(row.total_pickup.as_deref()) {
            Some(v) => v,
            None => {
                parse_errors += 1;
                continue;
            }
        };

        records.push(IncentiveRecord {
            courier,
            outlet,
            picked_up_at,
            incentive,
            pickup_count,
        });
    }

    let report = LoadReport {
        total_rows,
        kept_rows: records.len(),
        parse_errors,
    };
    Ok((records, report))
}

fn read_sla(path: &str) -> Result<(Vec<SlaRecord>, LoadReport), DashboardError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records: Vec<SlaRecord> = Vec::new();

    for result in rdr.deserialize::<RawSlaRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };

        let picked_up_at = match parse_datetime_safe(row.pickup_date_time.as_deref()) {
            Some(dt) => dt,
            None => {
                parse_errors += 1;
                continue;
            }
        };
        let sla_percent = match parse_f64_safe(row.sla_percent.as_deref()) {
            Some(v) => v,
            None => {
                parse_errors += 1;
                continue;
            }
        };

        // Outlet stays raw (and possibly missing) here; the SLA aggregator
        // owns the drop/trim policy.
        records.push(SlaRecord {
            outlet: row.outlet,
            picked_up_at,
            sla_percent,
        });
    }

    let report = LoadReport {
        total_rows,
        kept_rows: records.len(),
        parse_errors,
    };
    Ok((records, report))
}
