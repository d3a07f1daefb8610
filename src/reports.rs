use crate::error::DashboardError;
use crate::types::{
    CourierOutletRow, IncentiveRecord, LoadMeans, OutletLoadRow, OutletSlaRow, RenderSummary,
    SlaRecord, TopN,
};
use crate::util::average;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Synthetic courier identity used by the upstream system for outlet-level
/// bookkeeping. Not a real courier; excluded from courier-level aggregates.
pub const SUPERADMIN: &str = "Superadmin";

fn is_real_courier(r: &IncentiveRecord) -> bool {
    r.courier != SUPERADMIN
}

/// Per-(courier, outlet) incentive and pickup totals over the filtered rows,
/// sorted descending by pickups. One row per pair present in the input;
/// absent pairs are absent, not zero-filled.
pub fn courier_outlet_report(data: &[IncentiveRecord]) -> Vec<CourierOutletRow> {
    let mut map: BTreeMap<(String, String), (f64, f64)> = BTreeMap::new();
    for r in data.iter().filter(|r| is_real_courier(r)) {
        let e = map
            .entry((r.courier.clone(), r.outlet.clone()))
            .or_insert((0.0, 0.0));
        e.0 += r.incentive;
        e.1 += r.pickup_count;
    }
    let mut rows: Vec<CourierOutletRow> = map
        .into_iter()
        .map(|((courier, outlet), (total_incentive, total_pickups))| CourierOutletRow {
            courier,
            outlet,
            total_incentive,
            total_pickups,
        })
        .collect();
    // Stable sort; ties keep the (courier, outlet) order from the map.
    rows.sort_by(|a, b| {
        b.total_pickups
            .partial_cmp(&a.total_pickups)
            .unwrap_or(Ordering::Equal)
    });
    rows
}

/// Mean `% SLA` per outlet. Rows with a missing outlet are dropped and the
/// survivors trimmed, so raw names differing only by surrounding whitespace
/// collapse to one group. An input with nothing left to group signals
/// `NoSlaData` instead of averaging zero rows.
pub fn sla_report(data: &[SlaRecord]) -> Result<Vec<OutletSlaRow>, DashboardError> {
    if data.is_empty() {
        return Err(DashboardError::NoSlaData);
    }
    let mut map: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for r in data {
        let Some(outlet) = r.outlet.as_deref() else {
            continue;
        };
        let outlet = outlet.trim();
        if outlet.is_empty() {
            continue;
        }
        let e = map.entry(outlet.to_string()).or_insert((0.0, 0));
        e.0 += r.sla_percent;
        e.1 += 1;
    }
    if map.is_empty() {
        return Err(DashboardError::NoSlaData);
    }
    Ok(map
        .into_iter()
        .map(|(outlet, (sum, n))| OutletSlaRow {
            outlet,
            sla_mean: sum / n as f64,
        })
        .collect())
}

/// Per-outlet load and incentive totals over the filtered rows, every
/// courier included (Superadmin too: outlet load is outlet-level, not
/// courier-level), sorted descending by load and truncated to the top N.
/// The means are unweighted over the kept rows only.
pub fn top_load_report(data: &[IncentiveRecord], n: TopN) -> (Vec<OutletLoadRow>, LoadMeans) {
    let mut map: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for r in data {
        let e = map.entry(r.outlet.clone()).or_insert((0.0, 0.0));
        e.0 += r.pickup_count;
        e.1 += r.incentive;
    }
    let mut rows: Vec<OutletLoadRow> = map
        .into_iter()
        .map(|(outlet, (total_load, total_incentive))| OutletLoadRow {
            outlet,
            total_load,
            total_incentive,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total_load
            .partial_cmp(&a.total_load)
            .unwrap_or(Ordering::Equal)
    });
    rows.truncate(n.limit());

    let means = LoadMeans {
        load: average(&rows.iter().map(|r| r.total_load).collect::<Vec<_>>()),
        incentive: average(&rows.iter().map(|r| r.total_incentive).collect::<Vec<_>>()),
    };
    (rows, means)
}

pub fn render_summary(data: &[IncentiveRecord]) -> RenderSummary {
    let couriers: BTreeSet<&str> = data
        .iter()
        .filter(|r| is_real_courier(r))
        .map(|r| r.courier.as_str())
        .collect();
    let outlets: BTreeSet<&str> = data.iter().map(|r| r.outlet.as_str()).collect();
    RenderSummary {
        total_couriers: couriers.len(),
        total_outlets: outlets.len(),
        total_pickups: data.iter().map(|r| r.pickup_count).sum(),
        total_incentive: data.iter().map(|r| r.incentive).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::parse_datetime_safe;

    fn rec(courier: &str, outlet: &str, date: &str, incentive: f64, pickups: f64) -> IncentiveRecord {
        IncentiveRecord {
            courier: courier.to_string(),
            outlet: outlet.to_string(),
            picked_up_at: parse_datetime_safe(Some(date)).unwrap(),
            incentive,
            pickup_count: pickups,
        }
    }

    fn sla(outlet: Option<&str>, percent: f64) -> SlaRecord {
        SlaRecord {
            outlet: outlet.map(str::to_string),
            picked_up_at: parse_datetime_safe(Some("2024-01-01 08:00:00")).unwrap(),
            sla_percent: percent,
        }
    }

    #[test]
    fn superadmin_is_excluded_from_courier_aggregate() {
        let rows = vec![
            rec(SUPERADMIN, "X", "2024-01-01", 100.0, 5.0),
            rec("A", "X", "2024-01-01", 50.0, 3.0),
        ];
        let agg = courier_outlet_report(&rows);
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].courier, "A");
        assert_eq!(agg[0].outlet, "X");
        assert_eq!(agg[0].total_incentive, 50.0);
        assert_eq!(agg[0].total_pickups, 3.0);
    }

    #[test]
    fn courier_aggregate_sums_per_pair_and_sorts_by_pickups() {
        let rows = vec![
            rec("A", "X", "2024-01-01", 10.0, 2.0),
            rec("B", "Y", "2024-01-01", 5.0, 9.0),
            rec("A", "X", "2024-01-02", 15.0, 4.0),
            rec("A", "Y", "2024-01-02", 1.0, 1.0),
        ];
        let agg = courier_outlet_report(&rows);
        assert_eq!(agg.len(), 3);
        // Descending by summed pickups.
        assert_eq!(agg[0].courier, "B");
        assert_eq!(agg[0].total_pickups, 9.0);
        assert_eq!(agg[1].courier, "A");
        assert_eq!(agg[1].outlet, "X");
        assert_eq!(agg[1].total_incentive, 25.0);
        assert_eq!(agg[1].total_pickups, 6.0);
        assert_eq!(agg[2].outlet, "Y");
    }

    #[test]
    fn sla_drops_missing_outlets_and_collapses_whitespace_variants() {
        let rows = vec![sla(None, 90.0), sla(Some("Y"), 80.0), sla(Some(" Y "), 100.0)];
        let agg = sla_report(&rows).unwrap();
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].outlet, "Y");
        assert_eq!(agg[0].sla_mean, 90.0);
    }

    #[test]
    fn store_a_whitespace_variants_are_one_group() {
        let rows = vec![sla(Some("Store A"), 70.0), sla(Some(" Store A "), 90.0)];
        let agg = sla_report(&rows).unwrap();
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].outlet, "Store A");
        assert_eq!(agg[0].sla_mean, 80.0);
    }

    #[test]
    fn empty_sla_input_signals_no_data() {
        assert!(matches!(sla_report(&[]), Err(DashboardError::NoSlaData)));
        // All rows dropped for missing outlets is the same condition.
        let rows = vec![sla(None, 90.0), sla(Some("   "), 80.0)];
        assert!(matches!(sla_report(&rows), Err(DashboardError::NoSlaData)));
    }

    #[test]
    fn top_load_keeps_superadmin_truncates_and_sorts() {
        let mut rows = vec![rec(SUPERADMIN, "Big", "2024-01-01", 10.0, 100.0)];
        for i in 0..12 {
            rows.push(rec("A", &format!("Outlet {i:02}"), "2024-01-01", 1.0, i as f64));
        }
        let (agg, _) = top_load_report(&rows, TopN::Ten);
        assert_eq!(agg.len(), 10);
        // Superadmin's outlet counts toward load and dominates.
        assert_eq!(agg[0].outlet, "Big");
        assert!(agg
            .windows(2)
            .all(|w| w[0].total_load >= w[1].total_load));
    }

    #[test]
    fn top_load_means_cover_kept_rows_only() {
        let rows = vec![
            rec("A", "X", "2024-01-01", 100.0, 30.0),
            rec("A", "Y", "2024-01-01", 50.0, 20.0),
            rec("A", "Z", "2024-01-01", 10.0, 10.0),
        ];
        // All three outlets fit under N=10, so means cover all of them.
        let (agg, means) = top_load_report(&rows, TopN::Ten);
        assert_eq!(agg.len(), 3);
        assert_eq!(means.load, 20.0);
        assert!((means.incentive - 160.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn summary_counts_distinct_real_couriers() {
        let rows = vec![
            rec(SUPERADMIN, "X", "2024-01-01", 100.0, 5.0),
            rec("A", "X", "2024-01-01", 50.0, 3.0),
            rec("A", "Y", "2024-01-01", 25.0, 2.0),
        ];
        let s = render_summary(&rows);
        assert_eq!(s.total_couriers, 1);
        assert_eq!(s.total_outlets, 2);
        assert_eq!(s.total_pickups, 10.0);
        assert_eq!(s.total_incentive, 175.0);
    }
}
