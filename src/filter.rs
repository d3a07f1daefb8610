// Row-selection stages of the pipeline: the inclusive date-range filter that
// feeds both aggregators, and the outlet multiselect applied to the courier
// aggregate.
use crate::error::DashboardError;
use crate::types::{CourierOutletRow, IncentiveRecord, SlaRecord};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

/// Anything carrying a pickup timestamp can go through the date filter.
pub trait PickupStamped {
    fn picked_up_at(&self) -> NaiveDateTime;
}

impl PickupStamped for IncentiveRecord {
    fn picked_up_at(&self) -> NaiveDateTime {
        self.picked_up_at
    }
}

impl PickupStamped for SlaRecord {
    fn picked_up_at(&self) -> NaiveDateTime {
        self.picked_up_at
    }
}

/// Inclusive `[start, end]` interval of calendar dates. Time-of-day is
/// ignored everywhere; comparison truncates timestamps to their date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range from the dates the user actually picked: none is an
    /// error, one collapses both bounds to that day, two are normalized so
    /// `start <= end`.
    pub fn from_picked(dates: &[NaiveDate]) -> Result<Self, DashboardError> {
        match dates {
            [] => Err(DashboardError::EmptyDateSelection),
            [only] => Ok(DateRange {
                start: *only,
                end: *only,
            }),
            [a, b, ..] => Ok(DateRange {
                start: (*a).min(*b),
                end: (*a).max(*b),
            }),
        }
    }

    pub fn contains(&self, stamp: NaiveDateTime) -> bool {
        let day = stamp.date();
        day >= self.start && day <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} s.d. {}", self.start, self.end)
    }
}

/// Keep the rows whose pickup date falls inside `range`, preserving the
/// original row order.
pub fn filter_by_date<T: PickupStamped + Clone>(rows: &[T], range: &DateRange) -> Vec<T> {
    rows.iter()
        .filter(|r| range.contains(r.picked_up_at()))
        .cloned()
        .collect()
}

/// Restrict the courier aggregate to the chosen outlets. An empty result is
/// a recoverable "nothing to chart" condition, not an empty table.
pub fn filter_by_outlets(
    rows: &[CourierOutletRow],
    selected: &BTreeSet<String>,
) -> Result<Vec<CourierOutletRow>, DashboardError> {
    let kept: Vec<CourierOutletRow> = rows
        .iter()
        .filter(|r| selected.contains(&r.outlet))
        .cloned()
        .collect();
    if kept.is_empty() {
        return Err(DashboardError::NoDataForOutlets);
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(courier: &str, outlet: &str, stamp: &str, incentive: f64, pickups: f64) -> IncentiveRecord {
        IncentiveRecord {
            courier: courier.to_string(),
            outlet: outlet.to_string(),
            picked_up_at: crate::util::parse_datetime_safe(Some(stamp)).unwrap(),
            incentive,
            pickup_count: pickups,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_selection_is_an_error() {
        assert!(matches!(
            DateRange::from_picked(&[]),
            Err(DashboardError::EmptyDateSelection)
        ));
    }

    #[test]
    fn single_date_collapses_both_bounds() {
        let r = DateRange::from_picked(&[day("2024-01-01")]).unwrap();
        assert_eq!(r.start, r.end);
        assert_eq!(r.start, day("2024-01-01"));
    }

    #[test]
    fn reversed_dates_are_normalized() {
        let r = DateRange::from_picked(&[day("2024-03-05"), day("2024-03-01")]).unwrap();
        assert_eq!(r.start, day("2024-03-01"));
        assert_eq!(r.end, day("2024-03-05"));
    }

    #[test]
    fn date_filter_is_sound_complete_and_order_preserving() {
        let rows = vec![
            rec("A", "X", "2023-12-31 23:59:59", 1.0, 1.0),
            rec("B", "X", "2024-01-01 00:00:00", 2.0, 1.0),
            rec("C", "Y", "2024-01-02 18:00:00", 3.0, 1.0),
            rec("D", "Y", "2024-01-03 00:00:01", 4.0, 1.0),
        ];
        let range = DateRange::from_picked(&[day("2024-01-01"), day("2024-01-02")]).unwrap();
        let kept = filter_by_date(&rows, &range);
        // Bounds are inclusive on the date component; order is preserved.
        let couriers: Vec<&str> = kept.iter().map(|r| r.courier.as_str()).collect();
        assert_eq!(couriers, vec!["B", "C"]);
        assert!(kept.iter().all(|r| range.contains(r.picked_up_at)));
    }

    #[test]
    fn outlet_filter_keeps_only_selected() {
        let agg = vec![
            CourierOutletRow {
                courier: "A".into(),
                outlet: "X".into(),
                total_incentive: 10.0,
                total_pickups: 2.0,
            },
            CourierOutletRow {
                courier: "B".into(),
                outlet: "Y".into(),
                total_incentive: 20.0,
                total_pickups: 5.0,
            },
        ];
        let selected: BTreeSet<String> = ["Y".to_string()].into_iter().collect();
        let kept = filter_by_outlets(&agg, &selected).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].outlet, "Y");
    }

    #[test]
    fn absent_outlet_selection_signals_no_data() {
        let agg = vec![CourierOutletRow {
            courier: "A".into(),
            outlet: "X".into(),
            total_incentive: 10.0,
            total_pickups: 2.0,
        }];
        let selected: BTreeSet<String> = ["Nowhere".to_string()].into_iter().collect();
        assert!(matches!(
            filter_by_outlets(&agg, &selected),
            Err(DashboardError::NoDataForOutlets)
        ));
    }
}
