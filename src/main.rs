// Entry point and high-level CLI flow.
//
// The Rust binary mirrors the behavior of the original dashboard:
// - Option [1] loads and cleans both source CSVs, printing diagnostics.
// - Option [2] renders the dashboard for a chosen date range, outlet
//   selection, and top-N: courier table, SLA chart, courier productivity
//   chart, and the top-outlet load/incentive table + charts.
// - After a render, the user can choose to go back to the menu or exit.
//
// Every render is an independent, stateless computation over the
// immutably-loaded tables; nothing carries over between renders except the
// memoized load itself.
mod charts;
mod error;
mod filter;
mod loader;
mod output;
mod reports;
mod types;
mod util;

use chrono::NaiveDate;
use filter::{filter_by_date, filter_by_outlets, DateRange};
use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use types::{CourierOutletRow, IncentiveRecord, SlaRecord, TopN};

const INCENTIVE_FILE: &str = "courier_insentif_new.csv";
const SLA_FILE: &str = "pickup_performance1.csv";

const SLA_CHART_FILE: &str = "sla_pickup_gerai.svg";
const KURIR_CHART_FILE: &str = "produktivitas_kurir.svg";
const LOAD_CHART_FILE: &str = "load_insentif_gerai.svg";

// Simple in-memory app state so we load/clean the CSVs once but can render
// the dashboard many times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        incentives: None,
        sla: None,
    })
});

struct AppState {
    incentives: Option<Arc<Vec<IncentiveRecord>>>,
    sla: Option<Arc<Vec<SlaRecord>>>,
}

/// Read a single line of input after printing `prompt`.
fn read_line_trim(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the menu after a render.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_line_trim("Back to Menu (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Collect zero, one, or two calendar dates from the user. Unparseable
/// entries are ignored with a note; how many survive decides the range
/// shape (see `DateRange::from_picked`).
fn prompt_dates() -> Vec<NaiveDate> {
    let mut picked = Vec::new();
    for label in [
        "Start date (YYYY-MM-DD, blank to skip): ",
        "End date (YYYY-MM-DD, blank to skip): ",
    ] {
        let raw = read_line_trim(label);
        if raw.is_empty() {
            continue;
        }
        match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(d) => picked.push(d),
            Err(_) => println!("Ignoring unrecognized date: {}", raw),
        }
    }
    picked
}

/// Outlet multiselect over the outlets present in the courier aggregate.
/// Blank keeps everything.
fn prompt_outlets(rows: &[CourierOutletRow]) -> BTreeSet<String> {
    let all: BTreeSet<String> = rows.iter().map(|r| r.outlet.clone()).collect();
    if !all.is_empty() {
        let names: Vec<&str> = all.iter().map(String::as_str).collect();
        println!("Available outlets: {}", names.join(", "));
    }
    let raw = read_line_trim("Outlets to include (comma-separated, blank = all): ");
    if raw.is_empty() {
        return all;
    }
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn prompt_top_n() -> TopN {
    loop {
        let raw = read_line_trim("Top outlets by load [10/20/30, blank = 10]: ");
        if raw.is_empty() {
            return TopN::default();
        }
        match TopN::parse(&raw) {
            Some(n) => return n,
            None => println!("Invalid choice. Please enter 10, 20, or 30."),
        }
    }
}

/// Handle option [1]: load and clean both source files.
///
/// On success the tables go into `APP_STATE` and a short textual summary of
/// each load is printed. A failure on either file leaves nothing loaded.
fn handle_load() {
    let incentives = match loader::load_incentives(INCENTIVE_FILE) {
        Ok((data, report)) => {
            println!(
                "Incentive data: {} rows loaded, {} kept, {} skipped due to parse/validation errors.",
                util::format_int(report.total_rows as i64),
                util::format_int(report.kept_rows as i64),
                util::format_int(report.parse_errors as i64)
            );
            data
        }
        Err(e) => {
            eprintln!("Failed to load {}: {}\n", INCENTIVE_FILE, e);
            return;
        }
    };
    let sla = match loader::load_sla(SLA_FILE) {
        Ok((data, report)) => {
            println!(
                "SLA data: {} rows loaded, {} kept, {} skipped due to parse/validation errors.\n",
                util::format_int(report.total_rows as i64),
                util::format_int(report.kept_rows as i64),
                util::format_int(report.parse_errors as i64)
            );
            data
        }
        Err(e) => {
            eprintln!("Failed to load {}: {}\n", SLA_FILE, e);
            return;
        }
    };
    let mut state = APP_STATE.lock().unwrap();
    state.incentives = Some(incentives);
    state.sla = Some(sla);
}

/// Handle option [2]: one full dashboard render.
///
/// The SLA chart and the courier chart are independent failure domains: a
/// recoverable "no data" in one prints its warning and the other still
/// renders.
fn handle_render() {
    let (incentives, sla) = {
        let state = APP_STATE.lock().unwrap();
        (state.incentives.clone(), state.sla.clone())
    };
    let (Some(incentives), Some(sla)) = (incentives, sla) else {
        println!("Error: No data loaded. Please load the data files first (option 1).\n");
        return;
    };

    let range = match DateRange::from_picked(&prompt_dates()) {
        Ok(r) => r,
        Err(e) => {
            println!("{}\n", e);
            return;
        }
    };

    let filtered_inc = filter_by_date(&incentives, &range);
    let filtered_sla = filter_by_date(&sla, &range);

    let kurir = reports::courier_outlet_report(&filtered_inc);
    output::print_table("Tabel Insentif Kurir", Some(&range.to_string()), &kurir);

    match reports::sla_report(&filtered_sla) {
        Ok(rows) => match charts::sla_line_chart(SLA_CHART_FILE, &rows) {
            Ok(()) => println!("SLA chart saved to {}\n", SLA_CHART_FILE),
            Err(e) => eprintln!("{}\n", e),
        },
        Err(e) => println!("{}\n", e),
    }

    let selected = prompt_outlets(&kurir);
    match filter_by_outlets(&kurir, &selected) {
        Ok(rows) => {
            let mean =
                util::average(&rows.iter().map(|r| r.total_pickups).collect::<Vec<_>>());
            match charts::courier_bar_chart(KURIR_CHART_FILE, &rows, mean) {
                Ok(()) => println!("Courier productivity chart saved to {}\n", KURIR_CHART_FILE),
                Err(e) => eprintln!("{}\n", e),
            }
        }
        Err(e) => println!("{}\n", e),
    }

    let top_n = prompt_top_n();
    let (top_rows, means) = reports::top_load_report(&filtered_inc, top_n);
    output::print_table(
        &format!("Data Load dan Insentif Gerai ({})", range),
        Some(&format!("Top {} by Jumlah_Load", top_n.limit())),
        &top_rows,
    );
    if !top_rows.is_empty() {
        match charts::outlet_load_charts(LOAD_CHART_FILE, &top_rows, means) {
            Ok(()) => println!("Load/incentive charts saved to {}\n", LOAD_CHART_FILE),
            Err(e) => eprintln!("{}\n", e),
        }
    }

    output::print_summary(&reports::render_summary(&filtered_inc));
}

fn main() {
    loop {
        println!("Dashboard Monitoring Kurir dan Gerai");
        println!("[1] Load data files");
        println!("[2] Render dashboard\n");
        match read_line_trim("Enter choice: ").as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_render();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    // End-to-end over the same stages `handle_render` runs, minus the
    // prompts and chart files.
    #[test]
    fn load_filter_aggregate_pipeline() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(
            b"NAMA_SIGESIT,NAMA_GERAI,PICKUP_DATE_TIME,COURIER_INSENTIVE,Total Pickup\n\
              Superadmin,Gerai X,2024-01-01 08:00:00,100,5\n\
              Andi,Gerai X,2024-01-01 09:00:00,50,3\n\
              Andi,Gerai X,2024-02-01 09:00:00,70,4\n",
        )
        .unwrap();
        f.flush().unwrap();
        let path = f.path().to_str().unwrap().to_string();

        let (data, _) = loader::load_incentives(&path).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let range = DateRange::from_picked(&[day]).unwrap();
        let filtered = filter_by_date(&data, &range);
        assert_eq!(filtered.len(), 2);

        let kurir = reports::courier_outlet_report(&filtered);
        assert_eq!(kurir.len(), 1);
        assert_eq!(kurir[0].courier, "Andi");
        assert_eq!(kurir[0].total_incentive, 50.0);
        assert_eq!(kurir[0].total_pickups, 3.0);

        // Superadmin still counts toward outlet-level load.
        let (top, means) = reports::top_load_report(&filtered, TopN::Ten);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].total_load, 8.0);
        assert_eq!(means.load, 8.0);

        let selected = prompt_selection_of(&kurir);
        let rows = filter_by_outlets(&kurir, &selected).unwrap();
        assert_eq!(rows.len(), 1);
    }

    fn prompt_selection_of(rows: &[CourierOutletRow]) -> BTreeSet<String> {
        // Default selection = all outlets present in the aggregate.
        rows.iter().map(|r| r.outlet.clone()).collect()
    }
}
