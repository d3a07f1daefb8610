use crate::types::RenderSummary;
use tabled::{settings::Style, Table, Tabled};

/// Print one dashboard table in full, markdown style, with a title and an
/// optional parenthesized note (usually the date range).
pub fn print_table<T>(title: &str, note: Option<&str>, rows: &[T])
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(rows.to_vec()).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// One-line JSON summary of the filtered range, printed after a render.
pub fn print_summary(summary: &RenderSummary) {
    match serde_json::to_string(summary) {
        Ok(s) => println!("Summary: {}\n", s),
        Err(e) => eprintln!("Summary serialization error: {}\n", e),
    }
}
