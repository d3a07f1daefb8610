// SVG chart rendering with plotters. Each function draws one dashboard
// visual from an already-computed aggregate; nothing here filters or sums.
use crate::error::DashboardError;
use crate::types::{CourierOutletRow, LoadMeans, OutletLoadRow, OutletSlaRow};
use plotters::prelude::*;

const STEELBLUE: RGBColor = RGBColor(70, 130, 180);
const SKYBLUE: RGBColor = RGBColor(135, 206, 235);
const ORANGE: RGBColor = RGBColor(255, 165, 0);

fn chart_err<E: std::fmt::Display>(e: E) -> DashboardError {
    DashboardError::Render(e.to_string())
}

fn y_ceiling(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0f64, f64::max);
    if max <= 0.0 {
        1.0
    } else {
        max * 1.05
    }
}

/// Mean SLA per outlet as a line with point markers, one x position per
/// outlet in the aggregate's order.
pub fn sla_line_chart(path: &str, rows: &[OutletSlaRow]) -> Result<(), DashboardError> {
    let root = SVGBackend::new(path, (900, 420)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let labels: Vec<&str> = rows.iter().map(|r| r.outlet.as_str()).collect();
    let y_max = y_ceiling(rows.iter().map(|r| r.sla_mean)).max(100.0);
    let mut chart = ChartBuilder::on(&root)
        .caption("Rata-rata SLA Pickup per Gerai", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(120)
        .y_label_area_size(60)
        .build_cartesian_2d(0..rows.len() as i32, 0f64..y_max)
        .map_err(chart_err)?;
    chart
        .configure_mesh()
        .x_labels(rows.len())
        .x_label_formatter(&|i| {
            labels
                .get(*i as usize)
                .map(|s| s.to_string())
                .unwrap_or_default()
        })
        .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
        .y_desc("Rata-rata SLA (%)")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(LineSeries::new(
            rows.iter()
                .enumerate()
                .map(|(i, r)| (i as i32, r.sla_mean)),
            &BLUE,
        ))
        .map_err(chart_err)?;
    chart
        .draw_series(
            rows.iter()
                .enumerate()
                .map(|(i, r)| Circle::new((i as i32, r.sla_mean), 3, BLUE.filled())),
        )
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Courier productivity bars labeled "courier (outlet)", colored per outlet,
/// with a red reference line at the mean pickup count.
pub fn courier_bar_chart(
    path: &str,
    rows: &[CourierOutletRow],
    mean_pickups: f64,
) -> Result<(), DashboardError> {
    let root = SVGBackend::new(path, (1100, 520)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let labels: Vec<String> = rows
        .iter()
        .map(|r| format!("{} ({})", r.courier, r.outlet))
        .collect();
    let mut outlets: Vec<&str> = rows.iter().map(|r| r.outlet.as_str()).collect();
    outlets.sort();
    outlets.dedup();

    let y_max = y_ceiling(rows.iter().map(|r| r.total_pickups));
    let n = rows.len() as i32;
    let mut chart = ChartBuilder::on(&root)
        .caption("Produktivitas Kurir Setiap Gerai", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(160)
        .y_label_area_size(60)
        .build_cartesian_2d(0..n, 0f64..y_max)
        .map_err(chart_err)?;
    chart
        .configure_mesh()
        .x_labels(rows.len())
        .x_label_formatter(&|i| {
            labels
                .get(*i as usize)
                .cloned()
                .unwrap_or_default()
        })
        .x_label_style(("sans-serif", 11).into_font().transform(FontTransform::Rotate90))
        .x_desc("Kurir (Gerai)")
        .y_desc("Jumlah Pickup")
        .draw()
        .map_err(chart_err)?;

    for (i, r) in rows.iter().enumerate() {
        let color_idx = outlets.iter().position(|o| *o == r.outlet).unwrap_or(0);
        let color = Palette99::pick(color_idx);
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(i as i32, 0.0), (i as i32 + 1, r.total_pickups)],
                color.filled(),
            )))
            .map_err(chart_err)?;
    }

    chart
        .draw_series(LineSeries::new(
            [(0, mean_pickups), (n, mean_pickups)],
            RED.stroke_width(2),
        ))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Two stacked bar charts over the top-N outlets: load on top, incentive
/// below, each with its mean as a reference line.
pub fn outlet_load_charts(
    path: &str,
    rows: &[OutletLoadRow],
    means: LoadMeans,
) -> Result<(), DashboardError> {
    let root = SVGBackend::new(path, (1100, 760)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let (upper, lower) = root.split_vertically(380);

    let labels: Vec<&str> = rows.iter().map(|r| r.outlet.as_str()).collect();
    let n = rows.len() as i32;

    draw_outlet_bars(
        &upper,
        "Jumlah Load per Gerai",
        "Jumlah Load",
        &labels,
        &rows.iter().map(|r| r.total_load).collect::<Vec<_>>(),
        STEELBLUE,
        means.load,
        ORANGE,
        n,
    )?;
    draw_outlet_bars(
        &lower,
        "Total Insentif per Gerai",
        "Total Insentif",
        &labels,
        &rows.iter().map(|r| r.total_incentive).collect::<Vec<_>>(),
        SKYBLUE,
        means.incentive,
        GREEN,
        n,
    )?;

    root.present().map_err(chart_err)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_outlet_bars(
    area: &DrawingArea<SVGBackend, plotters::coord::Shift>,
    title: &str,
    y_desc: &str,
    labels: &[&str],
    values: &[f64],
    bar_color: RGBColor,
    mean: f64,
    mean_color: RGBColor,
    n: i32,
) -> Result<(), DashboardError> {
    let y_max = y_ceiling(values.iter().copied());
    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(130)
        .y_label_area_size(70)
        .build_cartesian_2d(0..n, 0f64..y_max)
        .map_err(chart_err)?;
    chart
        .configure_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|i| {
            labels
                .get(*i as usize)
                .map(|s| s.to_string())
                .unwrap_or_default()
        })
        .x_label_style(("sans-serif", 11).into_font().transform(FontTransform::Rotate90))
        .x_desc("Nama Gerai")
        .y_desc(y_desc)
        .draw()
        .map_err(chart_err)?;

    for (i, v) in values.iter().enumerate() {
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(i as i32, 0.0), (i as i32 + 1, *v)],
                bar_color.filled(),
            )))
            .map_err(chart_err)?;
    }
    chart
        .draw_series(LineSeries::new(
            [(0, mean), (n, mean)],
            mean_color.stroke_width(2),
        ))
        .map_err(chart_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charts_render_to_svg() {
        let dir = tempfile::tempdir().unwrap();

        let sla_path = dir.path().join("sla.svg");
        let sla_rows = vec![
            OutletSlaRow {
                outlet: "Gerai X".into(),
                sla_mean: 92.5,
            },
            OutletSlaRow {
                outlet: "Gerai Y".into(),
                sla_mean: 88.0,
            },
        ];
        sla_line_chart(sla_path.to_str().unwrap(), &sla_rows).unwrap();
        assert!(std::fs::metadata(&sla_path).unwrap().len() > 0);

        let kurir_path = dir.path().join("kurir.svg");
        let kurir_rows = vec![CourierOutletRow {
            courier: "Andi".into(),
            outlet: "Gerai X".into(),
            total_incentive: 1500.0,
            total_pickups: 12.0,
        }];
        courier_bar_chart(kurir_path.to_str().unwrap(), &kurir_rows, 12.0).unwrap();
        assert!(std::fs::metadata(&kurir_path).unwrap().len() > 0);

        let load_path = dir.path().join("load.svg");
        let load_rows = vec![OutletLoadRow {
            outlet: "Gerai X".into(),
            total_load: 40.0,
            total_incentive: 4000.0,
        }];
        outlet_load_charts(
            load_path.to_str().unwrap(),
            &load_rows,
            LoadMeans {
                load: 40.0,
                incentive: 4000.0,
            },
        )
        .unwrap();
        assert!(std::fs::metadata(&load_path).unwrap().len() > 0);
    }
}
