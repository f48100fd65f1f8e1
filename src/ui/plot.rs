use eframe::egui::{Align2, Color32, RichText, ScrollArea, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoint, Points, Text, VLine,
};

use crate::color;
use crate::dashboard::charts::{FunnelChart, IncomeBoxPlot, ProbabilityHistogram};
use crate::dashboard::kpi::format_count;
use crate::dashboard::stats::BoxSummary;
use crate::dashboard::{Dashboard, SectionError};
use crate::state::AppState;
use crate::ui::panels;

const CHART_HEIGHT: f32 = 320.0;
const MARGINAL_HEIGHT: f32 = 110.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the whole dashboard in the central panel.
pub fn dashboard_view(ui: &mut Ui, state: &AppState) {
    let dashboard = match &state.dashboard {
        Some(d) => d,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                let text = state
                    .status_message
                    .clone()
                    .unwrap_or_else(|| "Open a prediction file to begin  (File → Open…)".to_string());
                ui.heading(text);
            });
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(RichText::new("Credit Risk Prediction").size(26.0));
            ui.add_space(8.0);
            panels::kpi_row(ui, &dashboard.kpis, &dashboard.view_kpis);
            ui.separator();

            sections(ui, dashboard, state.show_extra_columns);
        });
}

fn sections(ui: &mut Ui, d: &Dashboard, show_extra: bool) {
    ui.heading("Risk Segmentation");
    match &d.funnel {
        Ok(chart) => funnel_chart(ui, chart),
        Err(e) => unavailable(ui, e),
    }
    ui.add_space(12.0);

    ui.heading("Default Probability Distribution");
    match &d.histogram {
        Ok(hist) => probability_chart(ui, hist),
        Err(e) => unavailable(ui, e),
    }
    ui.add_space(12.0);

    ui.heading("Income Distribution Across Risk Bands");
    match &d.income {
        Ok(plot) => income_chart(ui, plot),
        Err(e) => unavailable(ui, e),
    }
    ui.add_space(12.0);

    ui.heading("Customer Insights");
    panels::preview_table(ui, &d.preview, show_extra);
}

fn unavailable(ui: &mut Ui, err: &SectionError) {
    ui.label(RichText::new(format!("Section unavailable: {err}")).color(Color32::ORANGE));
}

fn no_matches(ui: &mut Ui) {
    ui.label("No customers match the current filters.");
}

// ---------------------------------------------------------------------------
// Funnel: customers per risk band
// ---------------------------------------------------------------------------

/// Centred horizontal bars, first band on top.
fn funnel_chart(ui: &mut Ui, chart: &FunnelChart) {
    ui.label("Customer classification according to defined risk categories");
    if chart.stages.is_empty() {
        no_matches(ui);
    } else {
        let n = chart.stages.len();
        Plot::new("risk_funnel")
            .legend(Legend::default())
            .height(CHART_HEIGHT)
            .show_axes([true, false])
            .x_axis_label("Count")
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                for (i, stage) in chart.stages.iter().enumerate() {
                    let y = (n - 1 - i) as f64;
                    let value = stage.count as f64;
                    let bar = Bar::new(y, value)
                        .base_offset(-value / 2.0)
                        .name(stage.band.label())
                        .fill(color::band_color(stage.band));
                    let bars = BarChart::new(vec![bar])
                        .name(stage.band.label())
                        .color(color::band_color(stage.band))
                        .width(0.8)
                        .horizontal();
                    plot_ui.bar_chart(bars);
                    plot_ui.text(
                        Text::new(PlotPoint::new(0.0, y), format_count(stage.count))
                            .color(Color32::BLACK),
                    );
                }
            });
    }

    if chart.unclassified > 0 {
        ui.small(format!(
            "{} customers in view have a missing or out-of-range probability and are not shown.",
            format_count(chart.unclassified)
        ));
    }
}

// ---------------------------------------------------------------------------
// Probability histogram with marginal boxes
// ---------------------------------------------------------------------------

fn probability_chart(ui: &mut Ui, hist: &ProbabilityHistogram) {
    ui.label("Distribution analysis of projected default probabilities");
    let Some(edges) = hist.edges else {
        no_matches(ui);
        return;
    };

    // Marginal: one horizontal box per risk label.
    Plot::new("probability_marginal")
        .height(MARGINAL_HEIGHT)
        .show_axes([false, false])
        .include_x(edges.start)
        .include_x(edges.end)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (row, part) in hist.partitions.iter().enumerate() {
                let c = color::label_color(part.label);
                let (boxes, outliers) =
                    box_elements(row as f64, &part.summary, part.label.label(), c, c, true);
                plot_ui.box_plot(boxes);
                if let Some(points) = outliers {
                    plot_ui.points(points.color(c));
                }
            }
        });

    let width = edges.width();
    Plot::new("probability_histogram")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Predicted_Probability")
        .y_axis_label("count")
        .include_x(edges.start)
        .include_x(edges.end)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let mut stacked: Vec<BarChart> = Vec::new();
            for part in &hist.partitions {
                let fill = color::translucent(color::label_color(part.label), color::HISTOGRAM_OPACITY);
                let bars = part
                    .counts
                    .iter()
                    .enumerate()
                    .map(|(i, &count)| Bar::new(edges.center(i), count as f64).fill(fill))
                    .collect();
                let below: Vec<&BarChart> = stacked.iter().collect();
                let chart = BarChart::new(bars)
                    .name(part.label.label())
                    .color(fill)
                    .width(width)
                    .stack_on(&below);
                stacked.push(chart);
            }
            for chart in stacked {
                plot_ui.bar_chart(chart);
            }
            plot_ui.vline(
                VLine::new(hist.threshold)
                    .name(format!("threshold {:.2}", hist.threshold))
                    .color(Color32::GRAY),
            );
        });
}

// ---------------------------------------------------------------------------
// Income box plot per risk band
// ---------------------------------------------------------------------------

fn income_chart(ui: &mut Ui, plot: &IncomeBoxPlot) {
    ui.label("Income patterns segmented by customer risk bands");
    if plot.groups.is_empty() {
        no_matches(ui);
        return;
    }

    Plot::new("income_by_band")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("RiskBand")
        .y_axis_label("MonthlyIncome")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for group in &plot.groups {
                let x = group.band.index() as f64;
                let (boxes, outliers) = box_elements(
                    x,
                    &group.summary,
                    group.band.label(),
                    color::band_color(group.band),
                    color::band_fill(group.band),
                    false,
                );
                plot_ui.box_plot(boxes);
                if let Some(points) = outliers {
                    plot_ui.points(points.color(color::band_color(group.band)));
                }
                plot_ui.text(
                    Text::new(PlotPoint::new(x, group.summary.lower_whisker), group.band.label())
                        .anchor(Align2::CENTER_TOP),
                );
            }
        });
}

/// One box element plus its outlier points at position `at`.
fn box_elements(
    at: f64,
    summary: &BoxSummary,
    name: &str,
    stroke: Color32,
    fill: Color32,
    horizontal: bool,
) -> (BoxPlot, Option<Points<'static>>) {
    let spread = BoxSpread::new(
        summary.lower_whisker,
        summary.q1,
        summary.median,
        summary.q3,
        summary.upper_whisker,
    );
    let elem = BoxElem::new(at, spread)
        .name(name)
        .fill(fill)
        .stroke(Stroke::new(1.5, stroke))
        .box_width(0.6)
        .whisker_width(0.4);
    let mut boxes = BoxPlot::new(vec![elem]).name(name).color(stroke);
    if horizontal {
        boxes = boxes.horizontal();
    }

    let outliers = (!summary.outliers.is_empty()).then(|| {
        let pts: Vec<[f64; 2]> = summary
            .outliers
            .iter()
            .map(|&v| if horizontal { [v, at] } else { [at, v] })
            .collect();
        Points::new(pts).radius(2.0)
    });
    (boxes, outliers)
}
