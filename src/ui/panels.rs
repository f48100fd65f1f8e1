use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::dashboard::charts::Preview;
use crate::dashboard::kpi::{format_count, format_pct, format_ratio, Kpis};
use crate::dashboard::{Section, THRESHOLD_STEP};
use crate::data::filter::FilterRange;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(table) = state.table.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(range) = state.controls.filter.age.as_mut() {
                range_sliders(ui, "Age Range", range, table.age_bounds());
                ui.separator();
            }

            if let Some(range) = state.controls.filter.income.as_mut() {
                range_sliders(ui, "Monthly Income", range, table.income_bounds());
                ui.separator();
            }

            ui.strong("Risk Threshold");
            let mut threshold = state.controls.threshold;
            let slider = egui::Slider::new(&mut threshold, 0.0..=1.0)
                .step_by(THRESHOLD_STEP)
                .fixed_decimals(2);
            if ui.add(slider).changed() {
                state.controls.set_threshold(threshold);
            }

            if !table.extra_columns.is_empty() {
                ui.separator();
                ui.checkbox(&mut state.show_extra_columns, "Show all columns in preview");
            }
        });

    // Recompute the dashboard if any control moved.
    state.refresh();
}

/// Two sliders (lower / upper end) over the observed column bounds.
fn range_sliders(
    ui: &mut Ui,
    title: &str,
    range: &mut FilterRange<i64>,
    bounds: Option<(i64, i64)>,
) {
    ui.strong(title);
    let Some((lo, hi)) = bounds else {
        ui.label("No values in this column.");
        return;
    };

    let mut min = range.min();
    let mut max = range.max();
    if ui
        .add(egui::Slider::new(&mut min, lo..=hi).text("from"))
        .changed()
    {
        range.set_min(min);
    }
    if ui
        .add(egui::Slider::new(&mut max, lo..=hi).text("to"))
        .changed()
    {
        range.set_max(max);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source_path.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dashboard.is_some(), egui::Button::new("Export dashboard…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(table), Some(d)) = (&state.table, &state.dashboard) {
            ui.label(format!(
                "{}: {} customers loaded, {} in view",
                table.source,
                format_count(table.len()),
                format_count(d.view_kpis.total_count)
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

/// The three headline metrics, each with its value for the filtered view.
pub fn kpi_row(ui: &mut Ui, kpis: &Kpis, view: &Kpis) {
    ui.columns(3, |cols| {
        metric(
            &mut cols[0],
            "Total Customers",
            format_count(kpis.total_count),
            format_count(view.total_count),
        );
        metric(
            &mut cols[1],
            "High Risk %",
            section_text(&kpis.high_risk_pct, |p| format_pct(*p)),
            section_text(&view.high_risk_pct, |p| format_pct(*p)),
        );
        metric(
            &mut cols[2],
            "Avg Debt Ratio",
            section_text(&kpis.avg_debt_ratio, |r| format_ratio(*r)),
            section_text(&view.avg_debt_ratio, |r| format_ratio(*r)),
        );
    });
}

fn section_text<T>(section: &Section<T>, fmt: impl Fn(&T) -> String) -> String {
    match section {
        Ok(v) => fmt(v),
        Err(_) => "n/a".to_string(),
    }
}

fn metric(ui: &mut Ui, title: &str, value: String, in_view: String) {
    ui.label(title);
    ui.label(RichText::new(value).size(28.0).strong());
    ui.small(format!("in view: {in_view}"));
}

// ---------------------------------------------------------------------------
// Customer preview table
// ---------------------------------------------------------------------------

/// The first rows of the filtered subset.
pub fn preview_table(ui: &mut Ui, preview: &Preview, show_extra: bool) {
    if preview.rows.is_empty() {
        ui.label("No customers match the current filters.");
        return;
    }

    let mut headers: Vec<&str> = preview.columns.iter().map(|c| c.header()).collect();
    if show_extra {
        headers.extend(preview.extra_columns.iter().map(String::as_str));
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(false)
        .columns(TableColumn::auto().at_least(90.0), headers.len())
        .header(20.0, |mut header| {
            for name in &headers {
                header.col(|ui| {
                    ui.strong(*name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, preview.rows.len(), |mut row| {
                let r = &preview.rows[row.index()];
                for column in &preview.columns {
                    row.col(|ui| {
                        ui.label(r.cell(*column));
                    });
                }
                if show_extra {
                    for cell in &r.extra {
                        row.col(|ui| {
                            ui.label(cell.as_str());
                        });
                    }
                }
            });
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open credit-risk predictions")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export dashboard")
        .add_filter("JSON", &["json"])
        .set_file_name("credit_risk_dashboard_export.json")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_dashboard(&path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
