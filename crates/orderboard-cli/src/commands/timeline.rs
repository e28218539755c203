//! Timeline commands.

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use orderboard_core::timeline::{TimelineRow, HOURS_PER_DAY};
use orderboard_core::{Config, GroupBy};
use serde_json::json;

use super::{load_board, CliResult};

#[derive(Subcommand)]
pub enum TimelineAction {
    /// Show the orders of one day as a chart
    Show {
        /// Day to show, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Row grouping: resource or customer (default from config)
        #[arg(long)]
        group_by: Option<GroupBy>,
        /// Visible hours, 4-24 (default from config)
        #[arg(long)]
        zoom: Option<u8>,
        /// Move the shown day by this many days (negative for earlier)
        #[arg(long, allow_hyphen_values = true, default_value = "0")]
        shift: i64,
        /// Step the zoom by this many hours after applying --zoom
        #[arg(long, allow_hyphen_values = true, default_value = "0")]
        zoom_step: i8,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: TimelineAction) -> CliResult {
    let config = Config::load()?;
    let mut board = load_board(&config).await?;

    match action {
        TimelineAction::Show {
            date,
            group_by,
            zoom,
            shift,
            zoom_step,
            json,
        } => {
            let view = board.view_mut();
            if let Some(date) = date {
                view.go_to(date);
            }
            if let Some(zoom) = zoom {
                view.set_zoom(zoom);
            }
            view.shift_days(shift);
            view.change_zoom(zoom_step);
            let view = *board.view();
            let group_by = group_by.unwrap_or(config.timeline.group_by);
            let rows = board.timeline(group_by, &Local)?;

            if json {
                let out = json!({
                    "date": view.date(),
                    "zoomHours": view.zoom_hours(),
                    "scaleFactor": view.scale_factor(),
                    "groupBy": group_by,
                    "rows": rows,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!(
                    "{}  (zoom {}h, grouped by {group_by})",
                    view.date(),
                    view.zoom_hours()
                );
                let cells = cells_per_hour(view.scale_factor());
                for row in &rows {
                    print_row(row, cells);
                }
            }
        }
    }
    Ok(())
}

fn cells_per_hour(scale_factor: f64) -> usize {
    (scale_factor.ceil() as usize).max(1)
}

fn label(row: &TimelineRow) -> String {
    if row.registered {
        row.key.clone()
    } else {
        format!("{} (removed)", row.key)
    }
}

fn track(row: &TimelineRow, cells_per_hour: usize) -> String {
    let width = HOURS_PER_DAY as usize * cells_per_hour;
    let mut cells = vec!['.'; width];
    for block in &row.blocks {
        let from = (block.offset_hours * cells_per_hour as f64).floor() as usize;
        let to = (block.end_hours() * cells_per_hour as f64).ceil() as usize;
        for cell in cells.iter_mut().take(to.min(width)).skip(from) {
            *cell = '#';
        }
    }
    cells.into_iter().collect()
}

fn print_row(row: &TimelineRow, cells_per_hour: usize) {
    println!("{:<16} |{}|", label(row), track(row, cells_per_hour));
    for block in &row.blocks {
        println!(
            "{:<16}   {}  {}: {}",
            "",
            block.time_range_label(&Local),
            block.customer_name,
            block.order_details
        );
    }
}
