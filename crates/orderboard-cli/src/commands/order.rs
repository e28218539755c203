//! Order commands.

use chrono::Local;
use clap::Subcommand;
use orderboard_core::order::parse_timestamp;
use orderboard_core::{format_hours, now_ms, Board, Config, CoreError, NewOrder, Order, OrderResult};

use super::{commit, load_board, local_time, CliResult};

#[derive(Subcommand)]
pub enum OrderAction {
    /// Create a new order
    Add {
        /// Customer name
        #[arg(long, default_value = "")]
        customer: String,
        /// What has to be made
        #[arg(long, default_value = "")]
        details: String,
        /// Resource the order runs on
        #[arg(long)]
        resource: String,
        /// Start time: YYYY-MM-DDTHH:MM (local), RFC 3339 or epoch ms (default: now)
        #[arg(long)]
        start: Option<String>,
        /// Duration as decimal hours ("1.5") or H:MM ("1:30")
        #[arg(long, default_value = "1")]
        duration: String,
    },
    /// Move the due time by a number of hours
    Extend {
        /// Order ID
        id: String,
        /// Hours to add (negative to shorten)
        #[arg(long, allow_hyphen_values = true)]
        hours: f64,
    },
    /// Mark an order as completed
    Complete {
        /// Order ID
        id: String,
        /// success or fail
        #[arg(long, default_value = "success")]
        result: String,
    },
    /// Return a completed order to the active list
    Restore {
        /// Order ID
        id: String,
    },
    /// Delete an order
    Delete {
        /// Order ID
        id: String,
    },
    /// List orders
    List {
        /// Show completed orders instead of active ones
        #[arg(long)]
        completed: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one order as JSON
    Show {
        /// Order ID
        id: String,
    },
}

fn parse_start(start: Option<&str>, now: i64) -> Result<i64, String> {
    match start {
        None => Ok(now),
        Some(text) => parse_timestamp(text, &Local)
            .ok_or_else(|| format!("cannot read start time '{text}'")),
    }
}

pub async fn run(action: OrderAction) -> CliResult {
    let config = Config::load()?;
    let mut board = load_board(&config).await?;
    let now = now_ms();

    match action {
        OrderAction::Add {
            customer,
            details,
            resource,
            start,
            duration,
        } => {
            let new = NewOrder {
                customer_name: customer,
                order_details: details,
                resource,
                start_time: parse_start(start.as_deref(), now)?,
                duration,
            };
            let event = board.create_order(new, now)?;
            commit(&board, event).await?;
        }
        OrderAction::Extend { id, hours } => {
            let event = board.extend_order(&id, hours, now)?;
            commit(&board, event).await?;
        }
        OrderAction::Complete { id, result } => {
            let result: OrderResult = result.parse()?;
            let event = board.complete_order(&id, result, now)?;
            commit(&board, event).await?;
        }
        OrderAction::Restore { id } => {
            let event = board.restore_order(&id, now)?;
            commit(&board, event).await?;
        }
        OrderAction::Delete { id } => {
            let event = board.delete_order(&id, now);
            commit(&board, event).await?;
        }
        OrderAction::List { completed, json } => {
            let orders = if completed {
                board.store().list_completed()
            } else {
                board.store().list_active()
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&orders)?);
            } else if orders.is_empty() {
                println!("No orders.");
            } else {
                for order in orders {
                    println!("{}", summary_line(order, &board, now));
                }
            }
        }
        OrderAction::Show { id } => {
            let order = board
                .store()
                .get(&id)
                .ok_or_else(|| CoreError::not_found(&id))?;
            println!("{}", serde_json::to_string_pretty(order)?);
        }
    }

    Ok(())
}

fn summary_line(order: &Order, board: &Board, now: i64) -> String {
    let head = format!(
        "{}  {} | {} | {} | {} | {} -> {}",
        order.id,
        order.customer_name,
        order.order_details,
        order.resource,
        format_hours(order.duration),
        local_time(order.start_time),
        local_time(order.due_time),
    );
    if order.is_active() {
        let countdown = board.engine().countdown(order, now);
        format!("{head} | {}", countdown.label())
    } else {
        let result = order
            .result
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!("{head} | {result}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn start_defaults_to_now() {
        assert_eq!(parse_start(None, 42), Ok(42));
    }

    #[test]
    fn start_accepts_epoch_and_local_forms() {
        assert_eq!(parse_start(Some("1700000000000"), 0), Ok(1_700_000_000_000));
        let local = Local
            .with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
            .earliest()
            .unwrap()
            .timestamp_millis();
        assert_eq!(parse_start(Some("2024-03-01T09:30"), 0), Ok(local));
        assert!(parse_start(Some("soon"), 0).is_err());
    }
}
