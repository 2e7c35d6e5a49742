//! Month grid command.

use chrono::{Datelike, NaiveDate, Utc};

use calgrid_protocol::{Request, Response};

use super::{connect, print_json, unexpected};
use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::render;

/// Shows the month grid, defaulting to the current UTC month.
pub async fn show(
    cli: &Cli,
    config: &ClientConfig,
    year: Option<i32>,
    month: Option<u32>,
    selected: Option<NaiveDate>,
    limit: Option<usize>,
) -> ClientResult<()> {
    let (year, month) = match (year, month) {
        (Some(year), Some(month)) => (year, month),
        _ => {
            let today = Utc::now().date_naive();
            (today.year(), today.month())
        }
    };

    let request = Request::MonthGrid {
        year,
        month,
        selected_day: selected,
        display_limit: limit.or(config.display.display_limit),
    };

    match connect(cli, config).send(request).await? {
        Response::Grid { grid } => {
            if cli.json {
                print_json(&grid)
            } else {
                println!("{}", render::render_grid(&grid));
                Ok(())
            }
        }
        Response::Error { error } => Err(error.into()),
        other => Err(unexpected(other)),
    }
}
