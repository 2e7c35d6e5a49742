//! Event CRUD commands.

use chrono::{DateTime, NaiveDate, Utc};

use calgrid_protocol::{EventDraft, RangeQuery, Request, Response};

use super::{connect, print_json, unexpected};
use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::render;

/// Creates a new event.
pub async fn add(
    cli: &Cli,
    config: &ClientConfig,
    title: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    color: Option<String>,
    description: Option<String>,
) -> ClientResult<()> {
    let mut draft = EventDraft::new(title, start, end);
    if let Some(color) = color.or_else(|| config.display.default_color.clone()) {
        draft = draft.with_color(color);
    }
    if let Some(description) = description {
        draft = draft.with_description(description);
    }

    match connect(cli, config).send(Request::create_event(draft)).await? {
        Response::Event { event } => {
            if cli.json {
                print_json(&event)
            } else {
                println!("Created event {}", event.id);
                Ok(())
            }
        }
        Response::Error { error } => Err(error.into()),
        other => Err(unexpected(other)),
    }
}

/// Lists events, optionally restricted to a day window.
pub async fn list(
    cli: &Cli,
    config: &ClientConfig,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> ClientResult<()> {
    let request = match (from, to) {
        (Some(from), Some(to)) => Request::list_events_in(RangeQuery::new(from, to)),
        _ => Request::list_events(),
    };

    match connect(cli, config).send(request).await? {
        Response::Events { events } => {
            if cli.json {
                print_json(&events)
            } else {
                println!("{}", render::render_events(&events));
                Ok(())
            }
        }
        Response::Error { error } => Err(error.into()),
        other => Err(unexpected(other)),
    }
}

/// Shows a single event.
pub async fn show(cli: &Cli, config: &ClientConfig, id: String) -> ClientResult<()> {
    match connect(cli, config).send(Request::get_event(id)).await? {
        Response::Event { event } => {
            if cli.json {
                print_json(&event)
            } else {
                println!("{}", render::render_event(&event));
                Ok(())
            }
        }
        Response::Error { error } => Err(error.into()),
        other => Err(unexpected(other)),
    }
}

/// Updates an event; omitted fields keep their current value.
#[allow(clippy::too_many_arguments)]
pub async fn edit(
    cli: &Cli,
    config: &ClientConfig,
    id: String,
    title: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    color: Option<String>,
    description: Option<String>,
) -> ClientResult<()> {
    let client = connect(cli, config);

    // Fetch the current body so unset fields carry over
    let current = match client.send(Request::get_event(&id)).await? {
        Response::Event { event } => event,
        Response::Error { error } => return Err(error.into()),
        other => return Err(unexpected(other)),
    };

    let draft = EventDraft {
        title: title.unwrap_or(current.title),
        description: description.or(current.description),
        start: start.unwrap_or(current.start),
        end: end.unwrap_or(current.end),
        color: color.unwrap_or(current.color),
    };

    match client.send(Request::update_event(&id, draft)).await? {
        Response::Event { event } => {
            if cli.json {
                print_json(&event)
            } else {
                println!("Updated event {}", event.id);
                Ok(())
            }
        }
        Response::Error { error } => Err(error.into()),
        other => Err(unexpected(other)),
    }
}

/// Deletes an event.
pub async fn remove(cli: &Cli, config: &ClientConfig, id: String) -> ClientResult<()> {
    match connect(cli, config).send(Request::delete_event(&id)).await? {
        Response::Ok => {
            if cli.json {
                print_json(&serde_json::json!({ "deleted": id }))
            } else {
                println!("Deleted event {id}");
                Ok(())
            }
        }
        Response::Error { error } => Err(error.into()),
        other => Err(unexpected(other)),
    }
}
