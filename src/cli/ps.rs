//! Handler for the `ps` command.

use tabled::{Table, Tabled};

use crate::cli::{output, PsArgs};
use crate::config::Config;
use crate::error::Result;
use crate::lifecycle::{LifecycleController, ListOptions, PodRow};
use crate::runtime::create_backend;

#[derive(Tabled)]
struct NarrowRow {
    #[tabled(rename = "APPLICATION NAME")]
    application: String,
    #[tabled(rename = "POD NAME")]
    name: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct WideRow {
    #[tabled(rename = "APPLICATION NAME")]
    application: String,
    #[tabled(rename = "POD ID")]
    id: String,
    #[tabled(rename = "POD NAME")]
    name: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "CREATED")]
    age: String,
    #[tabled(rename = "EXPOSED")]
    ports: String,
    #[tabled(rename = "CONTAINERS")]
    containers: String,
}

/// List running applications.
pub async fn execute(config: &Config, args: PsArgs) -> Result<()> {
    let backend = create_backend(config)?;
    let wide = args.is_wide();

    let rows = LifecycleController::new(backend)
        .list(&ListOptions {
            application: args.name,
            wide,
        })
        .await?;

    if rows.is_empty() {
        output::note("No applications found");
        return Ok(());
    }

    let table = if wide {
        Table::new(rows.into_iter().map(wide_row)).to_string()
    } else {
        Table::new(rows.into_iter().map(narrow_row)).to_string()
    };
    println!("{table}");

    Ok(())
}

fn narrow_row(row: PodRow) -> NarrowRow {
    NarrowRow {
        application: row.application,
        name: row.name,
        status: row.status,
    }
}

fn wide_row(row: PodRow) -> WideRow {
    WideRow {
        application: row.application,
        id: row.id,
        name: row.name,
        status: row.status,
        age: row.age,
        ports: row.ports,
        containers: row.containers,
    }
}
