use std::process::ExitCode;

mod controller;
mod domain;
mod engine;
mod fetch;
mod inputter;
mod model;
mod ui;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use controller::Controller;
use domain::{DGConfig, DGError, default_columns, parse_columns};
use model::{Model, Status};

#[derive(Parser, Debug)]
#[command(name = "dg", version, about)]
struct Cli {
    /// URL of the record source, a JSON array or an envelope holding one.
    #[arg(default_value = "https://jsonplaceholder.typicode.com/comments")]
    url: String,

    /// Comma separated column specs, "key[:display][:nosort]".
    #[arg(long)]
    columns: Option<String>,

    /// Initial page size.
    #[arg(long, default_value_t = engine::DEFAULT_PAGE_SIZE)]
    page_size: usize,
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

// The terminal owns stdout, logs go to a file next to the binary.
fn init_tracing() -> Result<(), DGError> {
    let logfile = std::fs::File::create("dg.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::sync::Arc::new(logfile))
        .with_ansi(false)
        .init();
    Ok(())
}

fn config_from(cli: Cli) -> Result<DGConfig, DGError> {
    if !engine::PAGE_SIZES.contains(&cli.page_size) {
        return Err(DGError::InvalidArgument(format!(
            "page size {} is not one of {:?}",
            cli.page_size,
            engine::PAGE_SIZES
        )));
    }
    let columns = match cli.columns {
        Some(spec) => parse_columns(&spec).map_err(DGError::InvalidArgument)?,
        None => default_columns(),
    };
    Ok(DGConfig {
        url: cli.url,
        columns,
        page_size: cli.page_size,
        event_poll_time: 100,
    })
}

fn run() -> Result<(), DGError> {
    let cli = Cli::parse();
    init_tracing()?;
    info!("Starting dg!");

    let config = config_from(cli)?;
    let controller = Controller::new(&config);
    let mut model = Model::init(config);
    model.refresh();

    let mut terminal = ratatui::init();
    while model.status != Status::QUITTING {
        // Apply any fetch that completed since the last tick.
        model.poll_fetch();

        terminal.draw(|frame| ui::draw(model.get_uidata(), frame))?;

        if let Some(message) = controller.handle_event(&model)? {
            model.update(message);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(page_size: usize, columns: Option<&str>) -> Cli {
        Cli {
            url: "http://localhost/records".to_string(),
            columns: columns.map(str::to_string),
            page_size,
        }
    }

    #[test]
    fn page_size_outside_the_enumerated_set_is_rejected() {
        assert!(matches!(
            config_from(cli(37, None)),
            Err(DGError::InvalidArgument(_))
        ));
        assert!(config_from(cli(20, None)).is_ok());
    }

    #[test]
    fn column_overrides_replace_the_defaults() {
        let config = config_from(cli(10, Some("id:ID,body:Body:nosort"))).unwrap();
        assert_eq!(config.columns.len(), 2);
        assert!(!config.columns[1].sortable);
    }
}
