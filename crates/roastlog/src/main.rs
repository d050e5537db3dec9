//! `roastlog` - CLI for the coffee roast logger

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;

use roastlog::cli::{
    render, Cli, Command, ConfigCommand, LogCommand, RoastCommand, SessionCommand, TemplateCommand,
};
use roastlog::console::{roast_pending_session, ConsoleSettings};
use roastlog::setup::{create_template, find_template, initiate_session, list_templates};
use roastlog::{init_logging, Config, LogViewer, Repository, Storage};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    // these must work while the config file is broken
    match &cli.command {
        Command::Config(ConfigCommand::Path) => {
            println!("{}", Config::default_config_path().display());
            return Ok(());
        }
        Command::Config(ConfigCommand::Validate { file }) => {
            let path = file
                .clone()
                .or_else(|| cli.config.clone())
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
            return Ok(());
        }
        _ => {}
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    if let Command::Config(ConfigCommand::Show { json }) = cli.command {
        return show_config(&config, json);
    }

    let db_path = config.database_path();
    let storage = Storage::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    match cli.command {
        Command::Template(cmd) => handle_template(&storage, &cmd),
        Command::Session(cmd) => handle_session(&storage, cmd),
        Command::Roast(cmd) => handle_roast(&config, &storage, &cmd),
        Command::Log(cmd) => handle_log(&storage, cmd),
        Command::Status(cmd) => handle_status(&config, &storage, cmd.json),
        Command::Config(_) => Ok(()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_template(storage: &Storage, cmd: &TemplateCommand) -> anyhow::Result<()> {
    match cmd {
        TemplateCommand::Add { json, .. } => {
            let draft = cmd.draft().context("template draft")?;
            let template = create_template(storage, draft)?;
            if *json {
                print_json(&template)?;
            } else {
                println!("created template {} ({})", template.name, template.id);
            }
        }
        TemplateCommand::List { json } => {
            let templates = list_templates(storage)?;
            if *json {
                print_json(&templates)?;
            } else {
                print!("{}", render::templates(&templates));
            }
        }
    }
    Ok(())
}

fn handle_session(storage: &Storage, cmd: SessionCommand) -> anyhow::Result<()> {
    match cmd {
        SessionCommand::Start(args) => {
            let template_id = match args.template.as_deref() {
                Some(key) => Some(
                    find_template(storage, key)?.map_or_else(|| key.to_string(), |t| t.id),
                ),
                None => None,
            };
            let session = initiate_session(storage, args.draft(template_id))?;
            if args.json {
                print_json(&session)?;
            } else {
                print!("{}", render::session(&session));
                println!();
                println!("ready; run `roastlog roast` to start the clock");
            }
        }
        SessionCommand::Show { json } => match storage.pending_session()? {
            Some(session) if json => print_json(&session)?,
            Some(session) => print!("{}", render::session(&session)),
            None if json => println!("null"),
            None => println!("no pending session"),
        },
        SessionCommand::Clear => {
            if storage.clear_pending_session()? {
                println!("pending session discarded");
            } else {
                println!("no pending session");
            }
        }
    }
    Ok(())
}

fn handle_roast(config: &Config, storage: &Storage, cmd: &RoastCommand) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(factor) = cmd.accelerate {
        config.timer.acceleration = factor;
        config.validate()?;
    }
    if cmd.auto_advance {
        config.selector.auto_advance = true;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the roast timer runtime")?;

    let saved = runtime.block_on(roast_pending_session(
        storage,
        config.controller_options(),
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
        ConsoleSettings::from_config(&config),
    ))?;

    match saved {
        Some(log) => info!(id = %log.id, "Roast stored"),
        None => println!("roast not saved; the pending session was kept"),
    }
    Ok(())
}

fn handle_log(storage: &Storage, cmd: LogCommand) -> anyhow::Result<()> {
    let viewer = LogViewer::new(storage);
    match cmd {
        LogCommand::List { json } => {
            let listings = viewer.list()?;
            if json {
                print_json(&listings)?;
            } else {
                print!("{}", render::log_list(&listings));
            }
        }
        LogCommand::Show { id, json } => {
            let Some(view) = viewer.open(&id)? else {
                bail!("record not found: {id}");
            };
            if json {
                print_json(&view)?;
            } else {
                print!("{}", render::log_view(&view));
            }
        }
        LogCommand::Chart { id, json } => {
            let Some(view) = viewer.open(&id)? else {
                bail!("record not found: {id}");
            };
            if json {
                print_json(&view.chart)?;
            } else {
                print!("{}", render::chart(&view.chart));
            }
        }
        LogCommand::Delete { id } => {
            if viewer.delete(&id)? {
                println!("deleted {id}");
            } else {
                bail!("record not found: {id}");
            }
        }
    }
    Ok(())
}

fn handle_status(config: &Config, storage: &Storage, json: bool) -> anyhow::Result<()> {
    let stats = storage.stats()?;
    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "templates": stats.total_templates,
            "roast_logs": stats.total_logs,
            "pending_session": stats.has_pending_session,
            "newest_log": stats.newest_log,
            "db_size_bytes": stats.db_size_bytes,
        });
        print_json(&status)?;
    } else {
        println!("roastlog status");
        println!("---------------");
        println!("Database:        {}", config.database_path().display());
        println!("Size:            {} bytes", stats.db_size_bytes);
        println!("Templates:       {}", stats.total_templates);
        println!("Saved roasts:    {}", stats.total_logs);
        println!(
            "Pending session: {}",
            if stats.has_pending_session { "yes" } else { "no" }
        );
        if let Some(newest) = stats.newest_log {
            println!("Last roast:      {}", newest.format("%Y-%m-%d %H:%M"));
        }
    }
    Ok(())
}

fn show_config(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(config);
    }
    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("[Storage]");
    println!("  Database path:     {}", config.database_path().display());
    println!();
    println!("[Timer]");
    println!("  Tick interval:     {} ms", config.timer.tick_interval_ms);
    println!("  Acceleration:      {}x", config.timer.acceleration);
    println!("  Notice timeout:    {} ms", config.timer.notice_timeout_ms);
    println!("  Status every:      {} s", config.timer.status_every_secs);
    println!();
    println!("[Selector]");
    println!("  Auto-advance:      {}", config.selector.auto_advance);
    println!("  Advance table:     {} rows", config.selector.advance_table.len());
    Ok(())
}
