//! A plugin that adds commands for inspecting and maintaining the
//! database.
use clap::{Arg, ArgMatches, Command};
use framework::prelude::*;
use ratatui::{
    Frame,
    layout::Rect,
    widgets::{Block, Paragraph},
};
use std::path::PathBuf;
use tabled::builder::Builder as TabledBuilder;
use tui::{KeyBind, TabImpl, TuiNewTabTypes, TuiPlugin};

#[derive(Clone)]
pub struct DbCommandsPlugin;

impl Plugin for DbCommandsPlugin {
    fn build(self, context: &mut Context) -> Result<()> {
        context.add_command(
            Command::new("db")
                .about("View and maintain the database")
                .subcommand(Command::new("info").about("Prints information about the database"))
                .subcommand(Command::new("erase").about("Erases the database"))
                .subcommand(
                    Command::new("backup")
                        .about("Copies the database to a new file")
                        .arg(
                            Arg::new("out-file")
                                .long("out-file")
                                .required(true)
                                .value_parser(clap::value_parser!(PathBuf))
                                .help("File path to copy the database to (will be overwritten)"),
                        ),
                )
                .subcommand_required(true),
            process_db_command,
        );

        context.add_plugin(TuiPlugin)?;
        context
            .get_resource_mut::<TuiNewTabTypes>()
            .ok_or(Error::new("tui plugin did not register tab types"))?
            .register_new_tab_type::<DbInfoTabImpl>("Database Info");
        Ok(())
    }
}

fn process_db_command(context: &mut Context, matches: &ArgMatches) -> Result<CommandResponse> {
    match matches.subcommand() {
        Some(("info", _)) => Ok(CommandResponse::new(db_info(context.db_connection()?)?)),
        Some(("erase", _)) => {
            context.db_connection()?.delete_db()?;
            Ok(CommandResponse::new("Database erased."))
        }
        Some(("backup", sub_m)) => {
            let out_file = sub_m
                .get_one::<PathBuf>("out-file")
                .ok_or_else(|| Error::Command("--out-file is required".into()))?;
            context.db_connection()?.backup_to(out_file)?;
            tracing::info!(path = %out_file.display(), "backed up database");
            Ok(CommandResponse::new(format!(
                "Backed up database to {}.",
                out_file.display()
            )))
        }
        _ => Err(Error::Command("unknown db subcommand".into())),
    }
}

/// Describes the connection and the row count of every table.
fn db_info(db_connection: &DbConnection) -> Result<String> {
    if !db_connection.is_open() {
        return Ok("No database connection open.".into());
    }

    let mut text = String::from("Database connection open.\n");
    match db_connection.db_path() {
        Some(db_path) => text += &format!("Database path: {}\n", db_path.display()),
        None => text += "No database path (in-memory connection)\n",
    }

    let mut builder = TabledBuilder::default();
    builder.push_record(["Table", "Rows"]);
    for table in db_connection.tables() {
        let rows = db_connection.row_count(table.table_name())?;
        builder.push_record([table.table_name().to_string(), rows.to_string()]);
    }
    text += &builder.build().to_string();
    Ok(text)
}

struct DbInfoTabImpl;

impl TabImpl for DbInfoTabImpl {
    type State = ();

    fn title() -> String {
        "Database Info".into()
    }

    fn create_state(_: &mut Context, _: usize) -> Result<()> {
        Ok(())
    }

    fn render(context: &mut Context, frame: &mut Frame, area: Rect, block: Block, _: usize) {
        let text = match context.db_connection() {
            Ok(db_connection) => db_info(db_connection).unwrap_or_else(|e| e.to_string()),
            Err(e) => e.to_string(),
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
    }

    // read fresh on every draw, so there is nothing to bind
    fn keybinds(_: &Context, _: usize) -> Vec<KeyBind> {
        Vec::new()
    }

    fn handle_key(_: &mut Context, _: &str, _: usize) -> Result<()> {
        Ok(())
    }
}
