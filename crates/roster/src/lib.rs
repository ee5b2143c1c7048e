//! The trainer roster: the `TrainerRecord` model, fixture documents
//! and the repository every view reads from.

use clap::{Arg, ArgAction, ArgMatches, Command};
use framework::prelude::*;
use std::path::PathBuf;

pub mod fixture;
pub mod record;
pub mod repository;

pub use fixture::{bundled_fixture, load_fixture, parse_fixture, to_fixture};
pub use record::{AdminMetadata, Pricing, Rate, Score, TrainerId, TrainerRecord, TravelPreference};
pub use repository::{MemoryRepository, TRAINER_TABLE, TrainerRepository, trainer_table};

/// Registers the trainer table and the `roster` command.
#[derive(Clone)]
pub struct RosterPlugin;

impl Plugin for RosterPlugin {
    fn build(self, context: &mut Context) -> Result<()> {
        context.add_table(trainer_table());
        context.add_command(
            Command::new("roster")
                .about("Load and export the trainer roster")
                .subcommand(
                    Command::new("seed")
                        .about("Loads trainers from a fixture document")
                        .arg(
                            Arg::new("fixture")
                                .long("fixture")
                                .value_parser(clap::value_parser!(PathBuf))
                                .help("Fixture file to load (defaults to the bundled sample roster)"),
                        )
                        .arg(
                            Arg::new("replace")
                                .long("replace")
                                .action(ArgAction::SetTrue)
                                .help("Overwrite records whose ids already exist"),
                        ),
                )
                .subcommand(
                    Command::new("export")
                        .about("Writes the roster as a fixture document")
                        .arg(
                            Arg::new("out-file")
                                .long("out-file")
                                .value_parser(clap::value_parser!(PathBuf))
                                .help("File to write to; prints the document when omitted"),
                        ),
                )
                .subcommand_required(true),
            process_roster_command,
        );
        Ok(())
    }
}

/// Gives `Context` access to the trainer store.
pub trait RosterContextExt {
    /// The repository backing the roster. A `MemoryRepository`
    /// resource takes precedence over the database.
    fn trainers(&mut self) -> Result<&mut dyn TrainerRepository>;
}

impl RosterContextExt for Context {
    fn trainers(&mut self) -> Result<&mut dyn TrainerRepository> {
        if self.has_resource::<MemoryRepository>() {
            return match self.get_resource_mut::<MemoryRepository>() {
                Some(memory) => Ok(memory),
                None => Err(Error::NoConnection),
            };
        }
        Ok(self.db_connection()?)
    }
}

impl_resource!(MemoryRepository);

/// How `seed` treats records whose id is already stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SeedMode {
    KeepExisting,
    Replace,
}

/// Writes `records` into the repository. Returns how many records
/// were written.
pub fn seed(
    repository: &mut dyn TrainerRepository,
    records: Vec<TrainerRecord>,
    mode: SeedMode,
) -> Result<usize> {
    let mut written = 0;
    for record in records {
        if mode == SeedMode::KeepExisting && repository.get(record.id)?.is_some() {
            continue;
        }
        repository.save(record)?;
        written += 1;
    }
    tracing::info!(written, ?mode, "seeded roster");
    Ok(written)
}

fn process_roster_command(context: &mut Context, matches: &ArgMatches) -> Result<CommandResponse> {
    match matches.subcommand() {
        Some(("seed", sub_m)) => {
            let records = match sub_m.get_one::<PathBuf>("fixture") {
                Some(path) => load_fixture(path)?,
                None => bundled_fixture()?,
            };
            let mode = if sub_m.get_flag("replace") {
                SeedMode::Replace
            } else {
                SeedMode::KeepExisting
            };
            let total = records.len();
            let written = seed(context.trainers()?, records, mode)?;
            Ok(CommandResponse::new(format!(
                "Seeded {written} of {total} trainers."
            )))
        }
        Some(("export", sub_m)) => {
            let document = to_fixture(&context.trainers()?.all()?)?;
            match sub_m.get_one::<PathBuf>("out-file") {
                Some(path) => {
                    std::fs::write(path, document)?;
                    Ok(CommandResponse::new(format!(
                        "Exported roster to {}.",
                        path.display()
                    )))
                }
                None => Ok(CommandResponse::new(document)),
            }
        }
        _ => Err(Error::Command("unknown roster subcommand".into())),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn context() -> Result<Context> {
        let mut context = Context::new();
        context.in_memory_db(true);
        context.add_plugin(DbPlugin)?.add_plugin(RosterPlugin)?;
        context.startup()?;
        Ok(context)
    }

    #[test]
    fn seed_command_loads_bundled_roster_once() -> Result<()> {
        let mut context = context()?;
        let response = context.execute("roster seed")?;
        assert_eq!(response.text().as_deref(), Some("Seeded 4 of 4 trainers."));

        let again = context.execute("roster seed")?;
        assert_eq!(again.text().as_deref(), Some("Seeded 0 of 4 trainers."));

        let replaced = context.execute("roster seed --replace")?;
        assert_eq!(replaced.text().as_deref(), Some("Seeded 4 of 4 trainers."));
        assert_eq!(context.trainers()?.len()?, 4);
        Ok(())
    }

    #[test]
    fn export_writes_a_loadable_fixture() -> Result<()> {
        let mut context = context()?;
        context.execute("roster seed")?;

        let dir = tempfile::tempdir()?;
        let out = dir.path().join("export.json");
        context.execute(&format!("roster export --out-file '{}'", out.display()))?;

        assert_eq!(load_fixture(&out)?, context.trainers()?.all()?);
        Ok(())
    }

    #[test]
    fn memory_repository_resource_takes_precedence() -> Result<()> {
        let mut context = context()?;
        context.add_resource(MemoryRepository::from_records(bundled_fixture()?));
        assert_eq!(context.trainers()?.len()?, 4);
        assert_eq!(context.db_connection()?.row_count(TRAINER_TABLE)?, 0);
        Ok(())
    }
}
