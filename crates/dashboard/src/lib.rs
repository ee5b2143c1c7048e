//! The trainer dashboard: the list and detail views an admin browses,
//! the profile editor a trainer uses, and the sign-in screens in front
//! of both.

use accounts::{Role, Route};
use clap::{Arg, ArgAction, ArgMatches, Command};
use framework::prelude::*;
use roster::{RosterContextExt, TrainerId, TrainerRecord};
use tui::{Tui, TuiNewTabTypes, TuiPlugin};

pub mod detail_view;
pub mod links;
pub mod list_view;
pub mod profile_editor;
pub mod screens;
pub mod selection;

pub use detail_view::{DetailLine, DetailSection, DetailStyle, DetailView, SectionKind};
pub use links::{LinkOpener, Links, LinksContextExt, RecordingOpener, SystemOpener};
pub use list_view::{TrainerListView, TrainerRow};
pub use profile_editor::ProfileEditor;
pub use selection::Selection;

/// Registers the dashboard screens and the `tui`, `trainer` and
/// `profile` commands.
#[derive(Clone)]
pub struct DashboardPlugin;

impl Plugin for DashboardPlugin {
    fn build(self, context: &mut Context) -> Result<()> {
        context.add_plugin(TuiPlugin)?;
        let tab_types = context
            .get_resource_mut::<TuiNewTabTypes>()
            .ok_or(Error::new("tui plugin did not register tab types"))?;
        tab_types.register_new_tab_type::<screens::LoginTabImpl>("Sign In");
        tab_types.register_new_tab_type::<screens::RegisterTabImpl>("Register");
        tab_types.register_new_tab_type::<screens::TrainersTabImpl>("Trainers");
        tab_types.register_new_tab_type::<screens::ProfileTabImpl>("My Profile");

        context
            .add_command(
                Command::new("tui").about("Opens the terminal dashboard at the sign-in screen"),
                process_tui_command,
            )
            .add_command(
                Command::new("trainer")
                    .about("Browse trainer profiles")
                    .subcommand(Command::new("list").about("Lists every trainer"))
                    .subcommand(
                        Command::new("show")
                            .about("Shows one trainer's full profile")
                            .arg(id_arg())
                            .arg(
                                Arg::new("admin")
                                    .long("admin")
                                    .action(ArgAction::SetTrue)
                                    .help("Include the admin-only section"),
                            ),
                    )
                    .subcommand_required(true),
                process_trainer_command,
            )
            .add_command(
                Command::new("profile")
                    .about("Edit a trainer's skills and availability")
                    .arg(id_arg())
                    .subcommand(
                        Command::new("add-skill")
                            .about("Appends a skill")
                            .arg(Arg::new("skill").required(true)),
                    )
                    .subcommand(
                        Command::new("remove-skill")
                            .about("Removes a skill by exact name")
                            .arg(Arg::new("skill").required(true)),
                    )
                    .subcommand(
                        Command::new("availability")
                            .about("Replaces the availability text")
                            .arg(Arg::new("text").required(true)),
                    )
                    .subcommand_required(true),
                process_profile_command,
            );
        Ok(())
    }
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(clap::value_parser!(i64))
        .help("Trainer id")
}

fn find_trainer(context: &mut Context, matches: &ArgMatches) -> Result<TrainerRecord> {
    let id = matches
        .get_one::<i64>("id")
        .copied()
        .map(TrainerId)
        .ok_or_else(|| Error::Command("--id is required".into()))?;
    context
        .trainers()?
        .get(id)?
        .ok_or_else(|| Error::NotFound(format!("trainer {id}")))
}

fn process_tui_command(context: &mut Context, _: &ArgMatches) -> Result<CommandResponse> {
    context.add_resource(Tui::default());
    Tui::open_tab(context, screens::tab_for(Route::Login))?;
    Ok(CommandResponse::default())
}

fn process_trainer_command(context: &mut Context, matches: &ArgMatches) -> Result<CommandResponse> {
    match matches.subcommand() {
        Some(("list", _)) => {
            let records = context.trainers()?.all()?;
            if records.is_empty() {
                return Ok(CommandResponse::new("No trainers on the roster."));
            }
            Ok(CommandResponse::new(list_view::text_table(&records)))
        }
        Some(("show", sub_m)) => {
            let record = find_trainer(context, sub_m)?;
            let role = if sub_m.get_flag("admin") {
                Role::Admin
            } else {
                Role::Trainer
            };
            Ok(CommandResponse::new(
                DetailView::new(&record, role, DetailStyle::Panel).to_text(),
            ))
        }
        _ => Err(Error::Command("unknown trainer subcommand".into())),
    }
}

fn process_profile_command(context: &mut Context, matches: &ArgMatches) -> Result<CommandResponse> {
    let mut editor = ProfileEditor::new(find_trainer(context, matches)?);
    let changed = match matches.subcommand() {
        Some(("add-skill", sub_m)) => sub_m
            .get_one::<String>("skill")
            .is_some_and(|skill| editor.add_skill(skill)),
        Some(("remove-skill", sub_m)) => sub_m
            .get_one::<String>("skill")
            .is_some_and(|skill| editor.remove_skill(skill)),
        Some(("availability", sub_m)) => {
            let text = sub_m.get_one::<String>("text").cloned().unwrap_or_default();
            let changed = text.trim() != editor.availability();
            editor.set_availability(&text);
            changed
        }
        _ => return Err(Error::Command("unknown profile subcommand".into())),
    };

    if changed {
        editor.save(context.trainers()?)?;
    }
    let record = editor.record();
    Ok(CommandResponse::new(format!(
        "{}{}\nSkills: {}\nAvailability: {}",
        if changed { "" } else { "No change.\n" },
        record.name,
        record.skills.join(", "),
        record.availability
    )))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::screens::{ProfileState, TrainersState};
    use accounts::{Account, Accounts, AccountsContextExt, AccountsPlugin, LocalIdentityProvider};
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
    use ratatui::{Terminal, backend::TestBackend};
    use roster::{RosterPlugin, SeedMode, bundled_fixture, seed};
    use tui::{Tab, TabImpl, TuiContextExt, handle_event, render_tui, tab_state};

    fn context() -> Result<Context> {
        let mut context = Context::new();
        context.in_memory_db(true);
        context.add_resource(Accounts::new(
            LocalIdentityProvider::new()
                .with_account(Account::admin("admin@example.com", "admin"))?
                .with_account(Account::trainer(
                    "jane.alvarez@example.com",
                    "yoga",
                    TrainerId(1),
                ))?,
        ));
        context
            .add_plugin(DbPlugin)?
            .add_plugin(RosterPlugin)?
            .add_plugin(AccountsPlugin)?
            .add_plugin(DashboardPlugin)?;
        context.startup()?;
        seed(context.trainers()?, bundled_fixture()?, SeedMode::Replace)?;
        Ok(context)
    }

    fn key(context: &mut Context, code: KeyCode) -> Result<()> {
        handle_event(
            context,
            Event::Key(KeyEvent {
                code,
                modifiers: KeyModifiers::NONE,
                kind: KeyEventKind::Press,
                state: KeyEventState::NONE,
            }),
        )
    }

    fn type_text(context: &mut Context, text: &str) -> Result<()> {
        text.chars().try_for_each(|c| key(context, KeyCode::Char(c)))
    }

    fn screen(context: &mut Context) -> Result<String> {
        let mut terminal = Terminal::new(TestBackend::new(120, 60))?;
        terminal.draw(|frame| render_tui(context, frame))?;
        Ok(tui::buffer_text(terminal.backend().buffer()))
    }

    fn sign_in(context: &mut Context, email: &str, password: &str, admin: bool) -> Result<()> {
        context.execute("tui")?;
        type_text(context, email)?;
        key(context, KeyCode::Tab)?;
        type_text(context, password)?;
        if admin {
            key(context, KeyCode::F(2))?;
        }
        key(context, KeyCode::Enter)
    }

    fn current_tab(context: &mut Context) -> Result<usize> {
        context
            .tui()?
            .selected_tab_id()
            .ok_or(Error::new("no tab open"))
    }

    #[test]
    fn list_command_prints_every_trainer() -> Result<()> {
        let mut context = context()?;
        let text = context.execute("trainer list")?.text().unwrap_or_default();
        let names: Vec<usize> = ["Jane Alvarez", "Marcus Okafor", "Priya Raman", "Tom Becker"]
            .iter()
            .filter_map(|n| text.find(n))
            .collect();
        assert_eq!(names.len(), 4);
        assert!(names.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("$50/hr | $300/day"));
        Ok(())
    }

    #[test]
    fn show_command_projects_the_record() -> Result<()> {
        let mut context = context()?;
        let text = context.execute("trainer show --id 4 --admin")?.text().unwrap_or_default();
        insta::assert_snapshot!(text, @r"
        Trainer #4: Tom Becker

        Contact Information
          Name: Tom Becker
          Phone: +49 151 2233 4455
          Email: tom.becker@example.com
          Resume: https://example.com/resumes/tom-becker.pdf
          LinkedIn: https://linkedin.com/in/tom-becker

        Skills
          - CrossFit
          - Kettlebells

        Experience & Certifications
          Past Experience:
          Certificates:
          - CrossFit Level 2

        Pricing
          Hourly: $55
          Daily: $320

        Availability & Preferences
          Availability: Tue-Sat, 9AM-5PM
          Travel Preference: Remote
          Willing to Travel: No

        Admin Section
          Communication Score: 60/100
          Expertise Score: 75/100
          Priority: 20/100
          Red Flags:
          - Incomplete background check
          Comments:
        ");

        let plain = context.execute("trainer show --id 4")?.text().unwrap_or_default();
        assert!(!plain.contains("Admin Section"));
        assert!(matches!(context.execute("trainer show --id 99"), Err(Error::NotFound(_))));
        Ok(())
    }

    #[test]
    fn profile_commands_commit_through_the_roster() -> Result<()> {
        let mut context = context()?;
        context.execute("profile --id 1 add-skill Boxing")?;
        context.execute("profile --id 1 remove-skill Pilates")?;
        context.execute("profile --id 1 availability 'Weekends only'")?;

        let stored = context.trainers()?.get(TrainerId(1))?.ok_or(Error::new("missing"))?;
        assert_eq!(stored.skills, vec!["Yoga", "Mobility", "Boxing"]);
        assert_eq!(stored.availability, "Weekends only");

        let blank = context.execute("profile --id 1 add-skill '   '")?;
        assert!(blank.text().is_some_and(|t| t.starts_with("No change.")));
        Ok(())
    }

    #[test]
    fn admin_signs_in_to_the_dashboard() -> Result<()> {
        let mut context = context()?;
        sign_in(&mut context, "admin@example.com", "admin", true)?;
        assert_eq!(context.tui()?.tab_titles(), vec!["Trainers"]);

        key(&mut context, KeyCode::Enter)?;
        let tab_id = current_tab(&mut context)?;
        let opened = tab_state::<TrainersState>(&context, tab_id)?
            .selection
            .current()
            .map(|r| r.id);
        assert_eq!(opened, Some(TrainerId(1)));

        let text = screen(&mut context)?;
        assert!(text.contains("Admin Section"));
        assert!(text.contains("Communication Score: 90/100"));
        assert!(!text.contains("Red Flags"));

        // a newer activation replaces the open record
        key(&mut context, KeyCode::Down)?;
        key(&mut context, KeyCode::Enter)?;
        let state = tab_state::<TrainersState>(&context, tab_id)?;
        assert_eq!(state.selection.current().map(|r| r.id), Some(TrainerId(2)));

        key(&mut context, KeyCode::Esc)?;
        assert!(!tab_state::<TrainersState>(&context, tab_id)?.selection.is_open());
        Ok(())
    }

    #[test]
    fn resume_opens_through_the_link_opener() -> Result<()> {
        let mut context = context()?;
        let recorder = RecordingOpener::default();
        context.add_resource(Links::new(recorder.clone()));

        sign_in(&mut context, "admin@example.com", "admin", true)?;
        key(&mut context, KeyCode::Enter)?;
        key(&mut context, KeyCode::F(6))?;
        assert_eq!(
            recorder.opened(),
            vec!["https://example.com/resumes/jane-alvarez.pdf"]
        );
        Ok(())
    }

    #[test]
    fn wrong_password_stays_on_sign_in() -> Result<()> {
        let mut context = context()?;
        sign_in(&mut context, "admin@example.com", "nope", true)?;
        assert_eq!(context.tui()?.tab_titles(), vec!["Sign In"]);
        assert_eq!(
            context.tui()?.status(),
            Some("authentication failed: invalid email or password")
        );
        Ok(())
    }

    #[test]
    fn trainer_edits_and_saves_their_profile() -> Result<()> {
        let mut context = context()?;
        sign_in(&mut context, "jane.alvarez@example.com", "yoga", false)?;
        assert_eq!(context.tui()?.tab_titles(), vec!["My Profile"]);
        let tab_id = current_tab(&mut context)?;

        key(&mut context, KeyCode::F(2))?;
        type_text(&mut context, "Boxing")?;
        key(&mut context, KeyCode::Enter)?;
        let editor = &tab_state::<ProfileState>(&context, tab_id)?.editor;
        assert!(editor.is_editing_skills() && !editor.is_editing_availability());

        key(&mut context, KeyCode::F(5))?;
        let stored = context.trainers()?.get(TrainerId(1))?.ok_or(Error::new("missing"))?;
        assert_eq!(stored.skills.last().map(String::as_str), Some("Boxing"));
        assert!(!tab_state::<ProfileState>(&context, tab_id)?.editor.is_editing_skills());

        let text = screen(&mut context)?;
        assert!(text.contains("Boxing"));
        assert!(!text.contains("Admin Section"));
        Ok(())
    }

    #[test]
    fn registration_lands_on_the_profile_editor() -> Result<()> {
        let mut context = context()?;
        context.execute("tui")?;
        key(&mut context, KeyCode::F(3))?;
        assert_eq!(context.tui()?.tab_titles(), vec!["Register"]);

        let values = ["Ada Moss", "ada@example.com", "555 0100", "Boxing, Mobility", "3", "pw", "pw"];
        for value in values {
            type_text(&mut context, value)?;
            key(&mut context, KeyCode::Tab)?;
        }
        key(&mut context, KeyCode::Enter)?;

        assert_eq!(context.tui()?.tab_titles(), vec!["My Profile"]);
        let added = context.trainers()?.find_by_email("ada@example.com")?;
        assert_eq!(added.map(|r| r.skills), Some(vec!["Boxing".into(), "Mobility".into()]));
        Ok(())
    }

    #[test]
    fn trainers_cannot_open_the_dashboard() -> Result<()> {
        let mut context = context()?;
        sign_in(&mut context, "jane.alvarez@example.com", "yoga", false)?;
        let opened = Tui::open_tab(&mut context, Tab::of::<screens::TrainersTabImpl>());
        assert!(matches!(opened, Err(Error::Auth(_))));
        assert_eq!(context.tui()?.tab_titles(), vec!["My Profile"]);
        Ok(())
    }

    #[test]
    fn another_sign_in_tab_keeps_the_session_until_used() -> Result<()> {
        let mut context = context()?;
        sign_in(&mut context, "admin@example.com", "admin", true)?;
        let dashboard = current_tab(&mut context)?;

        Tui::open_tab(&mut context, Tab::of::<screens::LoginTabImpl>())?;
        assert_eq!(context.tui()?.tab_titles(), vec!["Trainers", "Sign In"]);
        assert_eq!(context.session().map(|s| s.role()), Some(Role::Admin));

        // signing in as a trainer there ends the admin's access
        type_text(&mut context, "jane.alvarez@example.com")?;
        key(&mut context, KeyCode::Tab)?;
        type_text(&mut context, "yoga")?;
        key(&mut context, KeyCode::Enter)?;
        assert_eq!(context.tui()?.tab_titles(), vec!["Trainers", "My Profile"]);

        let refused = screens::TrainersTabImpl::handle_key(&mut context, "select", dashboard);
        assert!(matches!(refused, Err(Error::Auth(_))));
        assert!(!tab_state::<TrainersState>(&context, dashboard)?.selection.is_open());

        handle_event(
            &mut context,
            Event::Key(KeyEvent::new(KeyCode::Left, KeyModifiers::CONTROL)),
        )?;
        assert_eq!(current_tab(&mut context)?, dashboard);
        let text = screen(&mut context)?;
        assert!(text.contains("This session has ended"));
        assert!(!text.contains("Jane Alvarez"));
        Ok(())
    }

    #[test]
    fn sign_out_key_ends_the_session() -> Result<()> {
        let mut context = context()?;
        sign_in(&mut context, "jane.alvarez@example.com", "yoga", false)?;
        key(&mut context, KeyCode::F(10))?;
        assert_eq!(context.tui()?.tab_titles(), vec!["Sign In"]);
        assert!(context.session().is_none());
        assert_eq!(context.tui()?.status(), Some("Signed out"));
        Ok(())
    }
}
