use accounts::{AccountsContextExt, Credentials, RegistrationForm, Role};
use clap::Parser;
use desk::{Cli, build_context};
use framework::prelude::*;
use roster::{RosterContextExt, TrainerId};

fn cli(args: &[&str]) -> Result<Cli> {
    Cli::try_parse_from(std::iter::once("desk").chain(args.iter().copied()))
        .map_err(|e| Error::Command(e.to_string()))
}

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.into(),
        password: password.into(),
    }
}

#[test]
fn trailing_words_become_the_command() -> Result<()> {
    let parsed = cli(&["--in-memory", "trainer", "show", "--id", "2", "--admin"])?;
    assert!(parsed.in_memory);
    assert_eq!(parsed.command_line()?, "trainer show --id 2 --admin");

    let words = ["profile", "--id", "1", "availability", "Weekends only"];
    let quoted = cli(&words)?.command_line()?;
    assert_eq!(shlex::split(&quoted), Some(words.map(String::from).to_vec()));

    assert_eq!(cli(&[])?.command_line()?, "tui");
    Ok(())
}

#[test]
fn empty_store_is_seeded_from_the_bundled_roster() -> Result<()> {
    let mut context = build_context(&cli(&["--in-memory"])?)?;
    assert_eq!(context.trainers()?.len()?, 4);

    let text = context
        .execute("trainer show --id 2 --admin")?
        .text()
        .unwrap_or_default();
    assert!(text.contains("Red Flags:\n  - Late to two sessions\n  - Missing liability waiver"));
    Ok(())
}

#[test]
fn fixture_option_replaces_the_bundled_roster() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let fixture = dir.path().join("roster.json");
    std::fs::write(
        &fixture,
        r#"{ "trainers": [ { "id": 9, "name": "Lee Park", "travelPreference": "Remote" } ] }"#,
    )?;

    let mut context = build_context(&cli(&[
        "--in-memory",
        "--fixture",
        fixture.to_str().ok_or(Error::new("temp path is not utf-8"))?,
    ])?)?;
    let all = context.trainers()?.all()?;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, TrainerId(9));
    assert!(!all[0].willing_to_travel());
    Ok(())
}

#[test]
fn accounts_come_from_the_options() -> Result<()> {
    let mut context = build_context(&cli(&[
        "--in-memory",
        "--admin-password",
        "hunter2",
        "--trainer-password",
        "train",
    ])?)?;

    let admin = context.sign_in(&credentials("admin@example.com", "hunter2"), Role::Admin)?;
    assert_eq!(admin.role(), Role::Admin);

    let priya = context.sign_in(&credentials("priya.raman@example.com", "train"), Role::Trainer)?;
    assert_eq!(priya.trainer(), Some(TrainerId(3)));
    assert!(matches!(
        context.sign_in(&credentials("priya.raman@example.com", "train"), Role::Admin),
        Err(Error::Auth(_))
    ));
    Ok(())
}

#[test]
fn no_admin_password_means_no_admin() -> Result<()> {
    let mut context = build_context(&cli(&["--in-memory"])?)?;
    let refused = context.sign_in(&credentials("admin@example.com", ""), Role::Admin);
    assert!(matches!(refused, Err(Error::Auth(_))));
    Ok(())
}

#[test]
fn registration_cannot_claim_a_rostered_trainer() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db = dir.path().join("trainers.db");
    let db = db.to_str().ok_or(Error::new("temp path is not utf-8"))?;

    {
        let mut context = build_context(&cli(&["--db", db])?)?;
        let form = RegistrationForm {
            full_name: "Impostor".into(),
            email: "jane.alvarez@example.com".into(),
            phone: "555".into(),
            specialization: "Yoga".into(),
            experience: "2".into(),
            password: "mine".into(),
            confirm_password: "mine".into(),
        };
        assert!(matches!(context.register_trainer(&form), Err(Error::Validation(_))));
    }

    let mut context = build_context(&cli(&["--db", db, "--trainer-password", "pw"])?)?;
    assert_eq!(context.trainers()?.len()?, 4);
    let session = context.sign_in(&credentials("jane.alvarez@example.com", "pw"), Role::Trainer)?;
    assert_eq!(session.trainer(), Some(TrainerId(1)));
    Ok(())
}

#[test]
fn profile_edits_survive_a_restart() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db = dir.path().join("trainers.db");
    let db = db.to_str().ok_or(Error::new("temp path is not utf-8"))?;

    {
        let mut context = build_context(&cli(&["--db", db])?)?;
        context.execute("profile --id 1 add-skill Boxing")?;
        context.execute("profile --id 1 availability 'Evenings'")?;
    }

    let mut context = build_context(&cli(&["--db", db])?)?;
    assert_eq!(context.trainers()?.len()?, 4);
    let jane = context
        .trainers()?
        .get(TrainerId(1))?
        .ok_or(Error::new("trainer 1 missing"))?;
    assert_eq!(jane.skills.last().map(String::as_str), Some("Boxing"));
    assert_eq!(jane.availability, "Evenings");
    Ok(())
}

#[test]
fn parse_failures_are_command_errors() -> Result<()> {
    let mut context = build_context(&cli(&["--in-memory"])?)?;
    assert!(matches!(context.execute("trainer frobnicate"), Err(Error::Command(_))));
    assert!(matches!(context.execute("profile add-skill Yoga"), Err(Error::Command(_))));
    Ok(())
}

#[cfg(feature = "db_commands")]
#[test]
fn backup_copies_the_roster() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let backup = dir.path().join("backup.db");
    let mut context = build_context(&cli(&["--in-memory"])?)?;
    context.execute(&format!("db backup --out-file '{}'", backup.display()))?;

    let backup = backup.to_str().ok_or(Error::new("temp path is not utf-8"))?;
    let mut restored = build_context(&cli(&["--db", backup])?)?;
    assert_eq!(restored.trainers()?.len()?, 4);
    Ok(())
}
