//! The terminal screens. A screen that sends the user elsewhere
//! replaces its own tab with the destination.
use accounts::{AccountsContextExt, Role, Route};
use framework::prelude::*;
use ratatui::style::{Color, Style};
use ratatui::widgets::Block;
use roster::TrainerId;
use tui::{Tab, TextArea, Tui, TuiContextExt};

mod login;
mod profile;
mod register;
mod trainers;

pub use login::{LoginState, LoginTabImpl};
pub use profile::{ProfileState, ProfileTabImpl};
pub use register::{RegisterState, RegisterTabImpl};
pub use trainers::{TrainersState, TrainersTabImpl};

/// The tab that shows `route`.
pub fn tab_for(route: Route) -> Tab {
    match route {
        Route::Login => Tab::of::<LoginTabImpl>(),
        Route::Register => Tab::of::<RegisterTabImpl>(),
        Route::ProfileEditor => Tab::of::<ProfileTabImpl>(),
        Route::Dashboard => Tab::of::<TrainersTabImpl>(),
    }
}

/// Replaces the tab `tab_id` with the screen for `route`.
pub fn navigate(context: &mut Context, tab_id: usize, route: Route) -> Result<()> {
    tracing::debug!(?route, tab_id, "navigating");
    Tui::replace_tab(context, tab_id, tab_for(route))
}

/// Fails unless the active session holds `role`, and for a trainer,
/// belongs to `trainer`. Another tab may have signed in or out since
/// this screen opened.
fn ensure_session(context: &Context, role: Role, trainer: Option<TrainerId>) -> Result<()> {
    match context.session() {
        Some(session)
            if session.role() == role && (trainer.is_none() || session.trainer() == trainer) =>
        {
            Ok(())
        }
        Some(_) => Err(Error::Auth(format!("this screen needs the {role} who opened it"))),
        None => Err(Error::Auth("nobody is signed in".into())),
    }
}

/// Ends the session and shows the Sign In screen in tab `tab_id`.
fn sign_out(context: &mut Context, tab_id: usize) -> Result<()> {
    context.sign_out();
    navigate(context, tab_id, Route::Login)?;
    context.tui()?.set_status("Signed out");
    Ok(())
}

fn set_focused(field: &mut TextArea, title: &str, focused: bool) {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    field.set_block(Block::bordered().title(title.to_string()).border_style(style));
    field.set_cursor_style(if focused {
        Style::default().bg(Color::White)
    } else {
        Style::default()
    });
}
