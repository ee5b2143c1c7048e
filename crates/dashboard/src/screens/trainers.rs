use super::{ensure_session, sign_out};
use crate::detail_view::{DetailStyle, DetailView};
use crate::links::LinksContextExt;
use crate::list_view::TrainerListView;
use crate::selection::Selection;
use accounts::Role;
use crossterm::event::KeyCode;
use framework::prelude::*;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::{Block, Paragraph};
use roster::RosterContextExt;
use tui::{KeyBind, TabImpl, TuiContextExt, tab_state, tab_state_mut};

/// The admin dashboard: the trainer table with its detail view.
pub struct TrainersTabImpl;

pub struct TrainersState {
    pub list: TrainerListView,
    pub selection: Selection,
    pub style: DetailStyle,
    role: Role,
    scroll: u16,
}

enum Link {
    Resume,
    LinkedIn,
}

impl TabImpl for TrainersTabImpl {
    type State = TrainersState;

    fn title() -> String {
        "Trainers".into()
    }

    fn create_state(context: &mut Context, _: usize) -> Result<TrainersState> {
        ensure_session(context, Role::Admin, None)
            .map_err(|_| Error::Auth("the trainer dashboard is for admins".into()))?;
        let records = context.trainers()?.all()?;
        Ok(TrainersState {
            list: TrainerListView::new(records),
            selection: Selection::default(),
            style: DetailStyle::default(),
            role: Role::Admin,
            scroll: 0,
        })
    }

    fn render(context: &mut Context, frame: &mut Frame, area: Rect, block: Block, tab_id: usize) {
        if ensure_session(context, Role::Admin, None).is_err() {
            frame.render_widget(
                Paragraph::new("This session has ended. Press F10 to sign in again.")
                    .block(block.title("Trainers")),
                area,
            );
            return;
        }
        let Ok(TrainersState {
            list,
            selection,
            style,
            role,
            scroll,
        }) = tab_state_mut::<TrainersState>(context, tab_id)
        else {
            return;
        };

        let title = format!("Trainers ({})", list.records().len());
        let detail = DetailView::for_selection(selection, *role, *style);
        match (&detail, *style) {
            (Some(view), DetailStyle::Panel) => {
                let [list_area, detail_area] =
                    Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                        .areas(area);
                list.render(frame, list_area, block.title(title));
                view.render(frame, detail_area, *scroll);
            }
            (Some(view), DetailStyle::Overlay) => {
                list.render(frame, area, block.title(title));
                view.render(frame, area, *scroll);
            }
            (None, _) => list.render(frame, area, block.title(title)),
        }
    }

    fn keybinds(context: &Context, tab_id: usize) -> Vec<KeyBind> {
        let open = tab_state::<TrainersState>(context, tab_id).is_ok_and(|s| s.selection.is_open());
        let mut binds = vec![
            KeyBind::new("move_up", "Up", "Up", KeyCode::Up),
            KeyBind::new("move_down", "Down", "Down", KeyCode::Down),
            KeyBind::new("select", "Enter", "View Trainer", KeyCode::Enter),
            KeyBind::new("toggle_style", "F4", "Panel/Overlay", KeyCode::F(4)),
            KeyBind::new("refresh", "F5", "Refresh", KeyCode::F(5)),
        ];
        if open {
            binds.extend([
                KeyBind::new("dismiss", "Esc", "Close", KeyCode::Esc),
                KeyBind::new("scroll_up", "PgUp", "Scroll Up", KeyCode::PageUp),
                KeyBind::new("scroll_down", "PgDn", "Scroll Down", KeyCode::PageDown),
                KeyBind::new("open_resume", "F6", "Open Resume", KeyCode::F(6)),
                KeyBind::new("open_linkedin", "F7", "Open LinkedIn", KeyCode::F(7)),
            ]);
        }
        binds.push(KeyBind::new("sign_out", "F10", "Sign Out", KeyCode::F(10)));
        binds
    }

    fn handle_key(context: &mut Context, bind_name: &str, tab_id: usize) -> Result<()> {
        if bind_name != "sign_out" {
            ensure_session(context, Role::Admin, None)?;
        }
        match bind_name {
            "move_up" => tab_state_mut::<TrainersState>(context, tab_id)?.list.move_up(),
            "move_down" => tab_state_mut::<TrainersState>(context, tab_id)?.list.move_down(),
            "select" => {
                let state = tab_state_mut::<TrainersState>(context, tab_id)?;
                if let Some(record) = state.list.activate() {
                    state.selection.select(record);
                    state.scroll = 0;
                }
            }
            "dismiss" => tab_state_mut::<TrainersState>(context, tab_id)?.selection.dismiss(),
            "scroll_up" => {
                let state = tab_state_mut::<TrainersState>(context, tab_id)?;
                state.scroll = state.scroll.saturating_sub(5);
            }
            "scroll_down" => {
                let state = tab_state_mut::<TrainersState>(context, tab_id)?;
                state.scroll = state.scroll.saturating_add(5);
            }
            "toggle_style" => {
                let state = tab_state_mut::<TrainersState>(context, tab_id)?;
                state.style = match state.style {
                    DetailStyle::Panel => DetailStyle::Overlay,
                    DetailStyle::Overlay => DetailStyle::Panel,
                };
            }
            "refresh" => refresh(context, tab_id)?,
            "open_resume" => open_link(context, tab_id, Link::Resume)?,
            "open_linkedin" => open_link(context, tab_id, Link::LinkedIn)?,
            "sign_out" => sign_out(context, tab_id)?,
            _ => {}
        }
        Ok(())
    }
}

/// Reloads the roster. An open detail view follows the stored copy of
/// its record and closes if the record is gone.
fn refresh(context: &mut Context, tab_id: usize) -> Result<()> {
    let records = context.trainers()?.all()?;
    let state = tab_state_mut::<TrainersState>(context, tab_id)?;
    if let Some(current) = state.selection.current().map(|r| r.id) {
        match records.iter().find(|r| r.id == current) {
            Some(record) => state.selection.select(record.clone()),
            None => state.selection.dismiss(),
        }
    }
    state.list.refresh(records);
    Ok(())
}

fn open_link(context: &mut Context, tab_id: usize, link: Link) -> Result<()> {
    let Some(record) = tab_state::<TrainersState>(context, tab_id)?.selection.current() else {
        return Ok(());
    };
    let (uri, what) = match link {
        Link::Resume => (record.resume.clone(), "resume"),
        Link::LinkedIn => (record.linkedin.clone(), "LinkedIn profile"),
    };
    let name = record.name.clone();
    context.open_link(&uri)?;
    context.tui()?.set_status(format!("Opened {name}'s {what}"));
    Ok(())
}
