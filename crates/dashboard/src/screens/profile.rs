use super::{ensure_session, set_focused, sign_out};
use crate::detail_view::{DetailStyle, DetailView};
use crate::profile_editor::ProfileEditor;
use accounts::{AccountsContextExt, Role};
use crossterm::event::KeyCode;
use framework::prelude::*;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::Line;
use ratatui::widgets::{Block, HighlightSpacing, List, ListState, Paragraph};
use roster::RosterContextExt;
use tui::{CursorMove, Input, KeyBind, TabImpl, TextArea, TuiContextExt, tab_state, tab_state_mut, text_field, text_field_with};

const NEW_SKILL: &str = "New Skill";
const AVAILABILITY: &str = "Availability";

/// A trainer editing their own skills and availability.
pub struct ProfileTabImpl;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Focus {
    Skills,
    Availability,
}

pub struct ProfileState {
    pub editor: ProfileEditor,
    skill_input: TextArea<'static>,
    availability_input: TextArea<'static>,
    skills: ListState,
    focus: Focus,
}

impl ProfileState {
    fn focus_on(&mut self, focus: Focus) {
        self.focus = focus;
        set_focused(&mut self.skill_input, NEW_SKILL, focus == Focus::Skills);
        set_focused(
            &mut self.availability_input,
            AVAILABILITY,
            focus == Focus::Availability,
        );
    }

    /// The focused input, if its edit mode is on.
    fn active_input(&mut self) -> Option<&mut TextArea<'static>> {
        match self.focus {
            Focus::Skills if self.editor.is_editing_skills() => Some(&mut self.skill_input),
            Focus::Availability if self.editor.is_editing_availability() => {
                Some(&mut self.availability_input)
            }
            _ => None,
        }
    }

    fn toggle_skills(&mut self) {
        self.editor.toggle_skills_edit();
        if self.editor.is_editing_skills() {
            self.skill_input = text_field(NEW_SKILL, false);
            self.focus_on(Focus::Skills);
        } else if self.editor.is_editing_availability() {
            self.focus_on(Focus::Availability);
        }
    }

    fn toggle_availability(&mut self) {
        self.editor.toggle_availability_edit();
        if self.editor.is_editing_availability() {
            self.availability_input = text_field_with(AVAILABILITY, self.editor.availability());
            self.availability_input.move_cursor(CursorMove::End);
            self.focus_on(Focus::Availability);
        } else if self.editor.is_editing_skills() {
            self.focus_on(Focus::Skills);
        }
    }

    fn commit_input(&mut self) {
        match self.focus {
            Focus::Skills if self.editor.is_editing_skills() => {
                let text = tui::field_text(&self.skill_input);
                if self.editor.add_skill(&text) {
                    self.skills.select(Some(self.editor.skills().len() - 1));
                } else {
                    tracing::debug!(input = %text, "skill not added");
                }
                self.skill_input = text_field(NEW_SKILL, false);
                self.focus_on(Focus::Skills);
            }
            Focus::Availability if self.editor.is_editing_availability() => {
                let text = tui::field_text(&self.availability_input);
                self.editor.set_availability(&text);
            }
            _ => {}
        }
    }

    fn remove_selected_skill(&mut self) {
        let Some(skill) = self
            .skills
            .selected()
            .and_then(|i| self.editor.skills().get(i))
            .cloned()
        else {
            return;
        };
        self.editor.remove_skill(&skill);
        let len = self.editor.skills().len();
        self.skills.select(if len == 0 {
            None
        } else {
            self.skills.selected().map(|i| i.min(len - 1))
        });
    }
}

impl TabImpl for ProfileTabImpl {
    type State = ProfileState;

    fn title() -> String {
        "My Profile".into()
    }

    fn create_state(context: &mut Context, _: usize) -> Result<ProfileState> {
        let trainer = context
            .session()
            .filter(|s| s.role() == Role::Trainer)
            .and_then(|s| s.trainer())
            .ok_or_else(|| Error::Auth("sign in as a trainer to edit a profile".into()))?;
        let record = context
            .trainers()?
            .get(trainer)?
            .ok_or_else(|| Error::NotFound(format!("trainer {trainer}")))?;

        let mut skills = ListState::default();
        if !record.skills.is_empty() {
            skills.select(Some(0));
        }
        let mut state = ProfileState {
            editor: ProfileEditor::new(record),
            skill_input: text_field(NEW_SKILL, false),
            availability_input: text_field(AVAILABILITY, false),
            skills,
            focus: Focus::Skills,
        };
        state.focus_on(Focus::Skills);
        Ok(state)
    }

    fn render(context: &mut Context, frame: &mut Frame, area: Rect, block: Block, tab_id: usize) {
        if ensure_owner(context, tab_id).is_err() {
            frame.render_widget(
                Paragraph::new("This session has ended. Press F10 to sign in again.")
                    .block(block.title("My Profile")),
                area,
            );
            return;
        }
        let Ok(state) = tab_state_mut::<ProfileState>(context, tab_id) else {
            return;
        };
        let inner = block.inner(area);
        frame.render_widget(
            block.title(format!("My Profile: {}", state.editor.record().name)),
            area,
        );

        let [edit_area, preview_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(inner);

        let skill_input_height = if state.editor.is_editing_skills() { 3 } else { 0 };
        let [skills_area, skill_input_area, availability_area, modes_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(skill_input_height),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(edit_area);

        let skills = List::new(state.editor.skills().iter().map(String::as_str))
            .block(Block::bordered().title("Skills"))
            .highlight_style(Style::new().fg(Color::Black).bg(Color::White))
            .highlight_symbol(">")
            .highlight_spacing(HighlightSpacing::Always);
        frame.render_stateful_widget(skills, skills_area, &mut state.skills);

        if state.editor.is_editing_skills() {
            frame.render_widget(&state.skill_input, skill_input_area);
        }
        if state.editor.is_editing_availability() {
            frame.render_widget(&state.availability_input, availability_area);
        } else {
            frame.render_widget(
                Paragraph::new(state.editor.availability())
                    .block(Block::bordered().title(AVAILABILITY)),
                availability_area,
            );
        }

        let mode = |on: bool| if on { "editing" } else { "viewing" };
        frame.render_widget(
            Line::from(format!(
                "Skills: {} | Availability: {}",
                mode(state.editor.is_editing_skills()),
                mode(state.editor.is_editing_availability())
            ))
            .italic(),
            modes_area,
        );

        DetailView::new(state.editor.record(), Role::Trainer, DetailStyle::Panel).render(
            frame,
            preview_area,
            0,
        );
    }

    fn keybinds(context: &Context, tab_id: usize) -> Vec<KeyBind> {
        let Ok(state) = tab_state::<ProfileState>(context, tab_id) else {
            return Vec::new();
        };
        let editor = &state.editor;
        let mut binds = vec![
            KeyBind::new(
                "toggle_skills",
                "F2",
                if editor.is_editing_skills() { "Done Skills" } else { "Edit Skills" },
                KeyCode::F(2),
            ),
            KeyBind::new(
                "toggle_availability",
                "F3",
                if editor.is_editing_availability() {
                    "Done Availability"
                } else {
                    "Edit Availability"
                },
                KeyCode::F(3),
            ),
        ];
        if editor.is_editing_skills() && editor.is_editing_availability() {
            binds.push(KeyBind::new("switch_focus", "Tab", "Switch Field", KeyCode::Tab));
        }
        if editor.is_editing_skills() {
            binds.extend([
                KeyBind::new("skill_up", "Up", "Prev Skill", KeyCode::Up),
                KeyBind::new("skill_down", "Down", "Next Skill", KeyCode::Down),
                KeyBind::new("remove_skill", "Del", "Remove Skill", KeyCode::Delete),
            ]);
        }
        if editor.is_editing_skills() || editor.is_editing_availability() {
            binds.push(KeyBind::new("commit_input", "Enter", "Apply", KeyCode::Enter));
        }
        binds.push(KeyBind::new("save", "F5", "Save", KeyCode::F(5)));
        binds.push(KeyBind::new("sign_out", "F10", "Sign Out", KeyCode::F(10)));
        binds
    }

    fn handle_key(context: &mut Context, bind_name: &str, tab_id: usize) -> Result<()> {
        if bind_name != "sign_out" {
            ensure_owner(context, tab_id)?;
        }
        match bind_name {
            "toggle_skills" => tab_state_mut::<ProfileState>(context, tab_id)?.toggle_skills(),
            "toggle_availability" => {
                tab_state_mut::<ProfileState>(context, tab_id)?.toggle_availability()
            }
            "switch_focus" => {
                let state = tab_state_mut::<ProfileState>(context, tab_id)?;
                let next = match state.focus {
                    Focus::Skills => Focus::Availability,
                    Focus::Availability => Focus::Skills,
                };
                state.focus_on(next);
            }
            "skill_up" => tab_state_mut::<ProfileState>(context, tab_id)?
                .skills
                .select_previous(),
            "skill_down" => tab_state_mut::<ProfileState>(context, tab_id)?
                .skills
                .select_next(),
            "remove_skill" => tab_state_mut::<ProfileState>(context, tab_id)?.remove_selected_skill(),
            "commit_input" => tab_state_mut::<ProfileState>(context, tab_id)?.commit_input(),
            "save" => save(context, tab_id)?,
            "sign_out" => sign_out(context, tab_id)?,
            _ => {}
        }
        Ok(())
    }

    fn handle_input(context: &mut Context, input: Input, tab_id: usize) -> bool {
        if ensure_owner(context, tab_id).is_err() {
            return false;
        }
        match tab_state_mut::<ProfileState>(context, tab_id) {
            Ok(state) => state.active_input().is_some_and(|field| field.input(input)),
            Err(_) => false,
        }
    }
}

/// Fails unless the trainer whose profile this tab edits is still
/// signed in.
fn ensure_owner(context: &Context, tab_id: usize) -> Result<()> {
    let owner = tab_state::<ProfileState>(context, tab_id)?.editor.record().id;
    ensure_session(context, Role::Trainer, Some(owner))
}

/// Applies pending availability text, then commits through the roster.
fn save(context: &mut Context, tab_id: usize) -> Result<()> {
    let mut editor = {
        let state = tab_state_mut::<ProfileState>(context, tab_id)?;
        if state.editor.is_editing_availability() {
            let text = tui::field_text(&state.availability_input);
            state.editor.set_availability(&text);
        }
        state.editor.clone()
    };
    editor.save(context.trainers()?)?;

    let state = tab_state_mut::<ProfileState>(context, tab_id)?;
    state.editor = editor;
    state.focus_on(Focus::Skills);
    context.tui()?.set_status("Profile saved");
    Ok(())
}
