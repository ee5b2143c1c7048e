use super::{navigate, set_focused};
use accounts::{AccountsContextExt, RegistrationForm, Route};
use crossterm::event::KeyCode;
use framework::prelude::*;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::Block;
use tui::{Input, KeyBind, TabImpl, TextArea, TuiContextExt, tab_state, tab_state_mut, text_field};

const FIELD_COUNT: usize = RegistrationForm::LABELS.len();

/// The trainer sign-up form.
pub struct RegisterTabImpl;

pub struct RegisterState {
    fields: Vec<TextArea<'static>>,
    focus: usize,
}

impl RegisterState {
    /// The form as currently typed.
    pub fn form(&self) -> RegistrationForm {
        let values: [String; FIELD_COUNT] =
            std::array::from_fn(|i| self.fields.get(i).map(tui::field_text).unwrap_or_default());
        RegistrationForm::from_values(values)
    }

    fn move_focus(&mut self, forward: bool) {
        self.focus = if forward {
            (self.focus + 1) % FIELD_COUNT
        } else {
            (self.focus + FIELD_COUNT - 1) % FIELD_COUNT
        };
        for (i, (field, label)) in self.fields.iter_mut().zip(RegistrationForm::LABELS).enumerate() {
            set_focused(field, label, i == self.focus);
        }
    }
}

fn is_secret(label: &str) -> bool {
    label.contains("Password")
}

impl TabImpl for RegisterTabImpl {
    type State = RegisterState;

    fn title() -> String {
        "Register".into()
    }

    fn create_state(_: &mut Context, _: usize) -> Result<RegisterState> {
        let mut fields: Vec<_> = RegistrationForm::LABELS
            .iter()
            .map(|label| text_field(*label, is_secret(label)))
            .collect();
        for (i, (field, label)) in fields.iter_mut().zip(RegistrationForm::LABELS).enumerate() {
            set_focused(field, label, i == 0);
        }
        Ok(RegisterState { fields, focus: 0 })
    }

    fn render(context: &mut Context, frame: &mut Frame, area: Rect, block: Block, tab_id: usize) {
        let Ok(state) = tab_state::<RegisterState>(context, tab_id) else {
            return;
        };
        let inner = block.inner(area);
        frame.render_widget(block.title("Create a trainer account"), area);

        let rows = Layout::vertical(
            state
                .fields
                .iter()
                .map(|_| Constraint::Length(3))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(inner);
        for (field, row) in state.fields.iter().zip(rows.iter()) {
            frame.render_widget(field, *row);
        }
    }

    fn keybinds(_: &Context, _: usize) -> Vec<KeyBind> {
        vec![
            KeyBind::new("next_field", "Tab", "Next Field", KeyCode::Tab),
            KeyBind::new("next_field", "Down", "Next Field", KeyCode::Down),
            KeyBind::new("prev_field", "Up", "Prev Field", KeyCode::Up),
            KeyBind::new("back", "Esc", "Back to Sign In", KeyCode::Esc),
            KeyBind::new("submit", "Enter", "Register", KeyCode::Enter),
        ]
    }

    fn handle_key(context: &mut Context, bind_name: &str, tab_id: usize) -> Result<()> {
        match bind_name {
            "next_field" => tab_state_mut::<RegisterState>(context, tab_id)?.move_focus(true),
            "prev_field" => tab_state_mut::<RegisterState>(context, tab_id)?.move_focus(false),
            "back" => navigate(context, tab_id, Route::Login)?,
            "submit" => {
                let form = tab_state::<RegisterState>(context, tab_id)?.form();
                let session = context.register_trainer(&form)?;
                navigate(context, tab_id, Route::ProfileEditor)?;
                context
                    .tui()?
                    .set_status(format!("Welcome, {}", session.email()));
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_input(context: &mut Context, input: Input, tab_id: usize) -> bool {
        match tab_state_mut::<RegisterState>(context, tab_id) {
            Ok(state) => {
                let focus = state.focus;
                state.fields.get_mut(focus).is_some_and(|f| f.input(input))
            }
            Err(_) => false,
        }
    }
}
