use super::{navigate, set_focused};
use accounts::{AccountsContextExt, Credentials, Role, Route};
use crossterm::event::KeyCode;
use framework::prelude::*;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Stylize;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tui::{Input, KeyBind, TabImpl, TextArea, TuiContextExt, tab_state, tab_state_mut, text_field};

const EMAIL: &str = "Email";
const PASSWORD: &str = "Password";

/// Email and password, plus the trainer/admin choice.
pub struct LoginTabImpl;

pub struct LoginState {
    pub role: Role,
    email: TextArea<'static>,
    password: TextArea<'static>,
    focus: usize,
}

impl LoginState {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: tui::field_text(&self.email).trim().to_string(),
            password: tui::field_text(&self.password),
        }
    }

    fn focused_field(&mut self) -> &mut TextArea<'static> {
        if self.focus == 0 { &mut self.email } else { &mut self.password }
    }
}

impl TabImpl for LoginTabImpl {
    type State = LoginState;

    fn title() -> String {
        "Sign In".into()
    }

    fn create_state(_: &mut Context, _: usize) -> Result<LoginState> {
        let mut state = LoginState {
            role: Role::default(),
            email: text_field(EMAIL, false),
            password: text_field(PASSWORD, true),
            focus: 0,
        };
        set_focused(&mut state.email, EMAIL, true);
        set_focused(&mut state.password, PASSWORD, false);
        Ok(state)
    }

    fn render(context: &mut Context, frame: &mut Frame, area: Rect, block: Block, tab_id: usize) {
        let Ok(state) = tab_state::<LoginState>(context, tab_id) else {
            return;
        };
        let inner = block.inner(area);
        frame.render_widget(block.title("Sign In"), area);

        let [role_area, email_area, password_area, hint_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .areas(inner);

        let role_span = |role: Role| {
            let label = format!(" {} ", role.label());
            if role == state.role {
                Span::raw(label).reversed()
            } else {
                Span::raw(label)
            }
        };
        frame.render_widget(
            Line::from(vec![
                Span::raw("Sign in as: "),
                role_span(Role::Trainer),
                Span::raw(" "),
                role_span(Role::Admin),
            ]),
            role_area,
        );
        frame.render_widget(&state.email, email_area);
        frame.render_widget(&state.password, password_area);
        frame.render_widget(
            Paragraph::new("New trainer? Press F3 to create an account.").italic(),
            hint_area,
        );
    }

    fn keybinds(_: &Context, _: usize) -> Vec<KeyBind> {
        vec![
            KeyBind::new("next_field", "Tab", "Next Field", KeyCode::Tab),
            KeyBind::new("toggle_role", "F2", "Trainer/Admin", KeyCode::F(2)),
            KeyBind::new("register", "F3", "Register", KeyCode::F(3)),
            KeyBind::new("submit", "Enter", "Sign In", KeyCode::Enter),
        ]
    }

    fn handle_key(context: &mut Context, bind_name: &str, tab_id: usize) -> Result<()> {
        match bind_name {
            "next_field" => {
                let state = tab_state_mut::<LoginState>(context, tab_id)?;
                state.focus = (state.focus + 1) % 2;
                let focus = state.focus;
                set_focused(&mut state.email, EMAIL, focus == 0);
                set_focused(&mut state.password, PASSWORD, focus == 1);
            }
            "toggle_role" => {
                let state = tab_state_mut::<LoginState>(context, tab_id)?;
                state.role = state.role.toggled();
            }
            "register" => navigate(context, tab_id, Route::Register)?,
            "submit" => {
                let state = tab_state::<LoginState>(context, tab_id)?;
                let (credentials, role) = (state.credentials(), state.role);
                let session = context.sign_in(&credentials, role)?;
                navigate(context, tab_id, Route::landing_for(session.role()))?;
                context
                    .tui()?
                    .set_status(format!("Signed in as {} ({role})", session.email()));
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_input(context: &mut Context, input: Input, tab_id: usize) -> bool {
        match tab_state_mut::<LoginState>(context, tab_id) {
            Ok(state) => state.focused_field().input(input),
            Err(_) => false,
        }
    }
}
