//! A common terminal UI shell: tabs, key binds, a status line and the
//! event loop. Screens plug in by implementing `TabImpl`.
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use framework::prelude::*;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Style, Stylize, palette::tailwind};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, HighlightSpacing, List, ListState, Paragraph, Tabs};
use std::any::Any;
use std::collections::HashMap;

pub use tui_textarea::{CursorMove, Input, Key, TextArea};

/// Adds the resources the terminal UI needs. Add it before any plugin
/// that registers tab types.
#[derive(Clone)]
pub struct TuiPlugin;

impl Plugin for TuiPlugin {
    fn build(self, context: &mut Context) -> Result<()> {
        if !context.has_resource::<TuiNewTabTypes>() {
            context.add_resource(TuiNewTabTypes::default());
        }
        Ok(())
    }
}

/// The state of a terminal UI session. Its presence in a `Context`
/// means a session was requested.
#[derive(Default)]
pub struct Tui {
    quit_requested: bool,
    tabs: Vec<(usize, Tab)>,
    selected_tab: usize,
    next_tab_id: usize,
    status: Option<String>,
}

impl_resource!(Tui);

impl Tui {
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn should_quit(&self) -> bool {
        self.quit_requested
    }

    /// Shows a one-line message under the active tab until replaced.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn tab_titles(&self) -> Vec<String> {
        self.tabs.iter().map(|(_, t)| t.title.clone()).collect()
    }

    /// The id of the active tab.
    pub fn selected_tab_id(&self) -> Option<usize> {
        self.tabs.get(self.selected_tab).map(|(id, _)| *id)
    }

    fn selected_funcs(&self) -> Option<(usize, TabFuncs)> {
        self.tabs
            .get(self.selected_tab)
            .map(|(id, tab)| (*id, tab.funcs.clone()))
    }

    fn cycle_tab_next(&mut self) {
        if !self.tabs.is_empty() {
            self.selected_tab = (self.selected_tab + 1) % self.tabs.len();
        }
    }

    fn cycle_tab_prev(&mut self) {
        if !self.tabs.is_empty() {
            self.selected_tab = (self.selected_tab + self.tabs.len() - 1) % self.tabs.len();
        }
    }

    /// Opens `tab` after the existing ones and selects it.
    pub fn open_tab(context: &mut Context, tab: Tab) -> Result<usize> {
        let tab_id = context.tui()?.next_tab_id;
        (tab.funcs.create_state_fn)(context, tab_id)?;

        let tui = context.tui()?;
        tui.next_tab_id += 1;
        tui.tabs.push((tab_id, tab));
        tui.selected_tab = tui.tabs.len() - 1;
        Ok(tab_id)
    }

    /// Swaps the tab with id `tab_id` for `tab`, keeping its position.
    /// If `tab` fails to build its state, the old tab is rebuilt.
    pub fn replace_tab(context: &mut Context, tab_id: usize, tab: Tab) -> Result<()> {
        let old_funcs = context
            .tui()?
            .tabs
            .iter()
            .find(|(id, _)| *id == tab_id)
            .map(|(_, t)| t.funcs.clone())
            .ok_or_else(|| Error::NotFound(format!("tab {tab_id}")))?;

        (old_funcs.drop_state_fn)(context, tab_id);
        if let Err(e) = (tab.funcs.create_state_fn)(context, tab_id) {
            (old_funcs.create_state_fn)(context, tab_id)?;
            return Err(e);
        }

        if let Some(entry) = context.tui()?.tabs.iter_mut().find(|(id, _)| *id == tab_id) {
            entry.1 = tab;
        }
        Ok(())
    }

    /// Closes a tab. Closing the last tab ends the session.
    pub fn close_tab(context: &mut Context, tab_id: usize) -> Result<()> {
        let tui = context.tui()?;
        let Some(index) = tui.tabs.iter().position(|(id, _)| *id == tab_id) else {
            return Err(Error::NotFound(format!("tab {tab_id}")));
        };
        let (_, tab) = tui.tabs.remove(index);
        if tui.tabs.is_empty() {
            tui.request_quit();
        } else if tui.selected_tab >= tui.tabs.len() {
            tui.selected_tab = tui.tabs.len() - 1;
        }
        (tab.funcs.drop_state_fn)(context, tab_id);
        Ok(())
    }
}

/// Access to the `Tui` resource.
pub trait TuiContextExt {
    fn tui(&mut self) -> Result<&mut Tui>;
}

impl TuiContextExt for Context {
    fn tui(&mut self) -> Result<&mut Tui> {
        self.get_resource_mut::<Tui>()
            .ok_or(Error::new("no tui session requested"))
    }
}

/// Tab types offered by the new tab launcher.
#[derive(Default)]
pub struct TuiNewTabTypes {
    types: Vec<(String, TabFuncs)>,
}

impl_resource!(TuiNewTabTypes);

impl TuiNewTabTypes {
    pub fn register_new_tab_type<T>(&mut self, name: impl Into<String>)
    where
        T: TabImpl,
    {
        self.types.push((name.into(), TabFuncs::new::<T>()));
    }

    pub fn names(&self) -> Vec<String> {
        self.types.iter().map(|(name, _)| name.clone()).collect()
    }
}

/// Per-tab state for one `TabImpl` type, keyed by tab id.
pub struct TabState<T> {
    states: HashMap<usize, T>,
}

impl<T> Default for TabState<T> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
        }
    }
}

impl<T> TabState<T> {
    pub fn get(&self, tab_id: usize) -> Option<&T> {
        self.states.get(&tab_id)
    }

    pub fn get_mut(&mut self, tab_id: usize) -> Option<&mut T> {
        self.states.get_mut(&tab_id)
    }
}

impl<T> Resource for TabState<T>
where
    T: 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Gets a tab's state.
pub fn tab_state<S: 'static>(context: &Context, tab_id: usize) -> Result<&S> {
    context
        .get_resource::<TabState<S>>()
        .and_then(|s| s.get(tab_id))
        .ok_or_else(|| Error::NotFound(format!("state for tab {tab_id}")))
}

/// Gets a tab's state mutably.
pub fn tab_state_mut<S: 'static>(context: &mut Context, tab_id: usize) -> Result<&mut S> {
    context
        .get_resource_mut::<TabState<S>>()
        .and_then(|s| s.get_mut(tab_id))
        .ok_or_else(|| Error::NotFound(format!("state for tab {tab_id}")))
}

/// A tab in the session. Create one with `Tab::new`.
pub struct Tab {
    title: String,
    funcs: TabFuncs,
}

impl Tab {
    pub fn new<T>(title: impl Into<String>) -> Self
    where
        T: TabImpl,
    {
        Self {
            title: title.into(),
            funcs: TabFuncs::new::<T>(),
        }
    }

    /// Creates a tab titled with `TabImpl::title`.
    pub fn of<T>() -> Self
    where
        T: TabImpl,
    {
        Self::new::<T>(T::title())
    }
}

/// A screen that can live in a tab.
pub trait TabImpl {
    type State: 'static;

    fn title() -> String;

    /// Builds the state for a newly opened tab. Failing keeps the tab
    /// from opening.
    fn create_state(context: &mut Context, tab_id: usize) -> Result<Self::State>;

    fn render(context: &mut Context, frame: &mut Frame, area: Rect, block: Block, tab_id: usize);

    /// The binds currently active, shown in the footer.
    fn keybinds(context: &Context, tab_id: usize) -> Vec<KeyBind>;

    fn handle_key(context: &mut Context, bind_name: &str, tab_id: usize) -> Result<()>;

    /// Receives keys no bind claimed, for text entry. Returns whether
    /// the key was used.
    fn handle_input(_context: &mut Context, _input: Input, _tab_id: usize) -> bool {
        false
    }
}

type TabCreateStateFn = fn(&mut Context, usize) -> Result<()>;
type TabDropStateFn = fn(&mut Context, usize);
type TabRenderFn = fn(&mut Context, &mut Frame, Rect, Block, usize);
type TabKeybindsFn = fn(&Context, usize) -> Vec<KeyBind>;
type TabHandleKeyFn = fn(&mut Context, &str, usize) -> Result<()>;
type TabHandleInputFn = fn(&mut Context, Input, usize) -> bool;

fn create_state<T>(context: &mut Context, tab_id: usize) -> Result<()>
where
    T: TabImpl,
{
    let state = T::create_state(context, tab_id)?;
    if !context.has_resource::<TabState<T::State>>() {
        context.add_resource(TabState::<T::State>::default());
    }
    if let Some(states) = context.get_resource_mut::<TabState<T::State>>() {
        states.states.insert(tab_id, state);
    }
    Ok(())
}

fn drop_state<T>(context: &mut Context, tab_id: usize)
where
    T: TabImpl,
{
    if let Some(states) = context.get_resource_mut::<TabState<T::State>>() {
        states.states.remove(&tab_id);
    }
}

#[derive(Clone)]
struct TabFuncs {
    create_state_fn: TabCreateStateFn,
    drop_state_fn: TabDropStateFn,
    render_fn: TabRenderFn,
    keybinds_fn: TabKeybindsFn,
    handle_key_fn: TabHandleKeyFn,
    handle_input_fn: TabHandleInputFn,
}

impl TabFuncs {
    fn new<T>() -> Self
    where
        T: TabImpl,
    {
        Self {
            create_state_fn: create_state::<T>,
            drop_state_fn: drop_state::<T>,
            render_fn: T::render,
            keybinds_fn: T::keybinds,
            handle_key_fn: T::handle_key,
            handle_input_fn: T::handle_input,
        }
    }
}

/// A named key chord with the text shown for it in the footer.
#[derive(Clone, Debug)]
pub struct KeyBind {
    name: String,
    display_key: String,
    display_name: String,
    key_code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyBind {
    /// A bind for `key_code` pressed without modifiers.
    pub fn new(
        name: impl Into<String>,
        display_key: impl Into<String>,
        display_name: impl Into<String>,
        key_code: KeyCode,
    ) -> Self {
        Self {
            name: name.into(),
            display_key: display_key.into(),
            display_name: display_name.into(),
            key_code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.key_code && key.modifiers == self.modifiers
    }

    fn display_text(&self) -> Line<'_> {
        Line::from(vec![
            Span::styled(
                format!("<{}>", self.display_key),
                Style::default().fg(Color::Black).bg(Color::White),
            ),
            Span::raw(format!(" {}", self.display_name)),
        ])
    }
}

/// Binds available on every tab.
pub fn global_keybinds() -> Vec<KeyBind> {
    vec![
        KeyBind::new("quit", "Ctrl+Q", "Quit", KeyCode::Char('q'))
            .with_modifiers(KeyModifiers::CONTROL),
        KeyBind::new("prev_tab", "Ctrl+Left", "Prev Tab", KeyCode::Left)
            .with_modifiers(KeyModifiers::CONTROL),
        KeyBind::new("next_tab", "Ctrl+Right", "Next Tab", KeyCode::Right)
            .with_modifiers(KeyModifiers::CONTROL),
        KeyBind::new("new_tab", "Ctrl+N", "New Tab", KeyCode::Char('n'))
            .with_modifiers(KeyModifiers::CONTROL),
        KeyBind::new("close_tab", "Ctrl+W", "Close Tab", KeyCode::Char('w'))
            .with_modifiers(KeyModifiers::CONTROL),
    ]
}

/// Runs a session until quit is requested. Opens a launcher tab if no
/// tab was opened beforehand.
pub fn run_tui(context: &mut Context) -> Result<()> {
    if context.tui()?.tabs.is_empty() {
        Tui::open_tab(context, Tab::of::<LauncherTabImpl>())?;
    }

    let mut terminal = ratatui::init();
    let result = run_loop(&mut terminal, context);
    ratatui::restore();
    result
}

fn run_loop(terminal: &mut ratatui::DefaultTerminal, context: &mut Context) -> Result<()> {
    loop {
        terminal.draw(|frame| render_tui(context, frame))?;
        let ev = crossterm::event::read()?;
        handle_event(context, ev)?;
        if context.tui()?.should_quit() {
            return Ok(());
        }
    }
}

/// Draws the whole session: tab strip, active tab, status line and the
/// key bind footer.
pub fn render_tui(context: &mut Context, frame: &mut Frame) {
    let Some(tui) = context.get_resource::<Tui>() else {
        return;
    };
    let current = tui.selected_funcs();
    let titles = tui.tab_titles();
    let selected_tab = tui.selected_tab;
    let status = tui.status.clone();

    let mut keybinds = global_keybinds();
    if let Some((tab_id, funcs)) = &current {
        keybinds.extend((funcs.keybinds_fn)(context, *tab_id));
    }

    let frame_area = frame.area();
    let keybind_lines = wrap_keybinds(&keybinds, frame_area.width as usize);

    frame.buffer_mut().set_style(
        frame_area,
        Style::default().bg(tailwind::SLATE.c800).fg(tailwind::SLATE.c100),
    );

    let [header_area, content_area, status_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(keybind_lines.len() as u16),
    ])
    .areas(frame_area);

    frame.render_widget(
        Tabs::new(titles)
            .highlight_style(Style::new().bg(tailwind::RED.c700).fg(tailwind::RED.c100))
            .padding(" ", "")
            .divider(" ")
            .select(selected_tab),
        header_area,
    );

    if let Some((tab_id, funcs)) = current {
        let block = Block::new()
            .border_type(BorderType::QuadrantOutside)
            .borders(Borders::ALL)
            .bg(tailwind::SLATE.c900);
        (funcs.render_fn)(context, frame, content_area, block, tab_id);
    }

    if let Some(status) = status {
        frame.render_widget(Line::from(status).italic(), status_area);
    }

    let rows = Layout::vertical(keybind_lines.iter().map(|_| Constraint::Length(1))).split(footer_area);
    for (row, line) in rows.iter().zip(&keybind_lines) {
        let columns = Layout::horizontal(
            line.iter().map(|l| Constraint::Length(l.width() as u16)),
        )
        .spacing(1)
        .split(*row);
        for (column, text) in columns.iter().zip(line) {
            frame.render_widget(text.clone(), *column);
        }
    }
}

fn wrap_keybinds(keybinds: &[KeyBind], width: usize) -> Vec<Vec<Line<'_>>> {
    let mut lines: Vec<Vec<Line>> = vec![Vec::new()];
    let mut width_so_far = 0;
    for keybind in keybinds {
        let text = keybind.display_text();
        let needed = text.width() + 1;
        if width_so_far + needed >= width && width_so_far > 0 {
            lines.push(Vec::new());
            width_so_far = 0;
        }
        width_so_far += needed;
        if let Some(last) = lines.last_mut() {
            last.push(text);
        }
    }
    lines
}

/// Routes one terminal event. Errors raised by a tab are shown on the
/// status line instead of ending the session.
pub fn handle_event(context: &mut Context, ev: Event) -> Result<()> {
    let Event::Key(key) = ev else {
        return Ok(());
    };
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    if let Some(bind) = global_keybinds().into_iter().find(|b| b.matches(&key)) {
        return handle_global_bind(context, bind.name());
    }

    let Some((tab_id, funcs)) = context.tui()?.selected_funcs() else {
        return Ok(());
    };
    let tab_bind = (funcs.keybinds_fn)(context, tab_id)
        .into_iter()
        .find(|b| b.matches(&key));

    let outcome = match tab_bind {
        Some(bind) => (funcs.handle_key_fn)(context, bind.name(), tab_id),
        None => {
            (funcs.handle_input_fn)(context, Input::from(key), tab_id);
            Ok(())
        }
    };

    if let Err(e) = outcome {
        tracing::warn!(error = %e, tab_id, "tab action failed");
        context.tui()?.set_status(e.to_string());
    }
    Ok(())
}

fn handle_global_bind(context: &mut Context, name: &str) -> Result<()> {
    match name {
        "quit" => context.tui()?.request_quit(),
        "prev_tab" => context.tui()?.cycle_tab_prev(),
        "next_tab" => context.tui()?.cycle_tab_next(),
        "new_tab" => {
            Tui::open_tab(context, Tab::of::<LauncherTabImpl>())?;
        }
        "close_tab" => {
            if let Some(tab_id) = context.tui()?.selected_tab_id() {
                Tui::close_tab(context, tab_id)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// A rectangle of the given percentages centred in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}

/// A single-line text field with a titled border.
pub fn text_field(title: impl Into<String>, masked: bool) -> TextArea<'static> {
    let mut field = TextArea::default();
    field.set_block(Block::bordered().title(title.into()));
    field.set_cursor_line_style(Style::default());
    if masked {
        field.set_mask_char('\u{2022}');
    }
    field
}

/// Creates a text field holding `value`.
pub fn text_field_with(title: impl Into<String>, value: &str) -> TextArea<'static> {
    let mut field = TextArea::new(vec![value.to_string()]);
    field.set_block(Block::bordered().title(title.into()));
    field.set_cursor_line_style(Style::default());
    field
}

/// The text of a field, lines joined with `\n`.
pub fn field_text(field: &TextArea) -> String {
    field.lines().join("\n")
}

/// Flattens a rendered buffer into lines of text, trailing spaces
/// trimmed. Used to check what a screen shows.
pub fn buffer_text(buffer: &Buffer) -> String {
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width.max(1))
        .map(|row| {
            let line: String = row.iter().map(|cell| cell.symbol()).collect();
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lists the registered tab types and turns itself into the chosen one.
struct LauncherTabImpl;

struct LauncherTabState {
    list_state: ListState,
}

impl TabImpl for LauncherTabImpl {
    type State = LauncherTabState;

    fn title() -> String {
        "New Tab".into()
    }

    fn create_state(_: &mut Context, _: usize) -> Result<Self::State> {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Ok(LauncherTabState { list_state })
    }

    fn render(context: &mut Context, frame: &mut Frame, area: Rect, block: Block, tab_id: usize) {
        let names = context
            .get_resource::<TuiNewTabTypes>()
            .map(TuiNewTabTypes::names)
            .unwrap_or_default();

        if names.is_empty() {
            frame.render_widget(Paragraph::new("No screens registered.").block(block), area);
            return;
        }

        let list = List::new(names)
            .block(block.title("Open a screen"))
            .highlight_style(Style::new().fg(Color::Black).bg(Color::White))
            .highlight_symbol(">")
            .highlight_spacing(HighlightSpacing::Always);
        if let Ok(state) = tab_state_mut::<LauncherTabState>(context, tab_id) {
            frame.render_stateful_widget(list, area, &mut state.list_state);
        }
    }

    fn keybinds(_: &Context, _: usize) -> Vec<KeyBind> {
        vec![
            KeyBind::new("move_up", "Up", "Move Up", KeyCode::Up),
            KeyBind::new("move_down", "Down", "Move Down", KeyCode::Down),
            KeyBind::new("select", "Enter", "Open", KeyCode::Enter),
        ]
    }

    fn handle_key(context: &mut Context, bind_name: &str, tab_id: usize) -> Result<()> {
        match bind_name {
            "move_up" => tab_state_mut::<LauncherTabState>(context, tab_id)?
                .list_state
                .select_previous(),
            "move_down" => tab_state_mut::<LauncherTabState>(context, tab_id)?
                .list_state
                .select_next(),
            "select" => {
                let selected = tab_state::<LauncherTabState>(context, tab_id)?
                    .list_state
                    .selected()
                    .unwrap_or(0);
                let chosen = context
                    .get_resource::<TuiNewTabTypes>()
                    .and_then(|t| t.types.get(selected))
                    .map(|(name, funcs)| Tab {
                        title: name.clone(),
                        funcs: funcs.clone(),
                    });
                if let Some(tab) = chosen {
                    Tui::replace_tab(context, tab_id, tab)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crossterm::event::{KeyEventState};
    use ratatui::{Terminal, backend::TestBackend};

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    /// Counts characters typed into it.
    struct EchoTabImpl;

    #[derive(Default)]
    struct EchoState {
        typed: String,
    }

    impl TabImpl for EchoTabImpl {
        type State = EchoState;

        fn title() -> String {
            "Echo".into()
        }

        fn create_state(_: &mut Context, _: usize) -> Result<EchoState> {
            Ok(EchoState::default())
        }

        fn render(context: &mut Context, frame: &mut Frame, area: Rect, block: Block, tab_id: usize) {
            let typed = tab_state::<EchoState>(context, tab_id)
                .map(|s| s.typed.clone())
                .unwrap_or_default();
            frame.render_widget(Paragraph::new(format!("typed: {typed}")).block(block), area);
        }

        fn keybinds(_: &Context, _: usize) -> Vec<KeyBind> {
            vec![KeyBind::new("fail", "F5", "Fail", KeyCode::F(5))]
        }

        fn handle_key(_: &mut Context, bind_name: &str, _: usize) -> Result<()> {
            Err(Error::Validation(format!("{bind_name} pressed")))
        }

        fn handle_input(context: &mut Context, input: Input, tab_id: usize) -> bool {
            if let (Key::Char(c), Ok(state)) = (input.key, tab_state_mut::<EchoState>(context, tab_id)) {
                state.typed.push(c);
                return true;
            }
            false
        }
    }

    fn session() -> Result<Context> {
        let mut context = Context::new();
        context.add_plugin(TuiPlugin)?;
        context
            .get_resource_mut::<TuiNewTabTypes>()
            .ok_or(Error::new("missing tab types"))?
            .register_new_tab_type::<EchoTabImpl>("Echo");
        context.add_resource(Tui::default());
        Ok(context)
    }

    #[test]
    fn unbound_keys_reach_the_tab() -> Result<()> {
        let mut context = session()?;
        let tab_id = Tui::open_tab(&mut context, Tab::of::<EchoTabImpl>())?;
        handle_event(&mut context, press(KeyCode::Char('q'), KeyModifiers::NONE))?;
        handle_event(&mut context, press(KeyCode::Char('x'), KeyModifiers::NONE))?;

        assert_eq!(tab_state::<EchoState>(&context, tab_id)?.typed, "qx");
        assert!(!context.tui()?.should_quit());

        handle_event(&mut context, press(KeyCode::Char('q'), KeyModifiers::CONTROL))?;
        assert!(context.tui()?.should_quit());
        Ok(())
    }

    #[test]
    fn tab_errors_land_on_the_status_line() -> Result<()> {
        let mut context = session()?;
        Tui::open_tab(&mut context, Tab::of::<EchoTabImpl>())?;
        handle_event(&mut context, press(KeyCode::F(5), KeyModifiers::NONE))?;
        assert_eq!(context.tui()?.status(), Some("invalid input: fail pressed"));
        Ok(())
    }

    #[test]
    fn launcher_replaces_itself_with_the_chosen_screen() -> Result<()> {
        let mut context = session()?;
        handle_event(&mut context, press(KeyCode::Char('n'), KeyModifiers::CONTROL))?;
        assert_eq!(context.tui()?.tab_titles(), vec!["New Tab"]);

        handle_event(&mut context, press(KeyCode::Enter, KeyModifiers::NONE))?;
        assert_eq!(context.tui()?.tab_titles(), vec!["Echo"]);
        let tab_id = context.tui()?.selected_tab_id().ok_or(Error::new("no tab"))?;
        assert!(tab_state::<EchoState>(&context, tab_id).is_ok());
        assert!(tab_state::<LauncherTabState>(&context, tab_id).is_err());
        Ok(())
    }

    #[test]
    fn closing_the_last_tab_quits() -> Result<()> {
        let mut context = session()?;
        Tui::open_tab(&mut context, Tab::of::<EchoTabImpl>())?;
        Tui::open_tab(&mut context, Tab::of::<EchoTabImpl>())?;
        handle_event(&mut context, press(KeyCode::Left, KeyModifiers::CONTROL))?;
        assert_eq!(context.tui()?.selected_tab_id(), Some(0));

        handle_event(&mut context, press(KeyCode::Char('w'), KeyModifiers::CONTROL))?;
        assert!(!context.tui()?.should_quit());
        handle_event(&mut context, press(KeyCode::Char('w'), KeyModifiers::CONTROL))?;
        assert!(context.tui()?.should_quit());
        Ok(())
    }

    #[test]
    fn renders_tabs_content_and_footer() -> Result<()> {
        let mut context = session()?;
        let tab_id = Tui::open_tab(&mut context, Tab::of::<EchoTabImpl>())?;
        tab_state_mut::<EchoState>(&mut context, tab_id)?.typed = "hello".into();
        context.tui()?.set_status("ready");

        let mut terminal = Terminal::new(TestBackend::new(100, 12))?;
        terminal.draw(|frame| render_tui(&mut context, frame))?;
        let text = buffer_text(terminal.backend().buffer());

        assert!(text.lines().next().is_some_and(|l| l.contains("Echo")));
        assert!(text.contains("typed: hello"));
        assert!(text.contains("ready"));
        assert!(text.contains("<Ctrl+Q> Quit"));
        assert!(text.contains("<F5> Fail"));
        Ok(())
    }

    #[test]
    fn centered_rect_is_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(50, 50, area);
        assert_eq!(inner, Rect::new(25, 12, 50, 25));
    }
}
