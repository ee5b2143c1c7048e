use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::widgets::{Block, Cell, HighlightSpacing, Row, Table, TableState};
use roster::{TrainerId, TrainerRecord};
use tabled::builder::Builder as TabledBuilder;

/// What one row of the trainer list shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainerRow {
    pub id: TrainerId,
    pub name: String,
    pub skills: Vec<String>,
    pub pricing: String,
    pub availability: String,
    pub willing_to_travel: bool,
}

impl TrainerRow {
    pub fn from_record(record: &TrainerRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            skills: record.skills.clone(),
            pricing: record.pricing.summary(),
            availability: record.availability.clone(),
            willing_to_travel: record.willing_to_travel(),
        }
    }

    /// Skills as inline tags: `[Yoga] [Pilates]`.
    pub fn skill_tags(&self) -> String {
        self.skills
            .iter()
            .map(|s| format!("[{s}]"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn travel_label(&self) -> &'static str {
        if self.willing_to_travel { "Yes" } else { "No" }
    }

    /// The row as one line, e.g.
    /// `Jane | [Yoga] | $50/hr | $300/day | Mon-Fri | No`.
    pub fn to_line(&self) -> String {
        format!(
            "{} | {} | {} | {} | {}",
            self.name,
            self.skill_tags(),
            self.pricing,
            self.availability,
            self.travel_label()
        )
    }
}

/// Projects every record, in input order.
pub fn rows(records: &[TrainerRecord]) -> Vec<TrainerRow> {
    records.iter().map(TrainerRow::from_record).collect()
}

/// The list as a plain text table for the command line.
pub fn text_table(records: &[TrainerRecord]) -> String {
    let mut builder = TabledBuilder::default();
    builder.push_record(["ID", "Name", "Skills", "Pricing", "Availability", "Travel"]);
    for row in rows(records) {
        builder.push_record([
            row.id.to_string(),
            row.name.clone(),
            row.skill_tags(),
            row.pricing.clone(),
            row.availability.clone(),
            row.travel_label().to_string(),
        ]);
    }
    builder.build().to_string()
}

/// The trainer table with a row cursor. Activating the cursor row
/// yields that row's full record.
#[derive(Default)]
pub struct TrainerListView {
    records: Vec<TrainerRecord>,
    state: TableState,
}

impl TrainerListView {
    pub fn new(records: Vec<TrainerRecord>) -> Self {
        let mut view = Self {
            records,
            state: TableState::default(),
        };
        if !view.records.is_empty() {
            view.state.select(Some(0));
        }
        view
    }

    pub fn records(&self) -> &[TrainerRecord] {
        &self.records
    }

    /// Swaps in a fresh copy of the roster, keeping the cursor in range.
    pub fn refresh(&mut self, records: Vec<TrainerRecord>) {
        self.records = records;
        let selected = match (self.state.selected(), self.records.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.state.select(selected);
    }

    pub fn move_up(&mut self) {
        if let Some(i) = self.state.selected() {
            self.state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn move_down(&mut self) {
        if let Some(i) = self.state.selected() {
            self.state.select(Some((i + 1).min(self.records.len().saturating_sub(1))));
        }
    }

    pub fn highlighted(&self) -> Option<&TrainerRecord> {
        self.state.selected().and_then(|i| self.records.get(i))
    }

    /// Activates the cursor row.
    pub fn activate(&self) -> Option<TrainerRecord> {
        self.highlighted().cloned()
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, block: Block) {
        let header = Row::new(["Name", "Skills", "Pricing", "Availability", "Travel"]).bold();
        let body = rows(&self.records).into_iter().map(|row| {
            Row::new([
                Cell::from(row.name.clone()),
                Cell::from(row.skill_tags()),
                Cell::from(row.pricing.clone()),
                Cell::from(row.availability.clone()),
                Cell::from(row.travel_label()),
            ])
        });

        let table = Table::new(
            body,
            [
                Constraint::Fill(2),
                Constraint::Fill(3),
                Constraint::Length(20),
                Constraint::Fill(2),
                Constraint::Length(6),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(Style::new().fg(Color::Black).bg(Color::White))
        .highlight_symbol(">")
        .highlight_spacing(HighlightSpacing::Always);

        frame.render_stateful_widget(table, area, &mut self.state);
    }
}
