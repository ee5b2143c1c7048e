//! The one renderer for a trainer's full profile, used as a side panel
//! next to the list and as a popup overlay.
use crate::selection::Selection;
use accounts::Role;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use roster::TrainerRecord;

/// How the detail view sits on screen.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DetailStyle {
    /// Fills the area it is given, beside the list.
    #[default]
    Panel,
    /// Floats centred over whatever is underneath.
    Overlay,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SectionKind {
    Contact,
    Skills,
    Experience,
    Pricing,
    Availability,
    Admin,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Contact => "Contact Information",
            Self::Skills => "Skills",
            Self::Experience => "Experience & Certifications",
            Self::Pricing => "Pricing",
            Self::Availability => "Availability & Preferences",
            Self::Admin => "Admin Section",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetailLine {
    Field { label: &'static str, value: String },
    /// Introduces the list items that follow.
    Heading(&'static str),
    Item(String),
}

impl DetailLine {
    fn field(label: &'static str, value: impl Into<String>) -> Self {
        Self::Field {
            label,
            value: value.into(),
        }
    }

    fn to_text(&self) -> String {
        match self {
            Self::Field { label, value } if value.is_empty() => format!("  {label}:"),
            Self::Field { label, value } => format!("  {label}: {value}"),
            Self::Heading(label) => format!("  {label}:"),
            Self::Item(item) => format!("  - {item}"),
        }
    }

    fn to_line(&self) -> Line<'_> {
        match self {
            Self::Field { label, value } => Line::from(vec![
                Span::raw(format!("{label}: ")).bold(),
                Span::raw(value.as_str()),
            ]),
            Self::Heading(label) => Line::from(format!("{label}:")).bold(),
            Self::Item(item) => Line::from(format!("\u{2022} {item}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailSection {
    pub kind: SectionKind,
    pub lines: Vec<DetailLine>,
}

/// A read-only projection of one record for one viewer.
#[derive(Clone, Debug)]
pub struct DetailView<'a> {
    record: &'a TrainerRecord,
    role: Role,
    style: DetailStyle,
}

impl<'a> DetailView<'a> {
    pub fn new(record: &'a TrainerRecord, role: Role, style: DetailStyle) -> Self {
        Self {
            record,
            role,
            style,
        }
    }

    /// The view for the current selection. `None` while closed, which
    /// is the only time the view is hidden.
    pub fn for_selection(selection: &'a Selection, role: Role, style: DetailStyle) -> Option<Self> {
        selection
            .current()
            .map(|record| Self::new(record, role, style))
    }

    pub fn record(&self) -> &TrainerRecord {
        self.record
    }

    pub fn style(&self) -> DetailStyle {
        self.style
    }

    /// Every section in display order. The admin section is only
    /// included for admins.
    pub fn sections(&self) -> Vec<DetailSection> {
        let r = self.record;
        let mut sections = vec![
            DetailSection {
                kind: SectionKind::Contact,
                lines: vec![
                    DetailLine::field("Name", &r.name),
                    DetailLine::field("Phone", &r.phone),
                    DetailLine::field("Email", &r.email),
                    DetailLine::field("Resume", &r.resume),
                    DetailLine::field("LinkedIn", &r.linkedin),
                ],
            },
            DetailSection {
                kind: SectionKind::Skills,
                lines: r.skills.iter().cloned().map(DetailLine::Item).collect(),
            },
            DetailSection {
                kind: SectionKind::Experience,
                lines: std::iter::once(DetailLine::field(
                    "Past Experience",
                    r.past_experience.clone().unwrap_or_default(),
                ))
                .chain(std::iter::once(DetailLine::Heading("Certificates")))
                .chain(r.certificates.iter().cloned().map(DetailLine::Item))
                .collect(),
            },
            DetailSection {
                kind: SectionKind::Pricing,
                lines: vec![
                    DetailLine::field("Hourly", format!("${}", r.pricing.hourly)),
                    DetailLine::field("Daily", format!("${}", r.pricing.daily)),
                ],
            },
            DetailSection {
                kind: SectionKind::Availability,
                lines: vec![
                    DetailLine::field("Availability", &r.availability),
                    DetailLine::field("Travel Preference", r.travel_preference.label()),
                    DetailLine::field(
                        "Willing to Travel",
                        if r.willing_to_travel() { "Yes" } else { "No" },
                    ),
                ],
            },
        ];

        if self.role == Role::Admin {
            let admin = &r.admin_metadata;
            let mut lines = vec![
                DetailLine::field("Communication Score", admin.communication_score.to_string()),
                DetailLine::field("Expertise Score", admin.expertise_score.to_string()),
                DetailLine::field("Priority", admin.priority.to_string()),
            ];
            if !admin.red_flags.is_empty() {
                lines.push(DetailLine::Heading("Red Flags"));
                lines.extend(admin.red_flags.iter().cloned().map(DetailLine::Item));
            }
            lines.push(DetailLine::field("Comments", &admin.comments));
            sections.push(DetailSection {
                kind: SectionKind::Admin,
                lines,
            });
        }

        sections
    }

    /// Plain text rendering for the command line.
    pub fn to_text(&self) -> String {
        let mut out = format!("Trainer #{}: {}\n", self.record.id, self.record.name);
        for section in self.sections() {
            out.push_str(&format!("\n{}\n", section.kind.title()));
            for line in &section.lines {
                out.push_str(&line.to_text());
                out.push('\n');
            }
        }
        out
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, scroll: u16) {
        let area = match self.style {
            DetailStyle::Panel => area,
            DetailStyle::Overlay => {
                let popup = tui::centered_rect(70, 80, area);
                frame.render_widget(Clear, popup);
                popup
            }
        };

        let sections = self.sections();
        let mut lines: Vec<Line> = Vec::new();
        for section in &sections {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::from(section.kind.title()).bold().underlined());
            lines.extend(section.lines.iter().map(DetailLine::to_line));
        }

        let block = Block::new()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.record.name));
        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: false })
                .scroll((scroll, 0)),
            area,
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};
    use roster::{AdminMetadata, Pricing, Score, TrainerId, TravelPreference};

    fn jane() -> TrainerRecord {
        TrainerRecord {
            id: TrainerId(1),
            name: "Jane".into(),
            phone: "555-0100".into(),
            email: "jane@example.com".into(),
            skills: vec!["Yoga".into()],
            resume: "https://example.com/jane.pdf".into(),
            linkedin: "https://linkedin.com/in/jane".into(),
            past_experience: None,
            certificates: vec!["RYT-200".into()],
            pricing: Pricing {
                hourly: 50.into(),
                daily: 300.into(),
            },
            availability: "Mon-Fri".into(),
            travel_preference: TravelPreference::Remote,
            admin_metadata: AdminMetadata {
                communication_score: Score::new(90).unwrap(),
                expertise_score: Score::new(80).unwrap(),
                red_flags: Vec::new(),
                priority: Score::new(10).unwrap(),
                comments: "Great".into(),
            },
        }
    }

    fn field<'s>(sections: &'s [DetailSection], kind: SectionKind, label: &str) -> Option<&'s str> {
        sections
            .iter()
            .find(|s| s.kind == kind)?
            .lines
            .iter()
            .find_map(|l| match l {
                DetailLine::Field { label: l, value } if *l == label => Some(value.as_str()),
                _ => None,
            })
    }

    #[test]
    fn admin_text_projection() {
        let record = jane();
        let view = DetailView::new(&record, Role::Admin, DetailStyle::Panel);
        insta::assert_snapshot!(view.to_text(), @r"
        Trainer #1: Jane

        Contact Information
          Name: Jane
          Phone: 555-0100
          Email: jane@example.com
          Resume: https://example.com/jane.pdf
          LinkedIn: https://linkedin.com/in/jane

        Skills
          - Yoga

        Experience & Certifications
          Past Experience:
          Certificates:
          - RYT-200

        Pricing
          Hourly: $50
          Daily: $300

        Availability & Preferences
          Availability: Mon-Fri
          Travel Preference: Remote
          Willing to Travel: No

        Admin Section
          Communication Score: 90/100
          Expertise Score: 80/100
          Priority: 10/100
          Comments: Great
        ");
    }

    #[test]
    fn fractional_rates_show_as_entered() -> framework::Result<()> {
        let mut record = jane();
        record.pricing.hourly = roster::Rate::new(49.5)?;
        let sections = DetailView::new(&record, Role::Trainer, DetailStyle::Panel).sections();
        assert_eq!(field(&sections, SectionKind::Pricing, "Hourly"), Some("$49.5"));
        assert_eq!(field(&sections, SectionKind::Pricing, "Daily"), Some("$300"));
        Ok(())
    }

    #[test]
    fn fields_read_back_from_the_record() {
        let record = jane();
        let sections = DetailView::new(&record, Role::Admin, DetailStyle::Overlay).sections();
        assert_eq!(field(&sections, SectionKind::Contact, "Name"), Some(record.name.as_str()));
        assert_eq!(field(&sections, SectionKind::Contact, "Email"), Some(record.email.as_str()));
        assert_eq!(field(&sections, SectionKind::Contact, "Resume"), Some(record.resume.as_str()));
        assert_eq!(field(&sections, SectionKind::Availability, "Availability"), Some("Mon-Fri"));
        assert_eq!(field(&sections, SectionKind::Admin, "Comments"), Some("Great"));
        assert_eq!(field(&sections, SectionKind::Admin, "Expertise Score"), Some("80/100"));
    }

    #[test]
    fn red_flags_listed_only_when_present() {
        let mut record = jane();
        let view = DetailView::new(&record, Role::Admin, DetailStyle::Panel);
        assert!(!view.to_text().contains("Red Flags"));

        record.admin_metadata.red_flags = vec!["Late".into(), "No waiver".into()];
        let sections = DetailView::new(&record, Role::Admin, DetailStyle::Panel).sections();
        let admin = sections
            .iter()
            .find(|s| s.kind == SectionKind::Admin)
            .map(|s| s.lines.clone())
            .unwrap_or_default();
        let start = admin
            .iter()
            .position(|l| *l == DetailLine::Heading("Red Flags"))
            .unwrap();
        assert_eq!(
            admin[start + 1..start + 3],
            [DetailLine::Item("Late".into()), DetailLine::Item("No waiver".into())]
        );
    }

    #[test]
    fn trainers_never_see_the_admin_section() {
        let record = jane();
        let view = DetailView::new(&record, Role::Trainer, DetailStyle::Panel);
        assert!(view.sections().iter().all(|s| s.kind != SectionKind::Admin));
        assert!(!view.to_text().contains("Great"));
    }

    #[test]
    fn hidden_while_selection_is_closed() {
        let mut selection = Selection::default();
        assert!(DetailView::for_selection(&selection, Role::Admin, DetailStyle::Panel).is_none());
        selection.select(jane());
        let view = DetailView::for_selection(&selection, Role::Admin, DetailStyle::Panel);
        assert_eq!(view.map(|v| v.record().id), Some(TrainerId(1)));
    }

    #[test]
    fn overlay_renders_inside_the_screen() {
        let record = jane();
        let mut terminal = Terminal::new(TestBackend::new(80, 40)).unwrap();
        terminal
            .draw(|frame| {
                DetailView::new(&record, Role::Trainer, DetailStyle::Overlay).render(
                    frame,
                    frame.area(),
                    0,
                )
            })
            .unwrap();
        let text = tui::buffer_text(terminal.backend().buffer());
        assert!(text.contains("Contact Information"));
        assert!(text.contains("Willing to Travel: No"));
        // overlay leaves a margin around the popup
        assert!(text.lines().next().is_some_and(|l| l.trim().is_empty()));
    }
}
