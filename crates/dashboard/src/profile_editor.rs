use framework::Result;
use roster::{TrainerRecord, TrainerRepository};

/// A trainer's working copy of their own skills and availability.
/// Changes reach the roster only through `save`.
#[derive(Clone, Debug)]
pub struct ProfileEditor {
    record: TrainerRecord,
    editing_skills: bool,
    editing_availability: bool,
}

impl ProfileEditor {
    pub fn new(record: TrainerRecord) -> Self {
        Self {
            record,
            editing_skills: false,
            editing_availability: false,
        }
    }

    pub fn record(&self) -> &TrainerRecord {
        &self.record
    }

    pub fn skills(&self) -> &[String] {
        &self.record.skills
    }

    pub fn availability(&self) -> &str {
        &self.record.availability
    }

    pub fn is_editing_skills(&self) -> bool {
        self.editing_skills
    }

    pub fn is_editing_availability(&self) -> bool {
        self.editing_availability
    }

    pub fn toggle_skills_edit(&mut self) {
        self.editing_skills = !self.editing_skills;
    }

    pub fn toggle_availability_edit(&mut self) {
        self.editing_availability = !self.editing_availability;
    }

    /// Appends a trimmed skill. Blank input and skills already listed
    /// are ignored. Returns whether the list changed.
    pub fn add_skill(&mut self, text: &str) -> bool {
        let skill = text.trim();
        if skill.is_empty() || self.record.skills.iter().any(|s| s == skill) {
            return false;
        }
        self.record.skills.push(skill.to_string());
        true
    }

    /// Removes the skill equal to `text`, if listed.
    pub fn remove_skill(&mut self, text: &str) -> bool {
        let before = self.record.skills.len();
        self.record.skills.retain(|s| s != text);
        self.record.skills.len() != before
    }

    pub fn set_availability(&mut self, text: &str) {
        self.record.availability = text.trim().to_string();
    }

    /// Commits the working copy and leaves both edit modes.
    pub fn save(&mut self, repository: &mut dyn TrainerRepository) -> Result<TrainerRecord> {
        let saved = repository.save(self.record.clone())?;
        tracing::info!(
            trainer = %saved.id,
            skills = saved.skills.len(),
            availability = %saved.availability,
            "saved trainer profile"
        );
        self.record = saved.clone();
        self.editing_skills = false;
        self.editing_availability = false;
        Ok(saved)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use roster::{MemoryRepository, TrainerId};

    fn editor() -> ProfileEditor {
        ProfileEditor::new(TrainerRecord {
            id: TrainerId(7),
            name: "Sam".into(),
            skills: vec!["Yoga".into()],
            availability: "Weekends".into(),
            ..Default::default()
        })
    }

    #[test]
    fn blank_skills_are_ignored() {
        let mut editor = editor();
        assert!(!editor.add_skill(""));
        assert!(!editor.add_skill("   "));
        assert_eq!(editor.skills(), ["Yoga"]);
    }

    #[test]
    fn added_skill_is_trimmed_and_appended_once() {
        let mut editor = editor();
        assert!(editor.add_skill("  Pilates "));
        assert!(!editor.add_skill("Pilates"));
        assert_eq!(editor.skills(), ["Yoga", "Pilates"]);
    }

    #[test]
    fn remove_needs_an_exact_match() {
        let mut editor = editor();
        assert!(!editor.remove_skill("yoga"));
        assert!(editor.remove_skill("Yoga"));
        assert!(editor.skills().is_empty());
    }

    #[test]
    fn edit_modes_toggle_independently() {
        let mut editor = editor();
        editor.toggle_skills_edit();
        assert!(editor.is_editing_skills());
        assert!(!editor.is_editing_availability());

        editor.toggle_availability_edit();
        editor.toggle_skills_edit();
        assert!(!editor.is_editing_skills());
        assert!(editor.is_editing_availability());
    }

    #[test]
    fn save_commits_and_leaves_edit_mode() -> Result<()> {
        let mut repository = MemoryRepository::from_records(vec![editor().record().clone()]);
        let mut editor = editor();
        editor.toggle_skills_edit();
        editor.toggle_availability_edit();
        editor.add_skill("Boxing");
        editor.set_availability(" Mon-Fri ");

        editor.save(&mut repository)?;
        assert!(!editor.is_editing_skills() && !editor.is_editing_availability());

        let stored = repository.get(TrainerId(7))?;
        assert_eq!(stored.as_ref().map(|r| r.skills.len()), Some(2));
        assert_eq!(stored.map(|r| r.availability), Some("Mon-Fri".to_string()));
        Ok(())
    }
}
