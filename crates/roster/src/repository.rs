use crate::record::{AdminMetadata, Pricing, Rate, Score, TrainerId, TrainerRecord};
use framework::prelude::*;
use rusqlite::{OptionalExtension, Row, params};

/// The name of the SQL table holding trainers.
pub const TRAINER_TABLE: &str = "trainer";

/// The single source of truth for trainer records. Views read from
/// it; edits only become visible to other views once `save` returns.
pub trait TrainerRepository {
    /// Every record, in store order.
    fn all(&self) -> Result<Vec<TrainerRecord>>;

    fn get(&self, id: TrainerId) -> Result<Option<TrainerRecord>>;

    /// Looks a record up by email, ignoring ASCII case.
    fn find_by_email(&self, email: &str) -> Result<Option<TrainerRecord>> {
        Ok(self
            .all()?
            .into_iter()
            .find(|r| r.email.eq_ignore_ascii_case(email)))
    }

    /// Stores `record` under its id, replacing any existing record.
    /// Returns the record as stored.
    fn save(&mut self, record: TrainerRecord) -> Result<TrainerRecord>;

    /// Stores `record` under a freshly assigned id.
    fn insert_new(&mut self, record: TrainerRecord) -> Result<TrainerRecord>;

    fn len(&self) -> Result<usize> {
        Ok(self.all()?.len())
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Keeps records in a `Vec`. `all` hands them out by ascending id.
#[derive(Default, Debug, Clone)]
pub struct MemoryRepository {
    records: Vec<TrainerRecord>,
}

impl MemoryRepository {
    pub fn from_records(records: Vec<TrainerRecord>) -> Self {
        Self { records }
    }
}

impl TrainerRepository for MemoryRepository {
    fn all(&self) -> Result<Vec<TrainerRecord>> {
        let mut records = self.records.clone();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    fn get(&self, id: TrainerId) -> Result<Option<TrainerRecord>> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    fn save(&mut self, record: TrainerRecord) -> Result<TrainerRecord> {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => self.records.push(record.clone()),
        }
        Ok(record)
    }

    fn insert_new(&mut self, mut record: TrainerRecord) -> Result<TrainerRecord> {
        let next = self.records.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        record.id = TrainerId(next);
        self.records.push(record.clone());
        Ok(record)
    }
}

/// The schema used by the SQLite implementation. List fields are
/// stored as JSON arrays.
pub fn trainer_table() -> TableConfig {
    TableConfig::new(TRAINER_TABLE)
        .column("name", "TEXT NOT NULL DEFAULT ''")
        .column("phone", "TEXT NOT NULL DEFAULT ''")
        .column("email", "TEXT NOT NULL DEFAULT ''")
        .column("skills", "TEXT NOT NULL DEFAULT '[]'")
        .column("resume", "TEXT NOT NULL DEFAULT ''")
        .column("linkedin", "TEXT NOT NULL DEFAULT ''")
        .column("past_experience", "TEXT")
        .column("certificates", "TEXT NOT NULL DEFAULT '[]'")
        .column("hourly_rate", "REAL NOT NULL DEFAULT 0")
        .column("daily_rate", "REAL NOT NULL DEFAULT 0")
        .column("availability", "TEXT NOT NULL DEFAULT ''")
        .column("travel_preference", "TEXT NOT NULL DEFAULT ''")
        .column("communication_score", "INTEGER NOT NULL DEFAULT 0")
        .column("expertise_score", "INTEGER NOT NULL DEFAULT 0")
        .column("priority", "INTEGER NOT NULL DEFAULT 0")
        .column("red_flags", "TEXT NOT NULL DEFAULT '[]'")
        .column("comments", "TEXT NOT NULL DEFAULT ''")
}

const SELECT_COLUMNS: &str = "id, name, phone, email, skills, resume, linkedin, \
    past_experience, certificates, hourly_rate, daily_rate, availability, \
    travel_preference, communication_score, expertise_score, priority, \
    red_flags, comments";

const INSERT_COLUMNS: &str = "name, phone, email, skills, resume, linkedin, \
    past_experience, certificates, hourly_rate, daily_rate, availability, \
    travel_preference, communication_score, expertise_score, priority, \
    red_flags, comments";

impl TrainerRepository for DbConnection {
    fn all(&self) -> Result<Vec<TrainerRecord>> {
        let connection = self.connection()?;
        let mut select = connection.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM {TRAINER_TABLE} ORDER BY id"
        ))?;
        let stored = select
            .query_map([], StoredTrainer::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        stored.into_iter().map(TrainerRecord::try_from).collect()
    }

    fn get(&self, id: TrainerId) -> Result<Option<TrainerRecord>> {
        let stored = self
            .connection()?
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM {TRAINER_TABLE} WHERE id = ?1"),
                [id.0],
                StoredTrainer::from_row,
            )
            .optional()?;
        stored.map(TrainerRecord::try_from).transpose()
    }

    fn save(&mut self, record: TrainerRecord) -> Result<TrainerRecord> {
        let values = StoredTrainer::from_record(&record)?;
        self.connection()?.execute(
            &format!(
                "INSERT OR REPLACE INTO {TRAINER_TABLE} (id, {INSERT_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
            ),
            params![
                record.id.0,
                values.name,
                values.phone,
                values.email,
                values.skills,
                values.resume,
                values.linkedin,
                values.past_experience,
                values.certificates,
                values.hourly_rate,
                values.daily_rate,
                values.availability,
                values.travel_preference,
                values.communication_score,
                values.expertise_score,
                values.priority,
                values.red_flags,
                values.comments,
            ],
        )?;
        Ok(record)
    }

    fn insert_new(&mut self, mut record: TrainerRecord) -> Result<TrainerRecord> {
        let values = StoredTrainer::from_record(&record)?;
        let connection = self.connection()?;
        connection.execute(
            &format!(
                "INSERT INTO {TRAINER_TABLE} ({INSERT_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"
            ),
            params![
                values.name,
                values.phone,
                values.email,
                values.skills,
                values.resume,
                values.linkedin,
                values.past_experience,
                values.certificates,
                values.hourly_rate,
                values.daily_rate,
                values.availability,
                values.travel_preference,
                values.communication_score,
                values.expertise_score,
                values.priority,
                values.red_flags,
                values.comments,
            ],
        )?;
        record.id = TrainerId(connection.last_insert_rowid());
        Ok(record)
    }

    fn len(&self) -> Result<usize> {
        let count = self.row_count(TRAINER_TABLE)?;
        usize::try_from(count).map_err(|e| Error::new(e.to_string()))
    }
}

/// One row of the trainer table, in SQL-friendly types.
struct StoredTrainer {
    id: i64,
    name: String,
    phone: String,
    email: String,
    skills: String,
    resume: String,
    linkedin: String,
    past_experience: Option<String>,
    certificates: String,
    hourly_rate: f64,
    daily_rate: f64,
    availability: String,
    travel_preference: String,
    communication_score: i64,
    expertise_score: i64,
    priority: i64,
    red_flags: String,
    comments: String,
}

impl StoredTrainer {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            phone: row.get("phone")?,
            email: row.get("email")?,
            skills: row.get("skills")?,
            resume: row.get("resume")?,
            linkedin: row.get("linkedin")?,
            past_experience: row.get("past_experience")?,
            certificates: row.get("certificates")?,
            hourly_rate: row.get("hourly_rate")?,
            daily_rate: row.get("daily_rate")?,
            availability: row.get("availability")?,
            travel_preference: row.get("travel_preference")?,
            communication_score: row.get("communication_score")?,
            expertise_score: row.get("expertise_score")?,
            priority: row.get("priority")?,
            red_flags: row.get("red_flags")?,
            comments: row.get("comments")?,
        })
    }

    fn from_record(record: &TrainerRecord) -> Result<Self> {
        let meta = &record.admin_metadata;
        Ok(Self {
            id: record.id.0,
            name: record.name.clone(),
            phone: record.phone.clone(),
            email: record.email.clone(),
            skills: serde_json::to_string(&record.skills)?,
            resume: record.resume.clone(),
            linkedin: record.linkedin.clone(),
            past_experience: record.past_experience.clone(),
            certificates: serde_json::to_string(&record.certificates)?,
            hourly_rate: record.pricing.hourly.value(),
            daily_rate: record.pricing.daily.value(),
            availability: record.availability.clone(),
            travel_preference: record.travel_preference.label().to_string(),
            communication_score: meta.communication_score.into(),
            expertise_score: meta.expertise_score.into(),
            priority: meta.priority.into(),
            red_flags: serde_json::to_string(&meta.red_flags)?,
            comments: meta.comments.clone(),
        })
    }
}

impl TryFrom<StoredTrainer> for TrainerRecord {
    type Error = Error;

    fn try_from(stored: StoredTrainer) -> Result<Self> {
        Ok(Self {
            id: TrainerId(stored.id),
            name: stored.name,
            phone: stored.phone,
            email: stored.email,
            skills: serde_json::from_str(&stored.skills)?,
            resume: stored.resume,
            linkedin: stored.linkedin,
            past_experience: stored.past_experience,
            certificates: serde_json::from_str(&stored.certificates)?,
            pricing: Pricing {
                hourly: Rate::new(stored.hourly_rate)?,
                daily: Rate::new(stored.daily_rate)?,
            },
            availability: stored.availability,
            travel_preference: stored.travel_preference.into(),
            admin_metadata: AdminMetadata {
                communication_score: Score::new(stored.communication_score)?,
                expertise_score: Score::new(stored.expertise_score)?,
                red_flags: serde_json::from_str(&stored.red_flags)?,
                priority: Score::new(stored.priority)?,
                comments: stored.comments,
            },
        })
    }
}
