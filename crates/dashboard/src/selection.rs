use roster::TrainerRecord;

/// Which trainer the detail view is showing, if any.
///
/// Activating a row while open replaces the selection outright, so a
/// newer activation always wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Selection {
    #[default]
    Closed,
    Open(TrainerRecord),
}

impl Selection {
    pub fn select(&mut self, record: TrainerRecord) {
        tracing::debug!(trainer = %record.id, "selected trainer");
        *self = Self::Open(record);
    }

    pub fn dismiss(&mut self) {
        if self.is_open() {
            tracing::debug!("dismissed trainer detail");
        }
        *self = Self::Closed;
    }

    pub fn current(&self) -> Option<&TrainerRecord> {
        match self {
            Self::Closed => None,
            Self::Open(record) => Some(record),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }
}
