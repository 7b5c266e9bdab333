use super::stage::Stage;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Number of positional fields an import row maps onto a contact.
pub const ROW_FIELDS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactId(Uuid);

impl ContactId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl Default for ContactId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A contact record. Treated as a value: the engine never edits one in
/// place, it builds the replacement with one of the `with_*` methods and
/// swaps the whole record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    pub entity_name: String,
    pub primary_contact_name: String,
    pub email_address: String,
    pub phone_number: String,
    pub company_profile_url: String,
    pub contact_profile_url: String,
    pub contact_social_url: String,
    pub notes: String,
    pub stage: Stage,
    pub attempted: bool,
    pub next_contact_date: Option<DateTime<Utc>>,
}

impl Contact {
    /// Build a fresh contact from a positional row. Fields past the eighth
    /// are ignored, missing ones become empty strings.
    pub fn from_row<S: AsRef<str>>(row: &[S]) -> Self {
        let field = |i: usize| {
            row.get(i)
                .map(|s| s.as_ref().to_string())
                .unwrap_or_default()
        };
        Self {
            id: ContactId::new(),
            entity_name: field(0),
            primary_contact_name: field(1),
            email_address: field(2),
            phone_number: field(3),
            company_profile_url: field(4),
            contact_profile_url: field(5),
            contact_social_url: field(6),
            notes: field(7),
            stage: Stage::FirstEmail,
            attempted: false,
            next_contact_date: None,
        }
    }

    /// Copy of this contact moved to `stage`, marked attempted, with the
    /// follow-up date set.
    pub fn with_transition(&self, stage: Stage, next_contact_date: DateTime<Utc>) -> Self {
        Self {
            stage,
            attempted: true,
            next_contact_date: Some(next_contact_date),
            ..self.clone()
        }
    }

    pub fn with_notes(&self, notes: String) -> Self {
        Self {
            notes,
            ..self.clone()
        }
    }
}
