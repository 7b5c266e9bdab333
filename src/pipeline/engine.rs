use super::contact::{Contact, ContactId};
use super::stage::Stage;
use crate::collab::types::Reminder;
use crate::collab::{Enricher, Scheduler};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Calendar days between a transition and the next contact attempt.
pub const FOLLOW_UP_DAYS: i64 = 7;

/// Events pushed to an observer channel, if one is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Every contact still in `stage` has been attempted.
    StageCleared { stage: Stage },
}

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub contact: Contact,
    pub from: Stage,
    /// False when the scheduler failed; the transition still committed.
    pub reminder_scheduled: bool,
    pub stage_cleared: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Unknown id. Nothing changed.
    NotFound,
    /// Contact already at the last stage. Nothing changed.
    Terminal,
    Advanced(Transition),
}

impl AdvanceOutcome {
    /// The stage that was cleared by this call, if any.
    pub fn cleared_stage(&self) -> Option<Stage> {
        match self {
            AdvanceOutcome::Advanced(t) if t.stage_cleared => Some(t.from),
            _ => None,
        }
    }
}

/// Owns the contact collection and runs every mutation on it. Records are
/// kept in import order; `index` maps ids to positions.
pub struct PipelineEngine {
    contacts: Vec<Contact>,
    index: HashMap<ContactId, usize>,
    scheduler: Arc<dyn Scheduler>,
    enricher: Arc<dyn Enricher>,
    events: Option<mpsc::Sender<PipelineEvent>>,
}

impl PipelineEngine {
    pub fn new(scheduler: Arc<dyn Scheduler>, enricher: Arc<dyn Enricher>) -> Self {
        Self {
            contacts: Vec::new(),
            index: HashMap::new(),
            scheduler,
            enricher,
            events: None,
        }
    }

    pub fn with_events(mut self, tx: mpsc::Sender<PipelineEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.index.get(&id).map(|&i| &self.contacts[i])
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Contacts currently in `stage`, in collection order.
    pub fn list_by_stage(&self, stage: Stage) -> Vec<&Contact> {
        self.contacts.iter().filter(|c| c.stage == stage).collect()
    }

    /// True when every contact in `stage` is attempted. Vacuously true for
    /// an empty stage.
    pub fn is_stage_cleared(&self, stage: Stage) -> bool {
        self.contacts
            .iter()
            .filter(|c| c.stage == stage)
            .all(|c| c.attempted)
    }

    /// Append one contact per row, skipping the first row as a header.
    /// Returns the new records.
    pub fn import_contacts<R, S>(&mut self, rows: &[R]) -> Vec<Contact>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let added: Vec<Contact> = rows
            .iter()
            .skip(1)
            .map(|row| Contact::from_row(AsRef::<[S]>::as_ref(row)))
            .collect();

        for contact in &added {
            self.index.insert(contact.id, self.contacts.len());
            self.contacts.push(contact.clone());
        }

        tracing::info!(
            rows = rows.len(),
            imported = added.len(),
            total = self.contacts.len(),
            "contacts imported"
        );
        added
    }

    pub async fn advance(&mut self, id: ContactId) -> AdvanceOutcome {
        self.advance_at(id, Utc::now()).await
    }

    /// Move a contact to the next stage as of `now`: schedule the follow-up,
    /// commit the new record, then check whether the stage it left is cleared.
    pub async fn advance_at(&mut self, id: ContactId, now: DateTime<Utc>) -> AdvanceOutcome {
        let Some(&pos) = self.index.get(&id) else {
            tracing::debug!(contact_id = %id, "advance: unknown contact");
            return AdvanceOutcome::NotFound;
        };
        let current = &self.contacts[pos];
        let from = current.stage;
        let Some(next) = from.successor() else {
            tracing::debug!(contact_id = %id, stage = %from, "advance: already at final stage");
            return AdvanceOutcome::Terminal;
        };

        let next_contact_date = now + Duration::days(FOLLOW_UP_DAYS);
        let reminder = Reminder {
            title: format!("{} - {}", next.label(), current.entity_name),
            description: format!(
                "Follow up with {} from {}",
                current.primary_contact_name, current.entity_name
            ),
            start: next_contact_date,
            end: next_contact_date + Duration::days(1),
        };
        let updated = current.with_transition(next, next_contact_date);

        let reminder_scheduled = match self.scheduler.create(&reminder).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    contact_id = %id,
                    title = %reminder.title,
                    error = %format!("{:#}", e),
                    "follow-up reminder not scheduled, advancing anyway"
                );
                false
            }
        };

        self.contacts[pos] = updated.clone();
        tracing::info!(
            contact_id = %id,
            from = %from,
            to = %next,
            next_contact = %next_contact_date.format("%Y-%m-%d"),
            "contact advanced"
        );

        let stage_cleared = self.is_stage_cleared(from);
        if stage_cleared {
            tracing::info!(stage = %from, "stage cleared");
            self.emit(PipelineEvent::StageCleared { stage: from });
        }

        AdvanceOutcome::Advanced(Transition {
            contact: updated,
            from,
            reminder_scheduled,
            stage_cleared,
        })
    }

    /// Overwrite a contact's notes with enricher output for its profile
    /// URLs. On enricher failure the contact is left as it was and the
    /// error is returned. Unknown ids yield `Ok(None)`.
    pub async fn enrich(&mut self, id: ContactId) -> Result<Option<Contact>> {
        let Some(&pos) = self.index.get(&id) else {
            tracing::debug!(contact_id = %id, "enrich: unknown contact");
            return Ok(None);
        };
        let current = &self.contacts[pos];

        let notes = match self
            .enricher
            .generate(&current.contact_profile_url, &current.contact_social_url)
            .await
        {
            Ok(text) => text.unwrap_or_default(),
            Err(e) => {
                tracing::error!(contact_id = %id, error = %format!("{:#}", e), "enrichment failed");
                return Err(e.context(format!("enrichment failed for contact {}", id)));
            }
        };

        let updated = self.contacts[pos].with_notes(notes);
        self.contacts[pos] = updated.clone();
        tracing::info!(contact_id = %id, chars = updated.notes.len(), "contact enriched");
        Ok(Some(updated))
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.events {
            if let Err(e) = tx.try_send(event) {
                tracing::debug!(error = %e, "pipeline event dropped");
            }
        }
    }
}
