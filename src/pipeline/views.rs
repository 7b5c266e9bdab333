use super::contact::Contact;
use super::engine::PipelineEngine;
use super::stage::Stage;
use std::fmt;

/// Working-day tab. Purely a grouping label for the UI: contacts carry no
/// day attribute and the selected day never filters anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkDay {
    #[default]
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl WorkDay {
    pub const ALL: [WorkDay; 5] = [
        WorkDay::Monday,
        WorkDay::Tuesday,
        WorkDay::Wednesday,
        WorkDay::Thursday,
        WorkDay::Friday,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WorkDay::Monday => "Monday",
            WorkDay::Tuesday => "Tuesday",
            WorkDay::Wednesday => "Wednesday",
            WorkDay::Thursday => "Thursday",
            WorkDay::Friday => "Friday",
        }
    }

    /// Accepts full names or three-letter abbreviations, any case.
    pub fn parse(input: &str) -> Option<WorkDay> {
        let input = input.trim();
        WorkDay::ALL.iter().copied().find(|d| {
            d.label().eq_ignore_ascii_case(input)
                || (input.len() == 3 && d.label()[..3].eq_ignore_ascii_case(input))
        })
    }
}

impl fmt::Display for WorkDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Current selector state of a front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub day: WorkDay,
    pub stage: Stage,
}

impl ViewState {
    /// Contacts shown for the current selection. Only the stage selects.
    pub fn visible<'a>(&self, engine: &'a PipelineEngine) -> Vec<&'a Contact> {
        engine.list_by_stage(self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_view() {
        let view = ViewState::default();
        assert_eq!(view.day, WorkDay::Monday);
        assert_eq!(view.stage, Stage::FirstEmail);
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(WorkDay::parse("wednesday"), Some(WorkDay::Wednesday));
        assert_eq!(WorkDay::parse("FRI"), Some(WorkDay::Friday));
        assert_eq!(WorkDay::parse("Saturday"), None);
        assert_eq!(WorkDay::parse("t"), None);
    }
}
