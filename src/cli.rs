use crate::pipeline::{Contact, ContactId, PipelineEngine, Stage, ViewState, WorkDay};
use anyhow::Result;
use std::path::PathBuf;

/// Commands accepted at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Import(PathBuf),
    List,
    SelectStage(Stage),
    SelectDay(WorkDay),
    Advance(String),
    Enrich(String),
    Show(String),
    Help,
    Quit,
}

pub const HELP: &str = "\
  import <path>        append contacts from a comma-separated file (first line is a header)
  list                 show contacts in the selected stage
  stage <name|1-4>     select stage
  day <name>           select day tab
  advance <n|id>       mark attempted and move to the next stage
  enrich <n|id>        replace notes with generated profile insights
  show <n|id>          print one contact in full
  help                 this text
  quit                 exit";

impl Command {
    pub fn parse(line: &str) -> Result<Command> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let need_arg = |what: &str| -> Result<String> {
            if rest.is_empty() {
                anyhow::bail!("{} needs an argument", what);
            }
            Ok(rest.to_string())
        };

        let cmd = match verb.to_ascii_lowercase().as_str() {
            "import" => Command::Import(PathBuf::from(need_arg("import")?)),
            "list" | "ls" => Command::List,
            "stage" => {
                let arg = need_arg("stage")?;
                match Stage::parse(&arg) {
                    Some(s) => Command::SelectStage(s),
                    None => anyhow::bail!("unknown stage: {}", arg),
                }
            }
            "day" => {
                let arg = need_arg("day")?;
                match WorkDay::parse(&arg) {
                    Some(d) => Command::SelectDay(d),
                    None => anyhow::bail!("unknown day: {}", arg),
                }
            }
            "advance" | "a" => Command::Advance(need_arg("advance")?),
            "enrich" | "e" => Command::Enrich(need_arg("enrich")?),
            "show" => Command::Show(need_arg("show")?),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "" => anyhow::bail!("empty command"),
            other => anyhow::bail!("unknown command: {} (try 'help')", other),
        };
        Ok(cmd)
    }
}

/// Resolve a prompt target: a 1-based row of the current view, or a full id.
/// An id that names no contact is passed through; the engine treats it as a no-op.
pub fn resolve_target(engine: &PipelineEngine, view: &ViewState, token: &str) -> Option<ContactId> {
    if let Ok(n) = token.trim().parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| view.visible(engine).get(i).map(|c| c.id));
    }
    ContactId::parse(token)
}

pub fn format_row(n: usize, c: &Contact) -> String {
    let next = c
        .next_contact_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "  {:>3}  [{}] {:<24} {:<20} {:<28} next: {}",
        n,
        if c.attempted { "x" } else { " " },
        c.entity_name,
        c.primary_contact_name,
        c.email_address,
        next
    )
}

pub fn format_detail(c: &Contact) -> String {
    let next = c
        .next_contact_date
        .map(|d| d.to_rfc3339())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "  id:               {}\n\
         \x20 entity:           {}\n\
         \x20 primary contact:  {}\n\
         \x20 email:            {}\n\
         \x20 phone:            {}\n\
         \x20 company profile:  {}\n\
         \x20 contact profile:  {}\n\
         \x20 contact social:   {}\n\
         \x20 stage:            {}\n\
         \x20 attempted:        {}\n\
         \x20 next contact:     {}\n\
         \x20 notes:\n{}",
        c.id,
        c.entity_name,
        c.primary_contact_name,
        c.email_address,
        c.phone_number,
        c.company_profile_url,
        c.contact_profile_url,
        c.contact_social_url,
        c.stage,
        c.attempted,
        next,
        c.notes
    )
}
