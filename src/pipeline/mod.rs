pub mod contact;
pub mod engine;
pub mod stage;
pub mod views;

pub use contact::{Contact, ContactId};
pub use engine::{AdvanceOutcome, PipelineEngine, PipelineEvent, Transition, FOLLOW_UP_DAYS};
pub use stage::Stage;
pub use views::{ViewState, WorkDay};
