//! Persistence models: blueprint snapshots, conversation state rows, FAQ entries.

mod blueprint_record;
mod faq_entry;
mod state_record;

pub use blueprint_record::BlueprintRecord;
pub use faq_entry::FaqEntry;
pub use state_record::StateRecord;
