pub mod filter;
pub mod intent;
pub mod note;
pub mod temporal;
pub mod time_serde;

pub use filter::{
	FilterExpr, INTENT_KEY, IntentMembership, MetadataCondition, MetadataLookup, NumericCondition,
	NumericOp, SCHEDULED_FOR_KEY,
};
pub use intent::{Intent, ParseIntentError};
pub use note::{NewNote, NoteRecord};
pub use temporal::{RetrievalIntent, TemporalRange};
