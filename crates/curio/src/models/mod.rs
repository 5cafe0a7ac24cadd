//! Data models shared by every pipeline stage

pub mod conversation;
pub mod corpus;
pub mod matches;
pub mod metadata;
pub mod result;

pub use conversation::{ConversationHistory, ConversationTurn, Role};
pub use corpus::Corpus;
pub use matches::{round_distance, RetrievedMatch};
pub use metadata::{raw_from_json, CourseMetadata, EventMetadata, FacultyMetadata, ItemMetadata, RawMetadata};
pub use result::PipelineResult;
