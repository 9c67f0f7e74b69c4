// Resume documents: persistence, content validation and the HTTP handlers
// for editing, previewing and exporting them.

pub mod handlers;
pub mod store;
pub mod validation;

pub use store::{PgResumeStore, ResumeStore};
