mod chat_entry;
mod document;
mod media_type;

pub use chat_entry::ChatEntry;
pub use document::{Document, DocumentBuilder};
pub use media_type::MediaType;
