//! Knowledge base loading, caching, and relevance selection.
//!
//! Three pieces:
//! - [`ics`]: a minimal iCalendar decoder for the institutional calendar feed
//! - [`store`]: the TTL-cached snapshot loader
//! - [`selector`]: keyword-based relevance selection over a snapshot

pub mod ics;
pub mod selector;
pub mod store;

pub use selector::KeywordSelector;
pub use store::KnowledgeStore;
