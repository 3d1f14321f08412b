//! dateme-store: Conversation persistence.
//!
//! [`SupabaseStore`] talks to the hosted PostgREST backend on behalf of the
//! signed-in user. [`MemoryStore`] keeps everything in process and is used
//! by tests and offline runs.

pub mod memory;
pub mod supabase;

pub use dateme_core::error::StoreError;
pub use memory::MemoryStore;
pub use supabase::SupabaseStore;
