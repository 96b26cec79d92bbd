// Export components
pub mod digest;
pub mod digest_cache;
pub mod google_calendar;
pub mod orchestrator;

pub use digest_cache::DigestCache;
pub use orchestrator::Orchestrator;
