pub mod analysis_llm;
pub mod clock;
pub mod db;
pub mod memory;

pub use analysis_llm::OpenAiAnalysisAdapter;
pub use clock::{FixedClock, SystemClock};
pub use db::DbAdapter;
pub use memory::InMemoryStore;
