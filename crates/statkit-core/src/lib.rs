mod descriptive;
pub mod engine;
pub mod error;
pub mod format;
pub mod formula;
pub mod history;
pub mod inference;
pub mod input;
pub mod reference;
pub mod result;
pub mod solver;
pub mod store;

pub use engine::evaluate;
pub use error::{StatError, StatResult};
pub use formula::{FormulaId, FormulaSpec, InputKind, InputStep, SelectOption};
pub use history::{HistoryEntry, HISTORY_LIMIT};
pub use inference::ConfidenceLevel;
pub use input::{count_valid_numbers, parse_number_list, InputValues};
pub use result::{CalculationResult, DerivationStep};
pub use solver::{ChatMessage, ChatRequest, SolverRoute};
pub use store::PreferenceStore;
