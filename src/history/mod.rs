pub mod model;
pub mod printer;
pub mod recorder;
pub mod storage;

pub use model::{HistoryEntry, RequestSnapshot, ResponseMeta};
pub use printer::{entry_details, find_entry, list_history, search_history, show_history};
pub use recorder::{HistorySink, NoHistory};
pub use storage::HistoryStorage;
