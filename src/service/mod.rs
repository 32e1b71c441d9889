pub mod account;
pub mod clock;
pub mod ledger;
pub mod summary;

pub use account::AccountService;
pub use clock::BusinessClock;
pub use ledger::LedgerService;
pub use summary::{SummaryOutcome, SummaryService};
