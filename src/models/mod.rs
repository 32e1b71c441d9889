pub mod amount;
pub mod entry;
pub mod notification;
pub mod summary;
pub mod user;

pub use amount::checked_amount;
pub use entry::{DamageEntry, NewDamage, NewRevenue, NewStock, RevenueEntry, StockEntry};
pub use notification::Notification;
pub use summary::DailySummary;
pub use user::{NewUser, User};
