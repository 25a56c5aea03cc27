mod category;
mod limit;
mod profile;
mod transaction;

pub use category::{Category, CategoryKind};
pub use limit::{Limit, LimitDraft, Period};
pub use profile::Profile;
pub use transaction::Transaction;
