pub mod account;
pub mod geo;
pub mod merchant;
pub mod money;
pub mod period;
pub mod ranking;
pub mod receipt;
pub mod settings;
pub mod statement;
pub mod transaction;

pub use account::{Account, AccountId, AccountKind, LedgerError};
pub use geo::{distance, Coordinate, EARTH_RADIUS_MILES};
pub use merchant::{LocationId, Merchant, MerchantId, MerchantLocation};
pub use money::Money;
pub use period::DateRange;
pub use ranking::{rank, RankError, RankedLocation};
pub use receipt::{reconcile, DraftTransaction, ReceiptMetadata, Reconciliation};
pub use settings::{Settings, SettingsError, DEFAULT_MATCH_RADIUS_MILES};
pub use statement::Statement;
pub use transaction::{Amount, Tag, Transaction, TransactionId};
