pub mod daily_commission;
pub mod investment;
pub mod package;
pub mod pending_payment;
pub mod profile;
pub mod referral;
pub mod transaction;
pub mod withdrawal;

pub use investment::InvestmentStatus;
#[allow(unused_imports)]
pub use package::PackageType;
#[allow(unused_imports)]
pub use pending_payment::PaymentState;
#[allow(unused_imports)]
pub use profile::UserRole;
#[allow(unused_imports)]
pub use transaction::{TransactionStatus, TransactionType};
#[allow(unused_imports)]
pub use withdrawal::WithdrawalStatus;
