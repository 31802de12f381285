pub mod accrual;
pub mod catalog;
pub mod investments;
pub mod mpesa;
pub mod payments;
pub mod profiles;
pub mod referrals;
pub mod summary;
#[cfg(test)]
pub mod test_utils;
pub mod wallet;
pub mod withdrawals;

pub use accrual::Accrual;
pub use catalog::Catalog;
pub use investments::Investments;
pub use mpesa::Mpesa;
pub use payments::Payments;
pub use profiles::Profiles;
pub use referrals::Referrals;
pub use summary::Summary;
pub use wallet::Wallet;
pub use withdrawals::Withdrawals;
