//! `fineease-donations`: contributions against approved NGOs.

pub mod donation;
pub mod ledger;
pub mod store;

pub use donation::{Amount, DonationRecord, DonationTotals, NewDonation};
pub use ledger::DonationLedger;
pub use store::DonationStore;
