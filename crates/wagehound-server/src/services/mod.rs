pub mod export;
pub mod reconcile;
pub mod reports;
