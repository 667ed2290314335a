pub mod client;
pub mod types;

pub use client::YnabClient;
pub use types::{PatchTransaction, SaveTransaction, YnabTransactionDetail};
