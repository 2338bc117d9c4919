mod ledger;
mod role;

pub use ledger::Ledger;
pub use role::{ReplicaRole, Role};
