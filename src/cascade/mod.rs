//! Level cascading and count reconciliation

pub mod cascader;
pub mod reconciler;

pub use cascader::{cascade, cascade_one};
pub use reconciler::{reconcile, sort_by_order, PendingReset, Reconciled};
