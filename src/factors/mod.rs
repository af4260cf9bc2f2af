//! Coverage factor matching and combination synchronization

pub mod matcher;
pub mod sync;

pub use matcher::{find_combination_for_row, match_factor_set, value_exists_in_stored_data};
pub use sync::{build_row_table, sync_combinations, sync_single_combination, FactorRow};
