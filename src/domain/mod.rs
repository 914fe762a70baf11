//! Pure domain logic: money arithmetic, order lifecycle, inventory ledger.

pub mod ledger;
pub mod lifecycle;
pub mod totals;
