//! Page link extraction and backlink reconciliation.

mod extract;
mod reconcile;
mod sync;

pub use extract::{extract_targets, PAGE_ID_ATTR};
pub use reconcile::{diff_links, LinkDiff, Reconciler};
pub use sync::LinkSync;
