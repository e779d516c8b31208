//! Result set manager.
//!
//! Holds the flat list returned by a search and derives what is drawn from it:
//!
//! ```text
//! set_results ──> records ── sort (whole list, remembered) ──┐
//!                                                             v
//!                             page slice [(p-1)*size, p*size)
//!                                                             │
//!                                     group by field (page-local)
//!                                                             v
//!                                                    Vec<ResultGroup>
//! ```
//!
//! Nothing is cached between reads: every view is computed from the sorted
//! list, the page number and the group field passed in.

#[path = "results/pager.rs"]
mod pager;
#[path = "results/record.rs"]
mod record;
#[path = "results/sort.rs"]
mod sort;

pub use pager::{DEFAULT_PAGE_SIZE, ResultGroup, ResultSet, ResultView, UNCATEGORIZED};
pub use record::{FieldValue, ResultRecord};
pub use sort::{Collation, SortDirection, SortSpec};
