//! Run outputs that are not document-store writes.
//!
//! # Submodules
//!
//! - [`chart`]: Renders the ranked word list as an SVG bar chart
//! - [`grouping`]: Prints stored articles grouped by update date
//!
//! Both are best-effort: a failure is logged and the run carries on.

pub mod chart;
pub mod grouping;
