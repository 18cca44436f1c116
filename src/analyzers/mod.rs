//! Aggregations over reader and article views.
//!
//! Every function here is a pure function of the rows it is given. Rows
//! whose grouping key is missing are left out of their aggregation.

pub mod aggregate;
pub mod types;
pub mod utility;
