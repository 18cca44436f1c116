//! Dashboard front ends.
//!
//! Both dashboards are built on the same loader, join and aggregation
//! pipeline. The overview works on the whole dataset; the master dashboard
//! works on a filtered view taken from a [`Session`](crate::session::Session).

pub mod master;
pub mod overview;
pub mod views;

pub use master::{MasterDashboard, MasterTab};
pub use overview::OverviewDashboard;
