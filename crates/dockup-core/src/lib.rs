//! Pure logic for dockup: the backup filename convention, the catalog view
//! over a bucket listing, the flag-to-workflow router, and configuration.
//! No I/O happens in this crate.

pub mod backup_name;
pub mod catalog;
pub mod config;
pub mod router;
