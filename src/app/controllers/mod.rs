//! Controllers layer - orchestration and coordination.
//!
//! This module contains controllers that coordinate between
//! domain models, services, and the UI:
//! - Toolbar state reconciliation and toolbar commands
//! - Dropdown open/close tracking
//! - The editor session (engine, read-only flag, import/export)

pub mod dropdown;
pub mod session;
pub mod toolbar;
