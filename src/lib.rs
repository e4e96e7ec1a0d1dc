//! Ledger Engine library crate.
//!
//! This crate exposes the payroll and profit-and-loss calculation
//! core of a multi-site ERP as reusable modules.  External
//! applications may depend on the `ledger_engine` crate and call
//! into [`payroll::run_payroll`] / [`pnl::compute_profit_and_loss`]
//! directly, or embed the API via [`api::build_router`].
//!
//! The engine is pure: it computes over record snapshots handed to
//! it by the caller and never reads or writes a store of its own.

pub mod api;
pub mod error;
pub mod models;
pub mod payroll;
pub mod period;
pub mod pnl;
