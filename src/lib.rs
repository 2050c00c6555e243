//! Core of a single-operator library circulation system: a book catalog, a
//! patron registry and the loan ledger that coordinates them, persisted to a
//! local embedded database as CBOR snapshots.

pub mod archive;
pub mod audit;
pub mod auth;
pub mod book;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod loan;
pub mod patron;
pub mod registry;
pub mod service;
pub mod validate;
