//! Org onboarding synchronizer.
//!
//! Drives the two flows: [`invite::run`] and [`teams::run`]. Each one checks
//! access, reads a snapshot of the organization through
//! [`onboarding::OrgDirectory`], asks the pure planners in [`onboarding::plan`]
//! for the difference, and applies it unless running dry.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** This crate sequences calls between the domain
//! planners and the port. It contains no domain rules of its own and no
//! transport details.
//!
//! ## Execution model
//!
//! Strictly sequential: one API call at a time, in plan order. An interrupted
//! run leaves whatever succeeded in place; re-running resumes from there
//! because the next snapshot reflects it.

pub mod apply;
pub mod invite;
pub mod snapshot;
pub mod teams;

#[cfg(test)]
mod testing;

pub use apply::{apply_plan, ApplySettings};
pub use invite::InviteOptions;
pub use teams::TeamOptions;
