//! Read path over stored results plus the recruiter decision.

pub mod decision;
pub mod handlers;
pub mod ranking;
