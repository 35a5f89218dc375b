pub mod application;
pub mod assessment;
pub mod result;
pub mod submission;
