// Business domains
pub mod documents;
pub mod extraction;
