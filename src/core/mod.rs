//! Core catalog-to-graph pipeline

pub mod assembler;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod overrides;
pub mod report;
