pub mod core;
pub mod export;
pub mod filter;
pub mod group;
pub mod insights;
pub mod roster;
