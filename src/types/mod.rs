pub mod columns;
pub mod region;
pub mod season;
pub mod stage;
