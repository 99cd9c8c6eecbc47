pub mod creation;
pub mod fitting;
