pub mod clip;
pub mod creation;
