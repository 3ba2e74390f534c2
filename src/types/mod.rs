// PulseFlow shared type definitions

pub mod config;
pub mod errors;
