pub mod participant;
pub mod validation;
pub mod wheel;
