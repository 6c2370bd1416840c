pub mod employee_service;
pub mod participant_service;
pub mod session_service;
