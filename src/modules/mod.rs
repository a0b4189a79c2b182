pub mod assignments;
pub mod auth;
pub mod exams;
pub mod roles;
pub mod users;
