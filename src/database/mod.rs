pub mod admin;
pub mod contact;
pub mod models;
pub mod pool;
pub mod projects;
pub mod resumes;
pub mod users;
