pub mod admin;
pub mod token;
pub mod upload;
pub mod users;
