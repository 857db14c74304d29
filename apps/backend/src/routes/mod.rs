pub mod auth;
pub mod review;
pub mod users;
pub mod words;
