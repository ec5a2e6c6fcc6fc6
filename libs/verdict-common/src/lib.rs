pub mod question;
pub mod types;
