pub mod catalog;
pub mod database;
pub mod image;
pub mod member;
