//! Record types shared by the club store and its front ends

pub mod aggregate;
pub mod models;

pub use aggregate::AppData;
pub use models::*;
