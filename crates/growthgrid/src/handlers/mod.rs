pub mod analytics;
pub mod entries;
pub mod error;
pub mod files;
pub mod health;
pub mod root;
pub mod uploads;

pub use error::AppError;
