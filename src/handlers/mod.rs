pub mod grades;
pub mod reports;
pub mod themes;
