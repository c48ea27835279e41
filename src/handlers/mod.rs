pub mod dashboard;
pub mod directory;
pub mod records;
