pub mod attendance;
pub mod directory;
pub mod sales;

pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use directory::{Employee, Store};
pub use sales::{ProductLine, SalesRecord};
