pub mod date;
pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use date::ReportDate;
pub use enums::AlertLevel;
pub use error::CoreError;
pub use structs::{
    AlertTrigger, DailyReport, IngestedMessage, MonitoredChannel, NewChannel, NewDailyReport,
    NewMessage, NewTrigger,
};
