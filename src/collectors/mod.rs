pub mod catalog;
pub mod logs;
pub mod serial;
