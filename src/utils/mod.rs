pub mod dependency_check;
pub mod error_log;
pub mod input;
pub mod open_folder;
pub mod progress;
