pub mod draft;
pub mod listing;
pub mod profile;
pub mod report;
