pub mod accounts;
pub mod event_logs;
pub mod forms;
pub mod images;
pub mod results;
pub mod test_groups;
