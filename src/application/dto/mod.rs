pub mod attempts;
pub mod configs;
pub mod events;
pub mod forms;
pub mod images;
pub mod results;
pub mod test_groups;
pub mod users;
