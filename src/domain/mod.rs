pub mod events;
pub mod forms;
pub mod images;
pub mod test_groups;
pub mod users;
