pub mod attempt_repository;
pub mod config_repository;
pub mod config_unit_of_work;
pub mod event_log_repository;
pub mod form_answer_repository;
pub mod form_repository;
pub mod home_repository;
pub mod image_repository;
pub mod image_storage;
pub mod pattern_repository;
pub mod test_group_repository;
pub mod translation_repository;
pub mod user_repository;
