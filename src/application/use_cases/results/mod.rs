pub mod export_results;
pub mod get_user_results;
