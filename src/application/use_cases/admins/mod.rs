pub mod create_admin;
pub mod list_admins;
