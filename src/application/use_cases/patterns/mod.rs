pub mod list_patterns;
