pub mod get_summaries;
