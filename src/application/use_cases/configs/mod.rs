pub mod activate_config;
pub mod clone_config;
pub mod delete_config;
pub mod get_config;
pub mod list_configs;
mod sync_forms;
mod sync_groups;
mod sync_home;
pub mod update_config;

use std::collections::HashSet;

use crate::application::errors::{ApiError, FieldErrors};

fn removed_ids(existing: impl IntoIterator<Item = u32>, kept: &HashSet<u32>) -> Vec<u32> {
    existing.into_iter().filter(|id| !kept.contains(id)).collect()
}

fn first_used(ids: &[u32], used: &HashSet<u32>) -> Option<u32> {
    ids.iter().copied().find(|id| used.contains(id))
}

fn has_user_data(kind: &str, id: u32) -> ApiError {
    ApiError::conflict(format!(
        "{kind} with id {id} has user data related to it and cannot be deleted"
    ))
}

fn check_len(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min || len > max {
        if min == 0 {
            errors.push(field, format!("Must be at most {max} characters long"));
        } else {
            errors.push(field, format!("Must be between {min} and {max} characters long"));
        }
    }
}
