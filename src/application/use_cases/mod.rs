pub mod admins;
pub mod attempts;
pub mod auth;
pub mod configs;
pub mod event_logs;
pub mod forms;
pub mod patterns;
pub mod results;
pub mod summaries;
pub mod users;

use crate::application::ports::config_repository::ConfigRepository;
use crate::application::ports::form_repository::FormRepository;
use crate::application::ports::home_repository::HomeRepository;
use crate::application::ports::pattern_repository::PatternRepository;
use crate::application::ports::test_group_repository::TestGroupRepository;
use crate::application::ports::translation_repository::TranslationRepository;
use crate::application::services::images::Images;

/// Everything a configuration is made of, borrowed for the duration of one use case.
pub struct ConfigPorts<'a> {
    pub configs: &'a dyn ConfigRepository,
    pub patterns: &'a dyn PatternRepository,
    pub home: &'a dyn HomeRepository,
    pub translations: &'a dyn TranslationRepository,
    pub forms: &'a dyn FormRepository,
    pub groups: &'a dyn TestGroupRepository,
    pub images: Images<'a>,
}
