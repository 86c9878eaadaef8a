use std::sync::Arc;

use crate::application::ports::attempt_repository::AttemptRepository;
use crate::application::ports::config_repository::ConfigRepository;
use crate::application::ports::config_unit_of_work::ConfigUnitOfWork;
use crate::application::ports::event_log_repository::EventLogRepository;
use crate::application::ports::form_answer_repository::FormAnswerRepository;
use crate::application::ports::form_repository::FormRepository;
use crate::application::ports::home_repository::HomeRepository;
use crate::application::ports::image_repository::ImageRepository;
use crate::application::ports::image_storage::ImageStorage;
use crate::application::ports::pattern_repository::PatternRepository;
use crate::application::ports::test_group_repository::TestGroupRepository;
use crate::application::ports::translation_repository::TranslationRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::images::Images;
use crate::application::services::results::ResultPorts;
use crate::application::use_cases::ConfigPorts;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    user_repo: Arc<dyn UserRepository>,
    pattern_repo: Arc<dyn PatternRepository>,
    config_repo: Arc<dyn ConfigRepository>,
    home_repo: Arc<dyn HomeRepository>,
    translation_repo: Arc<dyn TranslationRepository>,
    form_repo: Arc<dyn FormRepository>,
    form_answer_repo: Arc<dyn FormAnswerRepository>,
    test_group_repo: Arc<dyn TestGroupRepository>,
    attempt_repo: Arc<dyn AttemptRepository>,
    event_log_repo: Arc<dyn EventLogRepository>,
    image_repo: Arc<dyn ImageRepository>,
    image_storage: Arc<dyn ImageStorage>,
    config_unit: Arc<dyn ConfigUnitOfWork>,
}

impl AppServices {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        pattern_repo: Arc<dyn PatternRepository>,
        config_repo: Arc<dyn ConfigRepository>,
        home_repo: Arc<dyn HomeRepository>,
        translation_repo: Arc<dyn TranslationRepository>,
        form_repo: Arc<dyn FormRepository>,
        form_answer_repo: Arc<dyn FormAnswerRepository>,
        test_group_repo: Arc<dyn TestGroupRepository>,
        attempt_repo: Arc<dyn AttemptRepository>,
        event_log_repo: Arc<dyn EventLogRepository>,
        image_repo: Arc<dyn ImageRepository>,
        image_storage: Arc<dyn ImageStorage>,
        config_unit: Arc<dyn ConfigUnitOfWork>,
    ) -> Self {
        Self {
            user_repo,
            pattern_repo,
            config_repo,
            home_repo,
            translation_repo,
            form_repo,
            form_answer_repo,
            test_group_repo,
            attempt_repo,
            event_log_repo,
            image_repo,
            image_storage,
            config_unit,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn pattern_repo(&self) -> Arc<dyn PatternRepository> {
        self.services.pattern_repo.clone()
    }

    pub fn config_repo(&self) -> Arc<dyn ConfigRepository> {
        self.services.config_repo.clone()
    }

    pub fn form_repo(&self) -> Arc<dyn FormRepository> {
        self.services.form_repo.clone()
    }

    pub fn form_answer_repo(&self) -> Arc<dyn FormAnswerRepository> {
        self.services.form_answer_repo.clone()
    }

    pub fn test_group_repo(&self) -> Arc<dyn TestGroupRepository> {
        self.services.test_group_repo.clone()
    }

    pub fn attempt_repo(&self) -> Arc<dyn AttemptRepository> {
        self.services.attempt_repo.clone()
    }

    pub fn event_log_repo(&self) -> Arc<dyn EventLogRepository> {
        self.services.event_log_repo.clone()
    }

    pub fn config_unit(&self) -> Arc<dyn ConfigUnitOfWork> {
        self.services.config_unit.clone()
    }

    /// Image rows and files plus the public URL prefix, borrowed from the context.
    pub fn images(&self) -> Images<'_> {
        Images {
            repo: self.services.image_repo.as_ref(),
            storage: self.services.image_storage.as_ref(),
            base_url: &self.cfg.images_base_url,
        }
    }

    pub fn config_ports(&self) -> ConfigPorts<'_> {
        let s = &self.services;
        ConfigPorts {
            configs: s.config_repo.as_ref(),
            patterns: s.pattern_repo.as_ref(),
            home: s.home_repo.as_ref(),
            translations: s.translation_repo.as_ref(),
            forms: s.form_repo.as_ref(),
            groups: s.test_group_repo.as_ref(),
            images: self.images(),
        }
    }

    pub fn result_ports(&self) -> ResultPorts<'_> {
        let s = &self.services;
        ResultPorts {
            attempts: s.attempt_repo.as_ref(),
            answers: s.form_answer_repo.as_ref(),
            events: s.event_log_repo.as_ref(),
        }
    }
}
