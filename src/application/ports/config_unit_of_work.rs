use async_trait::async_trait;

use crate::application::ports::config_repository::ConfigRepository;
use crate::application::ports::form_repository::FormRepository;
use crate::application::ports::home_repository::HomeRepository;
use crate::application::ports::image_repository::ImageRepository;
use crate::application::ports::pattern_repository::PatternRepository;
use crate::application::ports::test_group_repository::TestGroupRepository;
use crate::application::ports::translation_repository::TranslationRepository;

/// Opens transactions spanning every table a configuration is made of.
#[async_trait]
pub trait ConfigUnitOfWork: Send + Sync {
    async fn begin<'a>(&'a self) -> anyhow::Result<Box<dyn ConfigTransaction + 'a>>;
}

/// Configuration repositories bound to one open transaction.
/// Dropping it without `commit` rolls every write back.
#[async_trait]
pub trait ConfigTransaction: Send + Sync {
    fn configs(&self) -> &dyn ConfigRepository;
    fn patterns(&self) -> &dyn PatternRepository;
    fn home(&self) -> &dyn HomeRepository;
    fn translations(&self) -> &dyn TranslationRepository;
    fn forms(&self) -> &dyn FormRepository;
    fn groups(&self) -> &dyn TestGroupRepository;
    fn images(&self) -> &dyn ImageRepository;
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
}
