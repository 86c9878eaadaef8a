use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::ports::config_repository::ConfigRepository;
use crate::application::ports::config_unit_of_work::{ConfigTransaction, ConfigUnitOfWork};
use crate::application::ports::form_repository::FormRepository;
use crate::application::ports::home_repository::HomeRepository;
use crate::application::ports::image_repository::ImageRepository;
use crate::application::ports::pattern_repository::PatternRepository;
use crate::application::ports::test_group_repository::TestGroupRepository;
use crate::application::ports::translation_repository::TranslationRepository;
use crate::infrastructure::db::repositories::{
    config_repository_sqlx::SqlxConfigRepository, form_repository_sqlx::SqlxFormRepository,
    home_repository_sqlx::SqlxHomeRepository, image_repository_sqlx::SqlxImageRepository,
    pattern_repository_sqlx::SqlxPatternRepository,
    test_group_repository_sqlx::SqlxTestGroupRepository,
    translation_repository_sqlx::SqlxTranslationRepository,
};
use crate::infrastructure::db::{Db, MySqlPool, SharedTransaction};

pub struct SqlxConfigUnitOfWork {
    pool: MySqlPool,
}

impl SqlxConfigUnitOfWork {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigUnitOfWork for SqlxConfigUnitOfWork {
    async fn begin<'a>(&'a self) -> anyhow::Result<Box<dyn ConfigTransaction + 'a>> {
        let tx: SharedTransaction = Arc::new(Mutex::new(self.pool.begin().await?));
        let db = Db::Tx(tx.clone());
        Ok(Box::new(SqlxConfigTransaction {
            configs: SqlxConfigRepository::new(db.clone()),
            patterns: SqlxPatternRepository::new(db.clone()),
            home: SqlxHomeRepository::new(db.clone()),
            translations: SqlxTranslationRepository::new(db.clone()),
            forms: SqlxFormRepository::new(db.clone()),
            groups: SqlxTestGroupRepository::new(db.clone()),
            images: SqlxImageRepository::new(db),
            tx,
        }))
    }
}

struct SqlxConfigTransaction {
    tx: SharedTransaction,
    configs: SqlxConfigRepository,
    patterns: SqlxPatternRepository,
    home: SqlxHomeRepository,
    translations: SqlxTranslationRepository,
    forms: SqlxFormRepository,
    groups: SqlxTestGroupRepository,
    images: SqlxImageRepository,
}

#[async_trait]
impl ConfigTransaction for SqlxConfigTransaction {
    fn configs(&self) -> &dyn ConfigRepository {
        &self.configs
    }

    fn patterns(&self) -> &dyn PatternRepository {
        &self.patterns
    }

    fn home(&self) -> &dyn HomeRepository {
        &self.home
    }

    fn translations(&self) -> &dyn TranslationRepository {
        &self.translations
    }

    fn forms(&self) -> &dyn FormRepository {
        &self.forms
    }

    fn groups(&self) -> &dyn TestGroupRepository {
        &self.groups
    }

    fn images(&self) -> &dyn ImageRepository {
        &self.images
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let Self {
            tx,
            configs,
            patterns,
            home,
            translations,
            forms,
            groups,
            images,
        } = *self;
        // The repositories hold the other handles to the transaction.
        drop((configs, patterns, home, translations, forms, groups, images));
        let tx = Arc::try_unwrap(tx)
            .map_err(|_| anyhow::anyhow!("config transaction is still in use"))?
            .into_inner();
        tx.commit().await?;
        Ok(())
    }
}
