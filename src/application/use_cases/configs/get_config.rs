use std::collections::BTreeMap;

use crate::application::dto::configs::{
    FrequentlyAskedQuestion, FullConfig, InformationCard, Pattern, Translation, TrimmedConfig,
};
use crate::application::errors::ApiError;
use crate::application::ports::config_repository::ConfigRow;
use crate::application::services::{forms, test_groups};
use crate::application::use_cases::ConfigPorts;
use crate::domain::forms::form::FormType;

pub(crate) async fn pattern_of(
    ports: &ConfigPorts<'_>,
    row: &ConfigRow,
) -> anyhow::Result<Option<Pattern>> {
    match row.username_pattern_id {
        Some(id) => ports.patterns.find_by_id(id).await,
        None => Ok(None),
    }
}

async fn home_of(
    ports: &ConfigPorts<'_>,
    version: u32,
) -> anyhow::Result<(Vec<InformationCard>, Vec<FrequentlyAskedQuestion>)> {
    let cards = ports.home.list_cards(version).await?;
    let icons = ports.images.load(cards.iter().map(|c| c.icon_id)).await?;
    let cards = cards
        .into_iter()
        .map(|c| InformationCard {
            id: c.id,
            title: c.title,
            description: c.description,
            color: c.color,
            icon: c.icon_id.and_then(|id| icons.get(&id).cloned()),
        })
        .collect();
    let faq = ports
        .home
        .list_faq(version)
        .await?
        .into_iter()
        .map(|f| FrequentlyAskedQuestion {
            id: f.id,
            question: f.question,
            answer: f.answer,
        })
        .collect();
    Ok((cards, faq))
}

pub(crate) async fn full_config(
    ports: &ConfigPorts<'_>,
    row: ConfigRow,
) -> anyhow::Result<FullConfig> {
    let icon = ports.images.load([row.icon_id]).await?;
    let (information_cards, faq) = home_of(ports, row.version).await?;
    let translations = ports
        .translations
        .list_for_config(row.version)
        .await?
        .into_iter()
        .map(|t| Translation {
            key: t.key,
            value: t.value,
            description: t.description,
            arguments: t.arguments,
        })
        .collect();
    Ok(FullConfig {
        version: row.version,
        icon: row.icon_id.and_then(|id| icon.get(&id).cloned()),
        username_pattern: pattern_of(ports, &row).await?,
        information_cards,
        faq,
        pre_test_form: forms::load_form(ports.forms, &ports.images, row.version, FormType::Pre)
            .await?,
        post_test_form: forms::load_form(ports.forms, &ports.images, row.version, FormType::Post)
            .await?,
        groups: test_groups::load_groups(ports.groups, &ports.images, row.version).await?,
        translations,
        title: row.title,
        subtitle: row.subtitle,
        description: row.description,
        anonymous: row.anonymous,
        informed_consent: row.informed_consent,
    })
}

pub struct GetConfig<'a> {
    pub ports: ConfigPorts<'a>,
}

impl<'a> GetConfig<'a> {
    pub async fn execute(&self, version: u32) -> Result<FullConfig, ApiError> {
        let row = self
            .ports
            .configs
            .find(version)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Configuration {version} not found")))?;
        Ok(full_config(&self.ports, row).await?)
    }
}

pub struct GetActiveFullConfig<'a> {
    pub ports: ConfigPorts<'a>,
}

impl<'a> GetActiveFullConfig<'a> {
    pub async fn execute(&self) -> Result<FullConfig, ApiError> {
        let row = self
            .ports
            .configs
            .find_active()
            .await?
            .ok_or_else(ApiError::no_active_config)?;
        Ok(full_config(&self.ports, row).await?)
    }
}

/// Public configuration shown to participants: no groups, translations as a key map.
pub struct GetActiveConfig<'a> {
    pub ports: ConfigPorts<'a>,
}

impl<'a> GetActiveConfig<'a> {
    pub async fn execute(&self) -> Result<TrimmedConfig, ApiError> {
        let ports = &self.ports;
        let row = ports
            .configs
            .find_active()
            .await?
            .ok_or_else(ApiError::no_active_config)?;
        let icon = ports.images.load([row.icon_id]).await?;
        let (information_cards, faq) = home_of(ports, row.version).await?;
        let translations: BTreeMap<String, String> = ports
            .translations
            .list_for_config(row.version)
            .await?
            .into_iter()
            .filter_map(|t| t.value.map(|v| (t.key, v)))
            .collect();
        Ok(TrimmedConfig {
            icon: row.icon_id.and_then(|id| icon.get(&id).cloned()),
            username_pattern: pattern_of(ports, &row).await?,
            information_cards,
            faq,
            pre_test_form: forms::load_form(ports.forms, &ports.images, row.version, FormType::Pre)
                .await?,
            post_test_form: forms::load_form(
                ports.forms,
                &ports.images,
                row.version,
                FormType::Post,
            )
            .await?,
            translations,
            title: row.title,
            subtitle: row.subtitle,
            description: row.description,
            anonymous: row.anonymous,
            informed_consent: row.informed_consent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::Fixture;

    #[tokio::test]
    async fn trimmed_config_maps_translated_keys_only() {
        let fx = Fixture::default();
        fx.store
            .lock()
            .translation_values
            .insert((1, 1), "Start".into());
        let config = GetActiveConfig { ports: fx.ports() }.execute().await.unwrap();
        assert_eq!(config.title, "PoCoPI");
        assert_eq!(config.translations.len(), 1);
        assert_eq!(config.translations["home.start"], "Start");
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("groups").is_none());
        assert!(json.get("informedConsent").is_some());
    }

    #[tokio::test]
    async fn full_config_lists_every_translation_key_and_group() {
        let fx = Fixture::default();
        fx.store.add_group(1, "control", 100, &[&[&[true, false]]]);
        let config = GetConfig { ports: fx.ports() }.execute(1).await.unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.translations.len(), 2);
        assert_eq!(config.translations[1].arguments, vec!["name".to_string()]);
        assert!(config.translations[0].value.is_none());

        let err = GetConfig { ports: fx.ports() }.execute(7).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
