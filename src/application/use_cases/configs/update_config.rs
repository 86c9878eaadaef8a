use std::collections::HashSet;

use regex::Regex;

use crate::application::dto::configs::{
    CARD_COLOR_MAX, CARD_DESCRIPTION_MAX_LEN, CARD_TITLE_MAX_LEN, ConfigUpdate,
    DESCRIPTION_MAX_LEN, FAQ_ANSWER_MAX_LEN, FAQ_QUESTION_MAX_LEN, INFORMED_CONSENT_MAX_LEN,
    PATTERN_NAME_MAX_LEN, PATTERN_REGEX_MAX_LEN, SUBTITLE_MAX_LEN, TITLE_MAX_LEN,
    TRANSLATION_VALUE_MAX_LEN,
};
use crate::application::dto::forms::{
    CATEGORY_MAX_LEN, CATEGORY_MIN_LEN, FORM_TITLE_MAX_LEN, FormUpdate, OPTION_TEXT_MAX_LEN,
    PLACEHOLDER_MAX_LEN, QUESTION_TEXT_MAX_LEN, SLIDER_LABEL_MAX_LEN,
};
use crate::application::dto::images::{ImageSlot, ImageSlots};
use crate::application::dto::test_groups;
use crate::application::errors::{ApiError, FieldErrors};
use crate::application::ports::config_repository::{ConfigFields, ConfigRow};
use crate::application::ports::config_unit_of_work::ConfigUnitOfWork;
use crate::application::services::images::{ImageChanges, Images, validate_upload};
use crate::application::use_cases::ConfigPorts;
use crate::domain::forms::form::{FormQuestionType, FormType};
use crate::domain::images::image::ImageCategory;
use crate::domain::test_groups::sampling::{PROBABILITY_TOTAL, probability_total};

use super::get_config::full_config;
use super::sync_forms::FormState;
use super::sync_groups::GroupsState;
use super::{check_len, sync_home};

/// Image parts sent next to the JSON payload, one list per image-bearing section.
#[derive(Debug, Default)]
pub struct ConfigUpdateFiles {
    pub icon: ImageSlot,
    pub information_cards: ImageSlots,
    pub pre_test_form: ImageSlots,
    pub post_test_form: ImageSlots,
    pub groups: ImageSlots,
}

impl ConfigUpdateFiles {
    fn validate(&self) -> Result<(), ApiError> {
        if let ImageSlot::Replace(file) = &self.icon {
            validate_upload(file)?;
        }
        for file in self
            .information_cards
            .uploads()
            .chain(self.pre_test_form.uploads())
            .chain(self.post_test_form.uploads())
            .chain(self.groups.uploads())
        {
            validate_upload(file)?;
        }
        Ok(())
    }
}

/// Replaces the active configuration with `update`, keeping ids that still match.
/// Returns whether the stored configuration changed. All rows are written in one
/// transaction; files written for a failed update are removed again.
pub struct UpdateActiveConfig<'a> {
    pub ports: ConfigPorts<'a>,
    pub unit: &'a dyn ConfigUnitOfWork,
}

impl<'a> UpdateActiveConfig<'a> {
    pub async fn execute(
        &self,
        update: &ConfigUpdate,
        mut files: ConfigUpdateFiles,
    ) -> Result<bool, ApiError> {
        validate(update)?;
        files.validate()?;

        let tx = self.unit.begin().await?;
        let ports = ConfigPorts {
            configs: tx.configs(),
            patterns: tx.patterns(),
            home: tx.home(),
            translations: tx.translations(),
            forms: tx.forms(),
            groups: tx.groups(),
            images: Images {
                repo: tx.images(),
                storage: self.ports.images.storage,
                base_url: self.ports.images.base_url,
            },
        };
        let mut changes = ImageChanges::default();
        let applied = apply(&ports, update, &mut files, &mut changes).await;

        let changed = match applied {
            Ok(outcome) => outcome,
            Err(err) => {
                drop(tx);
                self.ports.images.discard(&changes).await;
                return Err(err);
            }
        };
        if let Err(err) = tx.commit().await {
            self.ports.images.discard(&changes).await;
            return Err(err.into());
        }
        self.ports.images.settle(&changes).await;
        Ok(changed)
    }
}

async fn apply(
    ports: &ConfigPorts<'_>,
    update: &ConfigUpdate,
    files: &mut ConfigUpdateFiles,
    changes: &mut ImageChanges,
) -> Result<bool, ApiError> {
    let row = ports
        .configs
        .find_active()
        .await?
        .ok_or_else(ApiError::no_active_config)?;
    let version = row.version;

    let translations = ports.translations.list_for_config(version).await?;
    for t in &update.translations {
        if !translations.iter().any(|k| k.key == t.key) {
            return Err(ApiError::not_found(format!(
                "Translation key {} not found",
                t.key
            )));
        }
    }

    let pre = FormState::load(ports.forms, version, FormType::Pre).await?;
    let pre_removals = pre.removals(update.pre_test_form.as_ref());
    pre.check_removals(ports.forms, &pre_removals).await?;
    let post = FormState::load(ports.forms, version, FormType::Post).await?;
    let post_removals = post.removals(update.post_test_form.as_ref());
    post.check_removals(ports.forms, &post_removals).await?;
    let groups = GroupsState::load(ports.groups, version).await?;
    let group_removals = groups.removals(&update.groups);
    groups.check_removals(ports.groups, &group_removals).await?;

    let before = snapshot(ports, row.clone()).await?;

    let username_pattern_id = save_pattern(ports, update).await?;
    let icon_id = ports
        .images
        .apply_slot(
            ImageCategory::Icon,
            row.icon_id,
            std::mem::take(&mut files.icon),
            changes,
        )
        .await?;
    ports
        .configs
        .update_fields(
            version,
            &ConfigFields {
                title: update.title.clone(),
                subtitle: update.subtitle.clone(),
                description: update.description.clone(),
                informed_consent: update.informed_consent.clone(),
                anonymous: update.anonymous,
                icon_id,
                username_pattern_id,
            },
        )
        .await?;

    sync_home::sync_cards(
        ports,
        version,
        &update.information_cards,
        &mut files.information_cards,
        changes,
    )
    .await?;
    sync_home::sync_faq(ports, version, &update.faq).await?;
    pre.sync(
        ports,
        version,
        update.pre_test_form.as_ref(),
        &pre_removals,
        &mut files.pre_test_form,
        changes,
    )
    .await?;
    post.sync(
        ports,
        version,
        update.post_test_form.as_ref(),
        &post_removals,
        &mut files.post_test_form,
        changes,
    )
    .await?;
    groups
        .sync(
            ports,
            version,
            &update.groups,
            &group_removals,
            &mut files.groups,
            changes,
        )
        .await?;

    for t in &update.translations {
        let Some(key) = translations.iter().find(|k| k.key == t.key) else {
            continue;
        };
        if key.value.as_deref() != Some(t.value.as_str()) {
            ports
                .translations
                .upsert_value(version, key.key_id, &t.value)
                .await?;
        }
    }

    // Released images are still in place here; only row references are compared.
    let after = match ports.configs.find(version).await? {
        Some(row) => snapshot(ports, row).await?,
        None => serde_json::Value::Null,
    };
    Ok(before != after)
}

async fn save_pattern(
    ports: &ConfigPorts<'_>,
    update: &ConfigUpdate,
) -> Result<Option<u32>, ApiError> {
    let Some(pattern) = &update.username_pattern else {
        return Ok(None);
    };
    let patterns = ports.patterns;
    let existing = match pattern.id {
        Some(id) => patterns.find_by_id(id).await?,
        None => None,
    };
    match existing {
        Some(existing) => {
            if existing.name != pattern.name || existing.regex != pattern.regex {
                patterns
                    .update(existing.id, &pattern.name, &pattern.regex)
                    .await?;
            }
            Ok(Some(existing.id))
        }
        None => Ok(Some(patterns.create(&pattern.name, &pattern.regex).await?)),
    }
}

async fn snapshot(ports: &ConfigPorts<'_>, row: ConfigRow) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::to_value(full_config(ports, row).await?)?)
}

fn validate(update: &ConfigUpdate) -> Result<(), ApiError> {
    if !update.groups.is_empty() {
        let total = probability_total(update.groups.iter().map(|g| g.probability));
        if total != PROBABILITY_TOTAL {
            return Err(ApiError::bad_request(format!(
                "Config groups probability sum must be 100, got {total}"
            )));
        }
    }

    let mut errors = FieldErrors::new();
    check_len(&mut errors, "title", &update.title, 1, TITLE_MAX_LEN);
    if let Some(subtitle) = &update.subtitle {
        check_len(&mut errors, "subtitle", subtitle, 0, SUBTITLE_MAX_LEN);
    }
    check_len(&mut errors, "description", &update.description, 1, DESCRIPTION_MAX_LEN);
    check_len(
        &mut errors,
        "informedConsent",
        &update.informed_consent,
        1,
        INFORMED_CONSENT_MAX_LEN,
    );

    if let Some(pattern) = &update.username_pattern {
        check_len(&mut errors, "usernamePattern.name", &pattern.name, 1, PATTERN_NAME_MAX_LEN);
        check_len(&mut errors, "usernamePattern.regex", &pattern.regex, 1, PATTERN_REGEX_MAX_LEN);
        if Regex::new(&pattern.regex).is_err() {
            errors.push("usernamePattern", "Invalid regular expression");
        }
    }

    for (i, card) in update.information_cards.iter().enumerate() {
        let field = |name: &str| format!("informationCards[{i}].{name}");
        check_len(&mut errors, &field("title"), &card.title, 1, CARD_TITLE_MAX_LEN);
        check_len(
            &mut errors,
            &field("description"),
            &card.description,
            1,
            CARD_DESCRIPTION_MAX_LEN,
        );
        if card.color > CARD_COLOR_MAX {
            errors.push(&field("color"), "Color must be a 24-bit RGB value");
        }
    }

    for (i, faq) in update.faq.iter().enumerate() {
        let field = |name: &str| format!("faq[{i}].{name}");
        check_len(&mut errors, &field("question"), &faq.question, 1, FAQ_QUESTION_MAX_LEN);
        check_len(&mut errors, &field("answer"), &faq.answer, 1, FAQ_ANSWER_MAX_LEN);
    }

    if let Some(form) = &update.pre_test_form {
        validate_form(&mut errors, "preTestForm", form);
    }
    if let Some(form) = &update.post_test_form {
        validate_form(&mut errors, "postTestForm", form);
    }

    let mut labels = HashSet::new();
    for (gi, group) in update.groups.iter().enumerate() {
        let prefix = format!("groups[{gi}]");
        check_len(
            &mut errors,
            &format!("{prefix}.label"),
            &group.label,
            test_groups::LABEL_MIN_LEN,
            test_groups::LABEL_MAX_LEN,
        );
        if !labels.insert(group.label.as_str()) {
            errors.push(&format!("{prefix}.label"), "Label must be unique");
        }
        if u32::from(group.probability) > PROBABILITY_TOTAL {
            errors.push(
                &format!("{prefix}.probability"),
                "Probability must be between 0 and 100",
            );
        }
        if let Some(greeting) = &group.greeting {
            check_len(
                &mut errors,
                &format!("{prefix}.greeting"),
                greeting,
                0,
                test_groups::GREETING_MAX_LEN,
            );
        }
        for (pi, phase) in group.phases.iter().enumerate() {
            for (qi, question) in phase.questions.iter().enumerate() {
                let prefix = format!("{prefix}.phases[{pi}].questions[{qi}]");
                if let Some(text) = &question.text {
                    check_len(
                        &mut errors,
                        &format!("{prefix}.text"),
                        text,
                        0,
                        test_groups::QUESTION_TEXT_MAX_LEN,
                    );
                }
                for (oi, option) in question.options.iter().enumerate() {
                    if let Some(text) = &option.text {
                        check_len(
                            &mut errors,
                            &format!("{prefix}.options[{oi}].text"),
                            text,
                            0,
                            test_groups::OPTION_TEXT_MAX_LEN,
                        );
                    }
                }
            }
        }
    }

    for (i, t) in update.translations.iter().enumerate() {
        check_len(
            &mut errors,
            &format!("translations[{i}].value"),
            &t.value,
            0,
            TRANSLATION_VALUE_MAX_LEN,
        );
    }

    errors.into_result("Invalid configuration")
}

fn validate_form(errors: &mut FieldErrors, prefix: &str, form: &FormUpdate) {
    if let Some(title) = &form.title {
        check_len(errors, &format!("{prefix}.title"), title, 0, FORM_TITLE_MAX_LEN);
    }
    for (qi, question) in form.questions.iter().enumerate() {
        let prefix = format!("{prefix}.questions[{qi}]");
        let fields = question.fields();
        check_len(
            errors,
            &format!("{prefix}.category"),
            &fields.category,
            CATEGORY_MIN_LEN,
            CATEGORY_MAX_LEN,
        );
        if let Some(text) = &fields.text {
            check_len(errors, &format!("{prefix}.text"), text, 0, QUESTION_TEXT_MAX_LEN);
        }
        match fields.kind {
            FormQuestionType::SelectMultiple | FormQuestionType::Slider => {
                if fields.min > fields.max {
                    errors.push(&format!("{prefix}.min"), "Min cannot be greater than max");
                }
            }
            FormQuestionType::TextShort | FormQuestionType::TextLong => {
                if fields.min_length > fields.max_length {
                    errors.push(
                        &format!("{prefix}.minLength"),
                        "Min length cannot be greater than max length",
                    );
                }
                if let Some(placeholder) = &fields.placeholder {
                    check_len(
                        errors,
                        &format!("{prefix}.placeholder"),
                        placeholder,
                        0,
                        PLACEHOLDER_MAX_LEN,
                    );
                }
            }
            FormQuestionType::SelectOne => {}
        }
        if fields.kind == FormQuestionType::Slider && fields.step == Some(0) {
            errors.push(&format!("{prefix}.step"), "Step must be positive");
        }
        for (oi, option) in question.options().iter().enumerate() {
            if let Some(text) = &option.text {
                check_len(
                    errors,
                    &format!("{prefix}.options[{oi}].text"),
                    text,
                    0,
                    OPTION_TEXT_MAX_LEN,
                );
            }
        }
        for (li, label) in question.labels().iter().enumerate() {
            check_len(
                errors,
                &format!("{prefix}.labels[{li}].label"),
                &label.label,
                1,
                SLIDER_LABEL_MAX_LEN,
            );
        }
    }
}
