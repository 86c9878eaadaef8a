use std::collections::HashSet;

use crate::application::dto::forms::FormUpdate;
use crate::application::dto::images::ImageSlots;
use crate::application::errors::ApiError;
use crate::application::ports::form_repository::{
    FormOptionRow, FormQuestionRow, FormRepository, FormRow, SliderLabelRow,
};
use crate::application::services::images::ImageChanges;
use crate::application::use_cases::ConfigPorts;
use crate::domain::forms::form::FormType;
use crate::domain::images::image::ImageCategory;

use super::{first_used, has_user_data, removed_ids};

/// Stored rows of one form, taken before the update is applied.
pub(super) struct FormState {
    kind: FormType,
    form: Option<FormRow>,
    questions: Vec<FormQuestionRow>,
    options: Vec<FormOptionRow>,
    labels: Vec<SliderLabelRow>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct FormRemovals {
    pub form: Option<u32>,
    pub questions: Vec<u32>,
    pub options: Vec<u32>,
    pub labels: Vec<u32>,
}

impl FormState {
    pub(super) async fn load(
        repo: &dyn FormRepository,
        version: u32,
        kind: FormType,
    ) -> anyhow::Result<Self> {
        let Some(form) = repo.find_by_config(version, kind).await? else {
            return Ok(Self {
                kind,
                form: None,
                questions: Vec::new(),
                options: Vec::new(),
                labels: Vec::new(),
            });
        };
        Ok(Self {
            kind,
            questions: repo.list_questions(form.id).await?,
            options: repo.list_options(form.id).await?,
            labels: repo.list_slider_labels(form.id).await?,
            form: Some(form),
        })
    }

    fn question(&self, id: Option<u32>) -> Option<&FormQuestionRow> {
        let id = id?;
        self.questions.iter().find(|q| q.id == id)
    }

    fn option(&self, question: Option<u32>, id: Option<u32>) -> Option<&FormOptionRow> {
        let (question, id) = (question?, id?);
        self.options
            .iter()
            .find(|o| o.id == id && o.question_id == question)
    }

    fn label(&self, question: Option<u32>, id: Option<u32>) -> Option<&SliderLabelRow> {
        let (question, id) = (question?, id?);
        self.labels
            .iter()
            .find(|l| l.id == id && l.question_id == question)
    }

    pub(super) fn removals(&self, update: Option<&FormUpdate>) -> FormRemovals {
        let Some(form) = &self.form else {
            return FormRemovals::default();
        };
        let Some(update) = update else {
            return FormRemovals {
                form: Some(form.id),
                questions: self.questions.iter().map(|q| q.id).collect(),
                options: self.options.iter().map(|o| o.id).collect(),
                labels: self.labels.iter().map(|l| l.id).collect(),
            };
        };

        let mut questions = HashSet::new();
        let mut options = HashSet::new();
        let mut labels = HashSet::new();
        for q in &update.questions {
            let Some(current) = self.question(q.id()) else {
                continue;
            };
            questions.insert(current.id);
            for o in q.options() {
                if let Some(option) = self.option(Some(current.id), o.id) {
                    options.insert(option.id);
                }
            }
            for l in q.labels() {
                if let Some(label) = self.label(Some(current.id), l.id) {
                    labels.insert(label.id);
                }
            }
        }
        FormRemovals {
            form: None,
            questions: removed_ids(self.questions.iter().map(|q| q.id), &questions),
            options: removed_ids(self.options.iter().map(|o| o.id), &options),
            labels: removed_ids(self.labels.iter().map(|l| l.id), &labels),
        }
    }

    /// Fails when the update would drop rows that participants already answered.
    pub(super) async fn check_removals(
        &self,
        repo: &dyn FormRepository,
        removals: &FormRemovals,
    ) -> Result<(), ApiError> {
        if let Some(form_id) = removals.form {
            if repo.form_has_submissions(form_id).await? {
                return Err(has_user_data("Form", form_id));
            }
        }
        if !removals.questions.is_empty() {
            let answered = repo.questions_with_answers(&removals.questions).await?;
            if let Some(id) = first_used(&removals.questions, &answered) {
                return Err(has_user_data("Form question", id));
            }
        }
        if !removals.options.is_empty() {
            let answered = repo.options_with_answers(&removals.options).await?;
            if let Some(id) = first_used(&removals.options, &answered) {
                return Err(has_user_data("Form option", id));
            }
        }
        Ok(())
    }

    fn released_by(&self, removals: &FormRemovals) -> Vec<u32> {
        self.questions
            .iter()
            .filter(|q| removals.questions.contains(&q.id))
            .filter_map(|q| q.image_id)
            .chain(
                self.options
                    .iter()
                    .filter(|o| removals.options.contains(&o.id))
                    .filter_map(|o| o.image_id),
            )
            .collect()
    }

    pub(super) async fn sync(
        &self,
        ports: &ConfigPorts<'_>,
        version: u32,
        update: Option<&FormUpdate>,
        removals: &FormRemovals,
        slots: &mut ImageSlots,
        changes: &mut ImageChanges,
    ) -> Result<(), ApiError> {
        let repo = ports.forms;
        changes.released.extend(self.released_by(removals));

        if let Some(form_id) = removals.form {
            repo.delete_form(form_id).await?;
            tracing::debug!(form_id, kind = self.kind.as_str(), "form_removed");
            return Ok(());
        }
        let Some(update) = update else {
            return Ok(());
        };

        if !removals.labels.is_empty() {
            repo.delete_slider_labels(&removals.labels).await?;
        }
        if !removals.options.is_empty() {
            repo.delete_options(&removals.options).await?;
        }
        if !removals.questions.is_empty() {
            repo.delete_questions(&removals.questions).await?;
        }

        let form_id = match &self.form {
            Some(form) => {
                if form.title != update.title {
                    repo.update_form_title(form.id, update.title.as_deref())
                        .await?;
                }
                form.id
            }
            None => {
                repo.create_form(version, self.kind, update.title.as_deref())
                    .await?
            }
        };

        for (order, q) in update.questions.iter().enumerate() {
            let order = order as u16;
            let current = self.question(q.id());
            let fields = q.fields();
            let image_id = ports
                .images
                .apply_slot(
                    ImageCategory::FormQuestion,
                    current.and_then(|c| c.image_id),
                    slots.next_slot(),
                    changes,
                )
                .await?;
            let question_id = match current {
                Some(current) => {
                    repo.update_question(current.id, order, &fields, image_id)
                        .await?;
                    current.id
                }
                None => {
                    repo.insert_question(form_id, order, &fields, image_id)
                        .await?
                }
            };
            let known_question = current.map(|c| c.id);

            for (order, o) in q.options().iter().enumerate() {
                let order = order as u16;
                let current = self.option(known_question, o.id);
                let image_id = ports
                    .images
                    .apply_slot(
                        ImageCategory::FormOption,
                        current.and_then(|c| c.image_id),
                        slots.next_slot(),
                        changes,
                    )
                    .await?;
                match current {
                    Some(current) => {
                        repo.update_option(current.id, order, o.text.as_deref(), image_id)
                            .await?
                    }
                    None => {
                        repo.insert_option(question_id, order, o.text.as_deref(), image_id)
                            .await?;
                    }
                }
            }

            for l in q.labels() {
                match self.label(known_question, l.id) {
                    Some(current) => {
                        repo.update_slider_label(current.id, l.number, &l.label)
                            .await?
                    }
                    None => {
                        repo.insert_slider_label(question_id, l.number, &l.label)
                            .await?;
                    }
                }
            }
        }
        Ok(())
    }
}
