use std::collections::HashSet;

use crate::application::dto::images::ImageSlots;
use crate::application::dto::test_groups::TestGroupUpdate;
use crate::application::errors::ApiError;
use crate::application::ports::test_group_repository::{
    TestGroupRepository, TestGroupRow, TestOptionRow, TestPhaseRow, TestQuestionRow,
};
use crate::application::services::images::ImageChanges;
use crate::application::use_cases::ConfigPorts;
use crate::domain::images::image::ImageCategory;

use super::{first_used, has_user_data, removed_ids};

/// Stored test groups of one configuration, taken before the update is applied.
pub(super) struct GroupsState {
    groups: Vec<TestGroupRow>,
    phases: Vec<TestPhaseRow>,
    questions: Vec<TestQuestionRow>,
    options: Vec<TestOptionRow>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct GroupRemovals {
    pub groups: Vec<u32>,
    pub phases: Vec<u32>,
    pub questions: Vec<u32>,
    pub options: Vec<u32>,
}

impl GroupsState {
    pub(super) async fn load(repo: &dyn TestGroupRepository, version: u32) -> anyhow::Result<Self> {
        let groups = repo.list_groups(version).await?;
        let mut state = Self {
            groups: Vec::new(),
            phases: Vec::new(),
            questions: Vec::new(),
            options: Vec::new(),
        };
        for g in &groups {
            state.phases.extend(repo.list_phases(g.id).await?);
            state.questions.extend(repo.list_questions(g.id).await?);
            state.options.extend(repo.list_options(g.id).await?);
        }
        state.groups = groups;
        Ok(state)
    }

    fn group(&self, id: Option<u32>) -> Option<u32> {
        let id = id?;
        self.groups.iter().any(|g| g.id == id).then_some(id)
    }

    fn phase(&self, group: Option<u32>, id: Option<u32>) -> Option<u32> {
        let (group, id) = (group?, id?);
        self.phases
            .iter()
            .any(|p| p.id == id && p.group_id == group)
            .then_some(id)
    }

    fn question(&self, phase: Option<u32>, id: Option<u32>) -> Option<&TestQuestionRow> {
        let (phase, id) = (phase?, id?);
        self.questions
            .iter()
            .find(|q| q.id == id && q.phase_id == phase)
    }

    fn option(&self, question: Option<u32>, id: Option<u32>) -> Option<&TestOptionRow> {
        let (question, id) = (question?, id?);
        self.options
            .iter()
            .find(|o| o.id == id && o.question_id == question)
    }

    /// Kept groups whose label changes. Two groups may swap labels.
    fn renamed(&self, updates: &[TestGroupUpdate]) -> Vec<u32> {
        updates
            .iter()
            .filter_map(|g| {
                let id = self.group(g.id)?;
                let current = self.groups.iter().find(|row| row.id == id)?;
                (current.label != g.label).then_some(id)
            })
            .collect()
    }

    pub(super) fn removals(&self, updates: &[TestGroupUpdate]) -> GroupRemovals {
        let mut groups = HashSet::new();
        let mut phases = HashSet::new();
        let mut questions = HashSet::new();
        let mut options = HashSet::new();
        for g in updates {
            let group = self.group(g.id);
            groups.extend(group);
            for p in &g.phases {
                let phase = self.phase(group, p.id);
                phases.extend(phase);
                for q in &p.questions {
                    let question = self.question(phase, q.id).map(|q| q.id);
                    questions.extend(question);
                    for o in &q.options {
                        options.extend(self.option(question, o.id).map(|o| o.id));
                    }
                }
            }
        }
        GroupRemovals {
            groups: removed_ids(self.groups.iter().map(|g| g.id), &groups),
            phases: removed_ids(self.phases.iter().map(|p| p.id), &phases),
            questions: removed_ids(self.questions.iter().map(|q| q.id), &questions),
            options: removed_ids(self.options.iter().map(|o| o.id), &options),
        }
    }

    /// Fails when the update would drop rows that attempts already refer to.
    pub(super) async fn check_removals(
        &self,
        repo: &dyn TestGroupRepository,
        removals: &GroupRemovals,
    ) -> Result<(), ApiError> {
        if !removals.groups.is_empty() {
            let used = repo.groups_with_user_data(&removals.groups).await?;
            if let Some(id) = first_used(&removals.groups, &used) {
                return Err(has_user_data("Test group", id));
            }
        }
        if !removals.phases.is_empty() {
            let used = repo.phases_with_user_data(&removals.phases).await?;
            if let Some(id) = first_used(&removals.phases, &used) {
                return Err(has_user_data("Test phase", id));
            }
        }
        if !removals.questions.is_empty() {
            let used = repo.questions_with_user_data(&removals.questions).await?;
            if let Some(id) = first_used(&removals.questions, &used) {
                return Err(has_user_data("Test question", id));
            }
        }
        if !removals.options.is_empty() {
            let used = repo.options_with_user_data(&removals.options).await?;
            if let Some(id) = first_used(&removals.options, &used) {
                return Err(has_user_data("Test option", id));
            }
        }
        Ok(())
    }

    pub(super) async fn sync(
        &self,
        ports: &ConfigPorts<'_>,
        version: u32,
        updates: &[TestGroupUpdate],
        removals: &GroupRemovals,
        slots: &mut ImageSlots,
        changes: &mut ImageChanges,
    ) -> Result<(), ApiError> {
        let repo = ports.groups;
        changes.released.extend(
            self.questions
                .iter()
                .filter(|q| removals.questions.contains(&q.id))
                .filter_map(|q| q.image_id),
        );
        changes.released.extend(
            self.options
                .iter()
                .filter(|o| removals.options.contains(&o.id))
                .filter_map(|o| o.image_id),
        );
        if !removals.options.is_empty() {
            repo.delete_options(&removals.options).await?;
        }
        if !removals.questions.is_empty() {
            repo.delete_questions(&removals.questions).await?;
        }
        if !removals.phases.is_empty() {
            repo.delete_phases(&removals.phases).await?;
        }
        if !removals.groups.is_empty() {
            repo.delete_groups(&removals.groups).await?;
        }
        let renamed = self.renamed(updates);
        if !renamed.is_empty() {
            repo.park_labels(&renamed).await?;
        }

        for g in updates {
            let known_group = self.group(g.id);
            let group_id = match known_group {
                Some(id) => {
                    repo.update_group(id, g).await?;
                    id
                }
                None => repo.insert_group(version, g).await?,
            };

            for (order, p) in g.phases.iter().enumerate() {
                let order = order as u16;
                let known_phase = self.phase(known_group, p.id);
                let phase_id = match known_phase {
                    Some(id) => {
                        repo.update_phase(id, order, p.randomize_questions).await?;
                        id
                    }
                    None => {
                        repo.insert_phase(group_id, order, p.randomize_questions)
                            .await?
                    }
                };

                for (order, q) in p.questions.iter().enumerate() {
                    let order = order as u16;
                    let current = self.question(known_phase, q.id);
                    let image_id = ports
                        .images
                        .apply_slot(
                            ImageCategory::TestQuestion,
                            current.and_then(|c| c.image_id),
                            slots.next_slot(),
                            changes,
                        )
                        .await?;
                    let question_id = match current {
                        Some(current) => {
                            repo.update_question(
                                current.id,
                                order,
                                q.text.as_deref(),
                                image_id,
                                q.randomize_options,
                            )
                            .await?;
                            current.id
                        }
                        None => {
                            repo.insert_question(
                                phase_id,
                                order,
                                q.text.as_deref(),
                                image_id,
                                q.randomize_options,
                            )
                            .await?
                        }
                    };
                    let known_question = current.map(|c| c.id);

                    for (order, o) in q.options.iter().enumerate() {
                        let order = order as u16;
                        let current = self.option(known_question, o.id);
                        let image_id = ports
                            .images
                            .apply_slot(
                                ImageCategory::TestOption,
                                current.and_then(|c| c.image_id),
                                slots.next_slot(),
                                changes,
                            )
                            .await?;
                        match current {
                            Some(current) => {
                                repo.update_option(
                                    current.id,
                                    order,
                                    o.text.as_deref(),
                                    image_id,
                                    o.correct,
                                )
                                .await?
                            }
                            None => {
                                repo.insert_option(
                                    question_id,
                                    order,
                                    o.text.as_deref(),
                                    image_id,
                                    o.correct,
                                )
                                .await?;
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
