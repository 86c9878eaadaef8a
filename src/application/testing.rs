//! In-memory adapters for exercising use cases without a database.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::application::dto::configs::Pattern;
use crate::application::dto::forms::{FormAnswer, FormQuestionFields};
use crate::application::dto::test_groups::TestGroupUpdate;
use crate::application::ports::attempt_repository::{AttemptRepository, AttemptRow};
use crate::application::ports::config_repository::{ConfigFields, ConfigRepository, ConfigRow};
use crate::application::ports::config_unit_of_work::{ConfigTransaction, ConfigUnitOfWork};
use crate::application::ports::event_log_repository::{
    EventLogRepository, OptionLogRow, QuestionLogRow,
};
use crate::application::ports::form_answer_repository::{
    FormAnswerRepository, FormSubmissionRow,
};
use crate::application::ports::form_repository::{
    FormOptionRow, FormQuestionRow, FormRepository, FormRow, SliderLabelRow,
};
use crate::application::ports::home_repository::{FaqRow, HomeRepository, InformationCardRow};
use crate::application::ports::image_repository::{ImageRepository, ImageRow};
use crate::application::ports::image_storage::ImageStorage;
use crate::application::ports::pattern_repository::PatternRepository;
use crate::application::ports::test_group_repository::{
    PARKED_LABEL_PREFIX, TestGroupRepository, TestGroupRow, TestOptionRow, TestPhaseRow, TestQuestionRow,
};
use crate::application::ports::translation_repository::{
    TranslationRepository, TranslationRow,
};
use crate::application::ports::user_repository::{NewUserRecord, UserRepository, UserRow};
use crate::application::services::images::Images;
use crate::application::use_cases::ConfigPorts;
use crate::domain::events::option_event::OptionEventType;
use crate::domain::forms::form::FormType;
use crate::domain::users::user::Role;

pub const PNG: [u8; 16] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

pub const BASE_URL: &str = "http://localhost:8080";

#[derive(Default, Clone)]
pub struct State {
    next_id: u32,
    next_big_id: u64,
    pub users: Vec<UserRow>,
    pub patterns: Vec<Pattern>,
    pub configs: Vec<ConfigRow>,
    pub cards: Vec<(u32, u16, InformationCardRow)>,
    pub faq: Vec<(u32, u16, FaqRow)>,
    pub translation_keys: Vec<(u32, String, Vec<String>)>,
    pub translation_values: HashMap<(u32, u32), String>,
    pub forms: Vec<FormRow>,
    pub questions: Vec<(u16, FormQuestionRow)>,
    pub options: Vec<(u16, FormOptionRow)>,
    pub labels: Vec<SliderLabelRow>,
    pub groups: Vec<TestGroupRow>,
    pub phases: Vec<(u16, TestPhaseRow)>,
    pub test_questions: Vec<(u16, TestQuestionRow)>,
    pub test_options: Vec<(u16, TestOptionRow)>,
    pub attempts: Vec<AttemptRow>,
    pub submissions: Vec<FormSubmissionRow>,
    pub question_logs: Vec<(u64, QuestionLogRow)>,
    pub option_logs: Vec<(u64, u32, OptionEventType, DateTime<Utc>)>,
    pub images: Vec<ImageRow>,
    pub pinned_images: HashSet<u32>,
    /// Makes group inserts and updates fail, to exercise rollbacks.
    pub broken_group_writes: bool,
}

impl State {
    /// Mirrors the `(config_version, label)` unique key of `test_group`.
    fn check_group_write(&self, version: u32, id: Option<u32>, label: &str) -> anyhow::Result<()> {
        if self.broken_group_writes {
            anyhow::bail!("test_group is unavailable");
        }
        if self
            .groups
            .iter()
            .any(|g| g.config_version == version && g.label == label && Some(g.id) != id)
        {
            anyhow::bail!(
                "Duplicate entry '{version}-{label}' for key 'uk__test_group__config_label'"
            );
        }
        Ok(())
    }

    fn id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn big_id(&mut self) -> u64 {
        self.next_big_id += 1;
        self.next_big_id
    }

    fn phase_order(&self, phase_id: u32) -> u16 {
        self.phases
            .iter()
            .find(|(_, p)| p.id == phase_id)
            .map(|(o, _)| *o)
            .unwrap_or_default()
    }

    fn question_phase(&self, question_id: u32) -> Option<u32> {
        self.test_questions
            .iter()
            .find(|(_, q)| q.id == question_id)
            .map(|(_, q)| q.phase_id)
    }

    fn option_question(&self, option_id: u32) -> Option<u32> {
        self.test_options
            .iter()
            .find(|(_, o)| o.id == option_id)
            .map(|(_, o)| o.question_id)
    }

    fn phase_group(&self, phase_id: u32) -> Option<u32> {
        self.phases
            .iter()
            .find(|(_, p)| p.id == phase_id)
            .map(|(_, p)| p.group_id)
    }

    fn group_questions(&self, group_id: u32) -> Vec<(u16, u16, TestQuestionRow)> {
        let mut out: Vec<(u16, u16, TestQuestionRow)> = self
            .test_questions
            .iter()
            .filter(|(_, q)| self.phase_group(q.phase_id) == Some(group_id))
            .map(|(o, q)| (self.phase_order(q.phase_id), *o, q.clone()))
            .collect();
        out.sort_by_key(|(p, q, _)| (*p, *q));
        out
    }

    fn remove_options(&mut self, ids: &[u32]) {
        self.test_options.retain(|(_, o)| !ids.contains(&o.id));
    }

    fn remove_questions(&mut self, ids: &[u32]) {
        let options: Vec<u32> = self
            .test_options
            .iter()
            .filter(|(_, o)| ids.contains(&o.question_id))
            .map(|(_, o)| o.id)
            .collect();
        self.remove_options(&options);
        self.test_questions.retain(|(_, q)| !ids.contains(&q.id));
    }

    fn remove_phases(&mut self, ids: &[u32]) {
        let questions: Vec<u32> = self
            .test_questions
            .iter()
            .filter(|(_, q)| ids.contains(&q.phase_id))
            .map(|(_, q)| q.id)
            .collect();
        self.remove_questions(&questions);
        self.phases.retain(|(_, p)| !ids.contains(&p.id));
    }

    fn remove_groups(&mut self, ids: &[u32]) {
        let phases: Vec<u32> = self
            .phases
            .iter()
            .filter(|(_, p)| ids.contains(&p.group_id))
            .map(|(_, p)| p.id)
            .collect();
        self.remove_phases(&phases);
        self.groups.retain(|g| !ids.contains(&g.id));
    }

    fn remove_form_questions(&mut self, ids: &[u32]) {
        self.options.retain(|(_, o)| !ids.contains(&o.question_id));
        self.labels.retain(|l| !ids.contains(&l.question_id));
        self.questions.retain(|(_, q)| !ids.contains(&q.id));
    }

    fn remove_form(&mut self, form_id: u32) {
        let questions: Vec<u32> = self
            .questions
            .iter()
            .filter(|(_, q)| q.form_id == form_id)
            .map(|(_, q)| q.id)
            .collect();
        self.remove_form_questions(&questions);
        self.forms.retain(|f| f.id != form_id);
    }

    fn image_referenced(&self, id: u32) -> bool {
        let some = Some(id);
        self.pinned_images.contains(&id)
            || self.configs.iter().any(|c| c.icon_id == some)
            || self.cards.iter().any(|(_, _, c)| c.icon_id == some)
            || self.questions.iter().any(|(_, q)| q.image_id == some)
            || self.options.iter().any(|(_, o)| o.image_id == some)
            || self.test_questions.iter().any(|(_, q)| q.image_id == some)
            || self.test_options.iter().any(|(_, o)| o.image_id == some)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub state: Mutex<State>,
}

impl MemoryStore {
    pub fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Store holding version 1 as the active configuration.
    pub fn with_active_config(anonymous: bool) -> Self {
        let store = Self::default();
        {
            let mut s = store.lock();
            s.next_id = 100;
            s.configs.push(ConfigRow {
                version: 1,
                icon_id: None,
                username_pattern_id: None,
                title: "PoCoPI".into(),
                subtitle: None,
                description: "Welcome".into(),
                informed_consent: "Consent".into(),
                anonymous,
                active: true,
            });
            s.translation_keys
                .push((1, "home.start".into(), Vec::new()));
            s.translation_keys
                .push((2, "home.greeting".into(), vec!["name".into()]));
        }
        store
    }

    /// Adds an inactive copy of version 1 without any contents. Returns its version.
    pub fn add_config(&self) -> u32 {
        let mut s = self.lock();
        let mut row = s.configs[0].clone();
        row.version = s.configs.iter().map(|c| c.version).max().unwrap_or(0) + 1;
        row.active = false;
        let version = row.version;
        s.configs.push(row);
        version
    }

    pub fn add_user(&self, username: &str, role: Role, password_hash: &str) -> UserRow {
        let mut s = self.lock();
        let row = UserRow {
            id: s.id(),
            username: username.into(),
            role,
            anonymous: true,
            name: None,
            email: None,
            age: None,
            password_hash: password_hash.into(),
        };
        s.users.push(row.clone());
        row
    }

    /// Adds a group with one phase per entry of `phases`; each question lists its
    /// options as `correct` flags. Returns the group id.
    pub fn add_group(&self, version: u32, label: &str, probability: u8, phases: &[&[&[bool]]]) -> u32 {
        let mut s = self.lock();
        let group_id = s.id();
        s.groups.push(TestGroupRow {
            id: group_id,
            config_version: version,
            label: label.into(),
            probability,
            greeting: None,
            allow_previous_phase: true,
            allow_previous_question: true,
            allow_skip_question: true,
            randomize_phases: false,
        });
        for (pi, questions) in phases.iter().enumerate() {
            let phase_id = s.id();
            s.phases.push((
                pi as u16,
                TestPhaseRow {
                    id: phase_id,
                    group_id,
                    randomize_questions: false,
                },
            ));
            for (qi, options) in questions.iter().enumerate() {
                let question_id = s.id();
                s.test_questions.push((
                    qi as u16,
                    TestQuestionRow {
                        id: question_id,
                        phase_id,
                        text: Some(format!("Q{qi}")),
                        image_id: None,
                        randomize_options: false,
                    },
                ));
                for (oi, correct) in options.iter().enumerate() {
                    let option_id = s.id();
                    s.test_options.push((
                        oi as u16,
                        TestOptionRow {
                            id: option_id,
                            question_id,
                            text: Some(format!("O{oi}")),
                            image_id: None,
                            correct: *correct,
                        },
                    ));
                }
            }
        }
        group_id
    }

    pub fn question_ids(&self, group_id: u32) -> Vec<u32> {
        self.lock()
            .group_questions(group_id)
            .into_iter()
            .map(|(_, _, q)| q.id)
            .collect()
    }

    pub fn option_ids(&self, question_id: u32) -> Vec<u32> {
        let s = self.lock();
        let mut options: Vec<&(u16, TestOptionRow)> = s
            .test_options
            .iter()
            .filter(|(_, o)| o.question_id == question_id)
            .collect();
        options.sort_by_key(|(o, _)| *o);
        options.iter().map(|(_, o)| o.id).collect()
    }

    pub fn add_form(&self, version: u32, kind: FormType, questions: &[FormQuestionFields]) -> u32 {
        let mut s = self.lock();
        let form_id = s.id();
        s.forms.push(FormRow {
            id: form_id,
            config_version: version,
            title: None,
            kind,
        });
        for (i, f) in questions.iter().enumerate() {
            let id = s.id();
            s.questions.push((i as u16, question_row(id, form_id, f, None)));
        }
        form_id
    }

    pub fn add_form_option(&self, question_id: u32, text: &str) -> u32 {
        let mut s = self.lock();
        let id = s.id();
        let order = s
            .options
            .iter()
            .filter(|(_, o)| o.question_id == question_id)
            .count() as u16;
        s.options.push((
            order,
            FormOptionRow {
                id,
                question_id,
                text: Some(text.into()),
                image_id: None,
            },
        ));
        id
    }

    pub fn form_question_ids(&self, form_id: u32) -> Vec<u32> {
        let s = self.lock();
        let mut qs: Vec<&(u16, FormQuestionRow)> =
            s.questions.iter().filter(|(_, q)| q.form_id == form_id).collect();
        qs.sort_by_key(|(o, _)| *o);
        qs.iter().map(|(_, q)| q.id).collect()
    }

    pub fn start_attempt(&self, user_id: u32, group_id: u32) -> u64 {
        let mut s = self.lock();
        let id = s.big_id();
        let group = s
            .groups
            .iter()
            .find(|g| g.id == group_id)
            .cloned()
            .unwrap();
        s.attempts.push(AttemptRow {
            id,
            user_id,
            group_id,
            group_label: group.label,
            config_version: group.config_version,
            start: Utc::now(),
            end: None,
        });
        id
    }

    pub fn pin_image(&self, id: u32) {
        self.lock().pinned_images.insert(id);
    }

    pub fn unpin_image(&self, id: u32) {
        self.lock().pinned_images.remove(&id);
    }
}

fn question_row(
    id: u32,
    form_id: u32,
    fields: &FormQuestionFields,
    image_id: Option<u32>,
) -> FormQuestionRow {
    FormQuestionRow {
        id,
        form_id,
        category: fields.category.clone(),
        text: fields.text.clone(),
        image_id,
        kind: fields.kind,
        min: fields.min,
        max: fields.max,
        step: fields.step,
        other: fields.other,
        min_length: fields.min_length,
        max_length: fields.max_length,
        placeholder: fields.placeholder.clone(),
    }
}

fn sorted<T: Clone>(mut items: Vec<(u16, T)>) -> Vec<T> {
    items.sort_by_key(|(o, _)| *o);
    items.into_iter().map(|(_, t)| t).collect()
}

#[derive(Default)]
pub struct MemoryImageStorage {
    pub files: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl ImageStorage for MemoryImageStorage {
    async fn write(&self, relative_path: &str, bytes: &[u8]) -> anyhow::Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(relative_path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn exists(&self, relative_path: &str) -> anyhow::Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(relative_path))
    }

    async fn read(&self, relative_path: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.files.lock().unwrap().get(relative_path).cloned())
    }

    async fn remove(&self, relative_path: &str) -> anyhow::Result<()> {
        self.files.lock().unwrap().remove(relative_path);
        Ok(())
    }
}

/// Snapshot of the whole store, put back on drop unless committed.
pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    snapshot: Option<State>,
}

#[async_trait]
impl ConfigUnitOfWork for MemoryStore {
    async fn begin<'a>(&'a self) -> anyhow::Result<Box<dyn ConfigTransaction + 'a>> {
        Ok(Box::new(MemoryTransaction {
            store: self,
            snapshot: Some(self.lock().clone()),
        }))
    }
}

#[async_trait]
impl ConfigTransaction for MemoryTransaction<'_> {
    fn configs(&self) -> &dyn ConfigRepository {
        self.store
    }
    fn patterns(&self) -> &dyn PatternRepository {
        self.store
    }
    fn home(&self) -> &dyn HomeRepository {
        self.store
    }
    fn translations(&self) -> &dyn TranslationRepository {
        self.store
    }
    fn forms(&self) -> &dyn FormRepository {
        self.store
    }
    fn groups(&self) -> &dyn TestGroupRepository {
        self.store
    }
    fn images(&self) -> &dyn ImageRepository {
        self.store
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let mut tx = self;
        tx.snapshot = None;
        Ok(())
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.store.lock() = snapshot;
        }
    }
}

/// Store plus file storage, wired the way the HTTP layer wires the real adapters.
pub struct Fixture {
    pub store: MemoryStore,
    pub storage: MemoryImageStorage,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Fixture {
    pub fn new(anonymous: bool) -> Self {
        Self {
            store: MemoryStore::with_active_config(anonymous),
            storage: MemoryImageStorage::default(),
        }
    }

    pub fn images(&self) -> Images<'_> {
        Images {
            repo: &self.store,
            storage: &self.storage,
            base_url: BASE_URL,
        }
    }

    pub fn ports(&self) -> ConfigPorts<'_> {
        ConfigPorts {
            configs: &self.store,
            patterns: &self.store,
            home: &self.store,
            translations: &self.store,
            forms: &self.store,
            groups: &self.store,
            images: self.images(),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: &NewUserRecord) -> anyhow::Result<UserRow> {
        let mut s = self.lock();
        if s.users.iter().any(|u| u.username == user.username) {
            anyhow::bail!("duplicate username");
        }
        let row = UserRow {
            id: s.id(),
            username: user.username.clone(),
            role: user.role,
            anonymous: user.anonymous,
            name: user.name.clone(),
            email: user.email.clone(),
            age: user.age,
            password_hash: user.password_hash.clone(),
        };
        s.users.push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: u32) -> anyhow::Result<Option<UserRow>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRow>> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        Ok(self
            .lock()
            .users
            .iter()
            .any(|u| u.email.as_deref() == Some(email)))
    }

    async fn list_by_role(&self, role: Role) -> anyhow::Result<Vec<UserRow>> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }

    async fn update_credentials(
        &self,
        id: u32,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<()> {
        let mut s = self.lock();
        if let Some(u) = s.users.iter_mut().find(|u| u.id == id) {
            u.username = username.into();
            u.password_hash = password_hash.into();
        }
        Ok(())
    }
}

#[async_trait]
impl PatternRepository for MemoryStore {
    async fn list_all(&self) -> anyhow::Result<Vec<Pattern>> {
        Ok(self.lock().patterns.clone())
    }

    async fn find_by_id(&self, id: u32) -> anyhow::Result<Option<Pattern>> {
        Ok(self.lock().patterns.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, name: &str, regex: &str) -> anyhow::Result<u32> {
        let mut s = self.lock();
        let id = s.id();
        s.patterns.push(Pattern {
            id,
            name: name.into(),
            regex: regex.into(),
        });
        Ok(id)
    }

    async fn update(&self, id: u32, name: &str, regex: &str) -> anyhow::Result<()> {
        let mut s = self.lock();
        if let Some(p) = s.patterns.iter_mut().find(|p| p.id == id) {
            p.name = name.into();
            p.regex = regex.into();
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigRepository for MemoryStore {
    async fn list(&self) -> anyhow::Result<Vec<ConfigRow>> {
        let mut rows = self.lock().configs.clone();
        rows.sort_by_key(|c| c.version);
        Ok(rows)
    }

    async fn find(&self, version: u32) -> anyhow::Result<Option<ConfigRow>> {
        Ok(self
            .lock()
            .configs
            .iter()
            .find(|c| c.version == version)
            .cloned())
    }

    async fn find_active(&self) -> anyhow::Result<Option<ConfigRow>> {
        Ok(self.lock().configs.iter().find(|c| c.active).cloned())
    }

    async fn versions_with_user_data(&self) -> anyhow::Result<HashSet<u32>> {
        Ok(self
            .lock()
            .attempts
            .iter()
            .map(|a| a.config_version)
            .collect())
    }

    async fn update_fields(&self, version: u32, fields: &ConfigFields) -> anyhow::Result<()> {
        let mut s = self.lock();
        if let Some(c) = s.configs.iter_mut().find(|c| c.version == version) {
            c.title = fields.title.clone();
            c.subtitle = fields.subtitle.clone();
            c.description = fields.description.clone();
            c.informed_consent = fields.informed_consent.clone();
            c.anonymous = fields.anonymous;
            c.icon_id = fields.icon_id;
            c.username_pattern_id = fields.username_pattern_id;
        }
        Ok(())
    }

    async fn activate(&self, version: u32) -> anyhow::Result<()> {
        for c in self.lock().configs.iter_mut() {
            c.active = c.version == version;
        }
        Ok(())
    }

    async fn delete(&self, version: u32) -> anyhow::Result<()> {
        let mut s = self.lock();
        s.cards.retain(|(v, _, _)| *v != version);
        s.faq.retain(|(v, _, _)| *v != version);
        s.translation_values.retain(|(v, _), _| *v != version);
        let forms: Vec<u32> = s
            .forms
            .iter()
            .filter(|f| f.config_version == version)
            .map(|f| f.id)
            .collect();
        for f in forms {
            s.remove_form(f);
        }
        let groups: Vec<u32> = s
            .groups
            .iter()
            .filter(|g| g.config_version == version)
            .map(|g| g.id)
            .collect();
        s.remove_groups(&groups);
        s.configs.retain(|c| c.version != version);
        Ok(())
    }

    async fn referenced_image_ids(&self, version: u32) -> anyhow::Result<Vec<u32>> {
        let s = self.lock();
        let mut ids: Vec<u32> = Vec::new();
        ids.extend(
            s.configs
                .iter()
                .filter(|c| c.version == version)
                .filter_map(|c| c.icon_id),
        );
        ids.extend(
            s.cards
                .iter()
                .filter(|(v, _, _)| *v == version)
                .filter_map(|(_, _, c)| c.icon_id),
        );
        let forms: Vec<u32> = s
            .forms
            .iter()
            .filter(|f| f.config_version == version)
            .map(|f| f.id)
            .collect();
        let questions: Vec<&FormQuestionRow> = s
            .questions
            .iter()
            .map(|(_, q)| q)
            .filter(|q| forms.contains(&q.form_id))
            .collect();
        ids.extend(questions.iter().filter_map(|q| q.image_id));
        ids.extend(
            s.options
                .iter()
                .filter(|(_, o)| questions.iter().any(|q| q.id == o.question_id))
                .filter_map(|(_, o)| o.image_id),
        );
        for g in s.groups.iter().filter(|g| g.config_version == version) {
            for (_, _, q) in s.group_questions(g.id) {
                ids.extend(q.image_id);
                ids.extend(
                    s.test_options
                        .iter()
                        .filter(|(_, o)| o.question_id == q.id)
                        .filter_map(|(_, o)| o.image_id),
                );
            }
        }
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    async fn clone_config(&self, version: u32) -> anyhow::Result<u32> {
        let mut s = self.lock();
        let source = s
            .configs
            .iter()
            .find(|c| c.version == version)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("config {version} not found"))?;
        let new_version = s.configs.iter().map(|c| c.version).max().unwrap_or(0) + 1;
        s.configs.push(ConfigRow {
            version: new_version,
            active: false,
            ..source
        });
        let cards: Vec<(u16, InformationCardRow)> = s
            .cards
            .iter()
            .filter(|(v, _, _)| *v == version)
            .map(|(_, o, c)| (*o, c.clone()))
            .collect();
        for (order, card) in cards {
            let id = s.id();
            s.cards
                .push((new_version, order, InformationCardRow { id, ..card }));
        }
        let faq: Vec<(u16, FaqRow)> = s
            .faq
            .iter()
            .filter(|(v, _, _)| *v == version)
            .map(|(_, o, f)| (*o, f.clone()))
            .collect();
        for (order, f) in faq {
            let id = s.id();
            s.faq.push((new_version, order, FaqRow { id, ..f }));
        }
        let values: Vec<(u32, String)> = s
            .translation_values
            .iter()
            .filter(|((v, _), _)| *v == version)
            .map(|((_, k), value)| (*k, value.clone()))
            .collect();
        for (key, value) in values {
            s.translation_values.insert((new_version, key), value);
        }
        let forms: Vec<FormRow> = s
            .forms
            .iter()
            .filter(|f| f.config_version == version)
            .cloned()
            .collect();
        for f in forms {
            let form_id = s.id();
            s.forms.push(FormRow {
                id: form_id,
                config_version: new_version,
                ..f.clone()
            });
            let questions: Vec<(u16, FormQuestionRow)> = s
                .questions
                .iter()
                .filter(|(_, q)| q.form_id == f.id)
                .cloned()
                .collect();
            for (qo, q) in questions {
                let question_id = s.id();
                s.questions.push((
                    qo,
                    FormQuestionRow {
                        id: question_id,
                        form_id,
                        ..q.clone()
                    },
                ));
                let options: Vec<(u16, FormOptionRow)> = s
                    .options
                    .iter()
                    .filter(|(_, o)| o.question_id == q.id)
                    .cloned()
                    .collect();
                for (oo, o) in options {
                    let option_id = s.id();
                    s.options.push((
                        oo,
                        FormOptionRow {
                            id: option_id,
                            question_id,
                            ..o
                        },
                    ));
                }
                let labels: Vec<SliderLabelRow> = s
                    .labels
                    .iter()
                    .filter(|l| l.question_id == q.id)
                    .cloned()
                    .collect();
                for l in labels {
                    let label_id = s.id();
                    s.labels.push(SliderLabelRow {
                        id: label_id,
                        question_id,
                        ..l
                    });
                }
            }
        }
        let groups: Vec<TestGroupRow> = s
            .groups
            .iter()
            .filter(|g| g.config_version == version)
            .cloned()
            .collect();
        for g in groups {
            let group_id = s.id();
            s.groups.push(TestGroupRow {
                id: group_id,
                config_version: new_version,
                ..g.clone()
            });
            let phases: Vec<(u16, TestPhaseRow)> = s
                .phases
                .iter()
                .filter(|(_, p)| p.group_id == g.id)
                .cloned()
                .collect();
            for (po, p) in phases {
                let phase_id = s.id();
                s.phases.push((
                    po,
                    TestPhaseRow {
                        id: phase_id,
                        group_id,
                        ..p.clone()
                    },
                ));
                let questions: Vec<(u16, TestQuestionRow)> = s
                    .test_questions
                    .iter()
                    .filter(|(_, q)| q.phase_id == p.id)
                    .cloned()
                    .collect();
                for (qo, q) in questions {
                    let question_id = s.id();
                    s.test_questions.push((
                        qo,
                        TestQuestionRow {
                            id: question_id,
                            phase_id,
                            ..q.clone()
                        },
                    ));
                    let options: Vec<(u16, TestOptionRow)> = s
                        .test_options
                        .iter()
                        .filter(|(_, o)| o.question_id == q.id)
                        .cloned()
                        .collect();
                    for (oo, o) in options {
                        let option_id = s.id();
                        s.test_options.push((
                            oo,
                            TestOptionRow {
                                id: option_id,
                                question_id,
                                ..o
                            },
                        ));
                    }
                }
            }
        }
        Ok(new_version)
    }
}

#[async_trait]
impl HomeRepository for MemoryStore {
    async fn list_cards(&self, version: u32) -> anyhow::Result<Vec<InformationCardRow>> {
        let s = self.lock();
        Ok(sorted(
            s.cards
                .iter()
                .filter(|(v, _, _)| *v == version)
                .map(|(_, o, c)| (*o, c.clone()))
                .collect(),
        ))
    }

    async fn insert_card(
        &self,
        version: u32,
        order: u16,
        card: &InformationCardRow,
    ) -> anyhow::Result<u32> {
        let mut s = self.lock();
        let id = s.id();
        s.cards.push((
            version,
            order,
            InformationCardRow {
                id,
                ..card.clone()
            },
        ));
        Ok(id)
    }

    async fn update_card(&self, order: u16, card: &InformationCardRow) -> anyhow::Result<()> {
        let mut s = self.lock();
        if let Some(entry) = s.cards.iter_mut().find(|(_, _, c)| c.id == card.id) {
            entry.1 = order;
            entry.2 = card.clone();
        }
        Ok(())
    }

    async fn delete_cards(&self, ids: &[u32]) -> anyhow::Result<()> {
        self.lock().cards.retain(|(_, _, c)| !ids.contains(&c.id));
        Ok(())
    }

    async fn list_faq(&self, version: u32) -> anyhow::Result<Vec<FaqRow>> {
        let s = self.lock();
        Ok(sorted(
            s.faq
                .iter()
                .filter(|(v, _, _)| *v == version)
                .map(|(_, o, f)| (*o, f.clone()))
                .collect(),
        ))
    }

    async fn insert_faq(&self, version: u32, order: u16, faq: &FaqRow) -> anyhow::Result<u32> {
        let mut s = self.lock();
        let id = s.id();
        s.faq.push((version, order, FaqRow { id, ..faq.clone() }));
        Ok(id)
    }

    async fn update_faq(&self, order: u16, faq: &FaqRow) -> anyhow::Result<()> {
        let mut s = self.lock();
        if let Some(entry) = s.faq.iter_mut().find(|(_, _, f)| f.id == faq.id) {
            entry.1 = order;
            entry.2 = faq.clone();
        }
        Ok(())
    }

    async fn delete_faq(&self, ids: &[u32]) -> anyhow::Result<()> {
        self.lock().faq.retain(|(_, _, f)| !ids.contains(&f.id));
        Ok(())
    }
}

#[async_trait]
impl TranslationRepository for MemoryStore {
    async fn list_for_config(&self, version: u32) -> anyhow::Result<Vec<TranslationRow>> {
        let s = self.lock();
        Ok(s.translation_keys
            .iter()
            .map(|(id, key, arguments)| TranslationRow {
                key_id: *id,
                key: key.clone(),
                description: format!("{key} description"),
                arguments: arguments.clone(),
                value: s.translation_values.get(&(version, *id)).cloned(),
            })
            .collect())
    }

    async fn upsert_value(&self, version: u32, key_id: u32, value: &str) -> anyhow::Result<()> {
        self.lock()
            .translation_values
            .insert((version, key_id), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl FormRepository for MemoryStore {
    async fn find_by_config(
        &self,
        version: u32,
        kind: FormType,
    ) -> anyhow::Result<Option<FormRow>> {
        Ok(self
            .lock()
            .forms
            .iter()
            .find(|f| f.config_version == version && f.kind == kind)
            .cloned())
    }

    async fn list_questions(&self, form_id: u32) -> anyhow::Result<Vec<FormQuestionRow>> {
        let s = self.lock();
        Ok(sorted(
            s.questions
                .iter()
                .filter(|(_, q)| q.form_id == form_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_options(&self, form_id: u32) -> anyhow::Result<Vec<FormOptionRow>> {
        let s = self.lock();
        let questions: Vec<(u16, u32)> = s
            .questions
            .iter()
            .filter(|(_, q)| q.form_id == form_id)
            .map(|(o, q)| (*o, q.id))
            .collect();
        let mut options: Vec<(u16, u16, FormOptionRow)> = s
            .options
            .iter()
            .filter_map(|(o, opt)| {
                questions
                    .iter()
                    .find(|(_, q)| *q == opt.question_id)
                    .map(|(qo, _)| (*qo, *o, opt.clone()))
            })
            .collect();
        options.sort_by_key(|(q, o, _)| (*q, *o));
        Ok(options.into_iter().map(|(_, _, o)| o).collect())
    }

    async fn list_slider_labels(&self, form_id: u32) -> anyhow::Result<Vec<SliderLabelRow>> {
        let s = self.lock();
        let questions: Vec<u32> = s
            .questions
            .iter()
            .filter(|(_, q)| q.form_id == form_id)
            .map(|(_, q)| q.id)
            .collect();
        let mut labels: Vec<SliderLabelRow> = s
            .labels
            .iter()
            .filter(|l| questions.contains(&l.question_id))
            .cloned()
            .collect();
        labels.sort_by_key(|l| (l.question_id, l.number));
        Ok(labels)
    }

    async fn create_form(
        &self,
        version: u32,
        kind: FormType,
        title: Option<&str>,
    ) -> anyhow::Result<u32> {
        let mut s = self.lock();
        let id = s.id();
        s.forms.push(FormRow {
            id,
            config_version: version,
            title: title.map(str::to_string),
            kind,
        });
        Ok(id)
    }

    async fn update_form_title(&self, form_id: u32, title: Option<&str>) -> anyhow::Result<()> {
        let mut s = self.lock();
        if let Some(f) = s.forms.iter_mut().find(|f| f.id == form_id) {
            f.title = title.map(str::to_string);
        }
        Ok(())
    }

    async fn delete_form(&self, form_id: u32) -> anyhow::Result<()> {
        self.lock().remove_form(form_id);
        Ok(())
    }

    async fn insert_question(
        &self,
        form_id: u32,
        order: u16,
        fields: &FormQuestionFields,
        image_id: Option<u32>,
    ) -> anyhow::Result<u32> {
        let mut s = self.lock();
        let id = s.id();
        s.questions
            .push((order, question_row(id, form_id, fields, image_id)));
        Ok(id)
    }

    async fn update_question(
        &self,
        id: u32,
        order: u16,
        fields: &FormQuestionFields,
        image_id: Option<u32>,
    ) -> anyhow::Result<()> {
        let mut s = self.lock();
        if let Some(entry) = s.questions.iter_mut().find(|(_, q)| q.id == id) {
            let form_id = entry.1.form_id;
            *entry = (order, question_row(id, form_id, fields, image_id));
        }
        Ok(())
    }

    async fn delete_questions(&self, ids: &[u32]) -> anyhow::Result<()> {
        self.lock().remove_form_questions(ids);
        Ok(())
    }

    async fn insert_option(
        &self,
        question_id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
    ) -> anyhow::Result<u32> {
        let mut s = self.lock();
        let id = s.id();
        s.options.push((
            order,
            FormOptionRow {
                id,
                question_id,
                text: text.map(str::to_string),
                image_id,
            },
        ));
        Ok(id)
    }

    async fn update_option(
        &self,
        id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
    ) -> anyhow::Result<()> {
        let mut s = self.lock();
        if let Some(entry) = s.options.iter_mut().find(|(_, o)| o.id == id) {
            entry.0 = order;
            entry.1.text = text.map(str::to_string);
            entry.1.image_id = image_id;
        }
        Ok(())
    }

    async fn delete_options(&self, ids: &[u32]) -> anyhow::Result<()> {
        self.lock().options.retain(|(_, o)| !ids.contains(&o.id));
        Ok(())
    }

    async fn insert_slider_label(
        &self,
        question_id: u32,
        number: u16,
        label: &str,
    ) -> anyhow::Result<u32> {
        let mut s = self.lock();
        let id = s.id();
        s.labels.push(SliderLabelRow {
            id,
            question_id,
            number,
            label: label.into(),
        });
        Ok(id)
    }

    async fn update_slider_label(&self, id: u32, number: u16, label: &str) -> anyhow::Result<()> {
        let mut s = self.lock();
        if let Some(l) = s.labels.iter_mut().find(|l| l.id == id) {
            l.number = number;
            l.label = label.into();
        }
        Ok(())
    }

    async fn delete_slider_labels(&self, ids: &[u32]) -> anyhow::Result<()> {
        self.lock().labels.retain(|l| !ids.contains(&l.id));
        Ok(())
    }

    async fn form_has_submissions(&self, form_id: u32) -> anyhow::Result<bool> {
        Ok(self.lock().submissions.iter().any(|s| s.form_id == form_id))
    }

    async fn questions_with_answers(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>> {
        Ok(self
            .lock()
            .submissions
            .iter()
            .flat_map(|s| s.answers.iter())
            .map(|a| a.question_id)
            .filter(|id| ids.contains(id))
            .collect())
    }

    async fn options_with_answers(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>> {
        Ok(self
            .lock()
            .submissions
            .iter()
            .flat_map(|s| s.answers.iter())
            .filter_map(|a| a.option_id)
            .filter(|id| ids.contains(id))
            .collect())
    }
}

#[async_trait]
impl FormAnswerRepository for MemoryStore {
    async fn has_submission(&self, attempt_id: u64, form_id: u32) -> anyhow::Result<bool> {
        Ok(self
            .lock()
            .submissions
            .iter()
            .any(|s| s.attempt_id == attempt_id && s.form_id == form_id))
    }

    async fn submitted_types(&self, attempt_id: u64) -> anyhow::Result<Vec<FormType>> {
        Ok(self
            .lock()
            .submissions
            .iter()
            .filter(|s| s.attempt_id == attempt_id)
            .map(|s| s.form_type)
            .collect())
    }

    async fn save_submission(
        &self,
        attempt_id: u64,
        form_id: u32,
        timestamp: DateTime<Utc>,
        answers: &[FormAnswer],
    ) -> anyhow::Result<u64> {
        let mut s = self.lock();
        let form = s
            .forms
            .iter()
            .find(|f| f.id == form_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("form {form_id} not found"))?;
        let id = s.big_id();
        s.submissions.push(FormSubmissionRow {
            id,
            attempt_id,
            form_id,
            form_type: form.kind,
            config_version: form.config_version,
            timestamp,
            answers: answers.to_vec(),
        });
        Ok(id)
    }

    async fn list_for_user(&self, user_id: u32) -> anyhow::Result<Vec<FormSubmissionRow>> {
        let s = self.lock();
        let attempts: Vec<u64> = s
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.id)
            .collect();
        Ok(s.submissions
            .iter()
            .filter(|sub| attempts.contains(&sub.attempt_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TestGroupRepository for MemoryStore {
    async fn list_groups(&self, version: u32) -> anyhow::Result<Vec<TestGroupRow>> {
        Ok(self
            .lock()
            .groups
            .iter()
            .filter(|g| g.config_version == version)
            .cloned()
            .collect())
    }

    async fn find_group(&self, id: u32) -> anyhow::Result<Option<TestGroupRow>> {
        Ok(self.lock().groups.iter().find(|g| g.id == id).cloned())
    }

    async fn list_phases(&self, group_id: u32) -> anyhow::Result<Vec<TestPhaseRow>> {
        let s = self.lock();
        Ok(sorted(
            s.phases
                .iter()
                .filter(|(_, p)| p.group_id == group_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_questions(&self, group_id: u32) -> anyhow::Result<Vec<TestQuestionRow>> {
        Ok(self
            .lock()
            .group_questions(group_id)
            .into_iter()
            .map(|(_, _, q)| q)
            .collect())
    }

    async fn list_options(&self, group_id: u32) -> anyhow::Result<Vec<TestOptionRow>> {
        let s = self.lock();
        let mut out = Vec::new();
        for (_, _, q) in s.group_questions(group_id) {
            out.extend(sorted(
                s.test_options
                    .iter()
                    .filter(|(_, o)| o.question_id == q.id)
                    .cloned()
                    .collect(),
            ));
        }
        Ok(out)
    }

    async fn question_group_id(&self, question_id: u32) -> anyhow::Result<Option<u32>> {
        let s = self.lock();
        Ok(s.question_phase(question_id)
            .and_then(|p| s.phase_group(p)))
    }

    async fn option_group_id(&self, option_id: u32) -> anyhow::Result<Option<u32>> {
        let s = self.lock();
        Ok(s.option_question(option_id)
            .and_then(|q| s.question_phase(q))
            .and_then(|p| s.phase_group(p)))
    }

    async fn insert_group(&self, version: u32, group: &TestGroupUpdate) -> anyhow::Result<u32> {
        let mut s = self.lock();
        s.check_group_write(version, None, &group.label)?;
        let id = s.id();
        s.groups.push(group_row(id, version, group));
        Ok(id)
    }

    async fn update_group(&self, id: u32, group: &TestGroupUpdate) -> anyhow::Result<()> {
        let mut s = self.lock();
        let Some(version) = s.groups.iter().find(|g| g.id == id).map(|g| g.config_version) else {
            return Ok(());
        };
        s.check_group_write(version, Some(id), &group.label)?;
        if let Some(g) = s.groups.iter_mut().find(|g| g.id == id) {
            *g = group_row(id, version, group);
        }
        Ok(())
    }

    async fn park_labels(&self, ids: &[u32]) -> anyhow::Result<()> {
        for g in self.lock().groups.iter_mut().filter(|g| ids.contains(&g.id)) {
            g.label = format!("{PARKED_LABEL_PREFIX}{}", g.id);
        }
        Ok(())
    }

    async fn delete_groups(&self, ids: &[u32]) -> anyhow::Result<()> {
        self.lock().remove_groups(ids);
        Ok(())
    }

    async fn insert_phase(
        &self,
        group_id: u32,
        order: u16,
        randomize_questions: bool,
    ) -> anyhow::Result<u32> {
        let mut s = self.lock();
        let id = s.id();
        s.phases.push((
            order,
            TestPhaseRow {
                id,
                group_id,
                randomize_questions,
            },
        ));
        Ok(id)
    }

    async fn update_phase(
        &self,
        id: u32,
        order: u16,
        randomize_questions: bool,
    ) -> anyhow::Result<()> {
        let mut s = self.lock();
        if let Some(entry) = s.phases.iter_mut().find(|(_, p)| p.id == id) {
            entry.0 = order;
            entry.1.randomize_questions = randomize_questions;
        }
        Ok(())
    }

    async fn delete_phases(&self, ids: &[u32]) -> anyhow::Result<()> {
        self.lock().remove_phases(ids);
        Ok(())
    }

    async fn insert_question(
        &self,
        phase_id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
        randomize_options: bool,
    ) -> anyhow::Result<u32> {
        let mut s = self.lock();
        let id = s.id();
        s.test_questions.push((
            order,
            TestQuestionRow {
                id,
                phase_id,
                text: text.map(str::to_string),
                image_id,
                randomize_options,
            },
        ));
        Ok(id)
    }

    async fn update_question(
        &self,
        id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
        randomize_options: bool,
    ) -> anyhow::Result<()> {
        let mut s = self.lock();
        if let Some(entry) = s.test_questions.iter_mut().find(|(_, q)| q.id == id) {
            entry.0 = order;
            entry.1.text = text.map(str::to_string);
            entry.1.image_id = image_id;
            entry.1.randomize_options = randomize_options;
        }
        Ok(())
    }

    async fn delete_questions(&self, ids: &[u32]) -> anyhow::Result<()> {
        self.lock().remove_questions(ids);
        Ok(())
    }

    async fn insert_option(
        &self,
        question_id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
        correct: bool,
    ) -> anyhow::Result<u32> {
        let mut s = self.lock();
        let id = s.id();
        s.test_options.push((
            order,
            TestOptionRow {
                id,
                question_id,
                text: text.map(str::to_string),
                image_id,
                correct,
            },
        ));
        Ok(id)
    }

    async fn update_option(
        &self,
        id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
        correct: bool,
    ) -> anyhow::Result<()> {
        let mut s = self.lock();
        if let Some(entry) = s.test_options.iter_mut().find(|(_, o)| o.id == id) {
            entry.0 = order;
            entry.1.text = text.map(str::to_string);
            entry.1.image_id = image_id;
            entry.1.correct = correct;
        }
        Ok(())
    }

    async fn delete_options(&self, ids: &[u32]) -> anyhow::Result<()> {
        self.lock().remove_options(ids);
        Ok(())
    }

    async fn groups_with_user_data(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>> {
        Ok(self
            .lock()
            .attempts
            .iter()
            .map(|a| a.group_id)
            .filter(|id| ids.contains(id))
            .collect())
    }

    async fn phases_with_user_data(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>> {
        let s = self.lock();
        let mut out = HashSet::new();
        for (_, log) in &s.question_logs {
            if let Some(p) = s.question_phase(log.question_id) {
                if ids.contains(&p) {
                    out.insert(p);
                }
            }
        }
        for (_, option_id, _, _) in &s.option_logs {
            if let Some(p) = s.option_question(*option_id).and_then(|q| s.question_phase(q)) {
                if ids.contains(&p) {
                    out.insert(p);
                }
            }
        }
        Ok(out)
    }

    async fn questions_with_user_data(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>> {
        let s = self.lock();
        let mut out: HashSet<u32> = s
            .question_logs
            .iter()
            .map(|(_, l)| l.question_id)
            .filter(|id| ids.contains(id))
            .collect();
        out.extend(
            s.option_logs
                .iter()
                .filter_map(|(_, o, _, _)| s.option_question(*o))
                .filter(|id| ids.contains(id)),
        );
        Ok(out)
    }

    async fn options_with_user_data(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>> {
        Ok(self
            .lock()
            .option_logs
            .iter()
            .map(|(_, o, _, _)| *o)
            .filter(|id| ids.contains(id))
            .collect())
    }
}

fn group_row(id: u32, version: u32, group: &TestGroupUpdate) -> TestGroupRow {
    TestGroupRow {
        id,
        config_version: version,
        label: group.label.clone(),
        probability: group.probability,
        greeting: group.greeting.clone(),
        allow_previous_phase: group.allow_previous_phase,
        allow_previous_question: group.allow_previous_question,
        allow_skip_question: group.allow_skip_question,
        randomize_phases: group.randomize_phases,
    }
}

#[async_trait]
impl AttemptRepository for MemoryStore {
    async fn find_unfinished(
        &self,
        user_id: u32,
        config_version: u32,
    ) -> anyhow::Result<Option<AttemptRow>> {
        Ok(self
            .lock()
            .attempts
            .iter()
            .find(|a| a.user_id == user_id && a.config_version == config_version && a.end.is_none())
            .cloned())
    }

    async fn create(
        &self,
        user_id: u32,
        group_id: u32,
        start: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        let mut s = self.lock();
        let group = s
            .groups
            .iter()
            .find(|g| g.id == group_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("group {group_id} not found"))?;
        let id = s.big_id();
        s.attempts.push(AttemptRow {
            id,
            user_id,
            group_id,
            group_label: group.label,
            config_version: group.config_version,
            start,
            end: None,
        });
        Ok(id)
    }

    async fn finish(&self, id: u64, end: DateTime<Utc>) -> anyhow::Result<()> {
        let mut s = self.lock();
        if let Some(a) = s.attempts.iter_mut().find(|a| a.id == id) {
            a.end = Some(end);
        }
        Ok(())
    }

    async fn delete(&self, id: u64) -> anyhow::Result<()> {
        let mut s = self.lock();
        s.question_logs.retain(|(a, _)| *a != id);
        s.option_logs.retain(|(a, _, _, _)| *a != id);
        s.submissions.retain(|sub| sub.attempt_id != id);
        s.attempts.retain(|a| a.id != id);
        Ok(())
    }

    async fn list_finished(&self) -> anyhow::Result<Vec<AttemptRow>> {
        let mut rows: Vec<AttemptRow> = self
            .lock()
            .attempts
            .iter()
            .filter(|a| a.end.is_some())
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.start.cmp(&a.start).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn latest_finished(
        &self,
        user_id: u32,
        config_version: u32,
    ) -> anyhow::Result<Option<AttemptRow>> {
        Ok(self
            .list_finished()
            .await?
            .into_iter()
            .find(|a| a.user_id == user_id && a.config_version == config_version))
    }

    async fn list_by_config(&self, config_version: u32) -> anyhow::Result<Vec<AttemptRow>> {
        Ok(self
            .lock()
            .attempts
            .iter()
            .filter(|a| a.config_version == config_version)
            .cloned()
            .collect())
    }

    async fn list_by_user(&self, user_id: u32) -> anyhow::Result<Vec<AttemptRow>> {
        Ok(self
            .lock()
            .attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EventLogRepository for MemoryStore {
    async fn save_question_log(
        &self,
        attempt_id: u64,
        question_id: u32,
        timestamp: DateTime<Utc>,
        duration: u32,
    ) -> anyhow::Result<()> {
        self.lock().question_logs.push((
            attempt_id,
            QuestionLogRow {
                question_id,
                timestamp,
                duration,
            },
        ));
        Ok(())
    }

    async fn save_option_log(
        &self,
        attempt_id: u64,
        option_id: u32,
        kind: OptionEventType,
        timestamp: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.lock()
            .option_logs
            .push((attempt_id, option_id, kind, timestamp));
        Ok(())
    }

    async fn list_question_logs(&self, attempt_id: u64) -> anyhow::Result<Vec<QuestionLogRow>> {
        let mut rows: Vec<QuestionLogRow> = self
            .lock()
            .question_logs
            .iter()
            .filter(|(a, _)| *a == attempt_id)
            .map(|(_, l)| l.clone())
            .collect();
        rows.sort_by_key(|l| l.timestamp);
        Ok(rows)
    }

    async fn list_option_logs(&self, attempt_id: u64) -> anyhow::Result<Vec<OptionLogRow>> {
        let s = self.lock();
        let mut rows: Vec<OptionLogRow> = s
            .option_logs
            .iter()
            .filter(|(a, _, _, _)| *a == attempt_id)
            .filter_map(|(_, option_id, kind, timestamp)| {
                let (_, option) = s.test_options.iter().find(|(_, o)| o.id == *option_id)?;
                Some(OptionLogRow {
                    option_id: *option_id,
                    question_id: option.question_id,
                    correct: option.correct,
                    kind: *kind,
                    timestamp: *timestamp,
                })
            })
            .collect();
        rows.sort_by_key(|l| l.timestamp);
        Ok(rows)
    }
}

#[async_trait]
impl ImageRepository for MemoryStore {
    async fn find(&self, id: u32) -> anyhow::Result<Option<ImageRow>> {
        Ok(self.lock().images.iter().find(|i| i.id == id).cloned())
    }

    async fn find_many(&self, ids: &[u32]) -> anyhow::Result<Vec<ImageRow>> {
        Ok(self
            .lock()
            .images
            .iter()
            .filter(|i| ids.contains(&i.id))
            .cloned()
            .collect())
    }

    async fn create(&self, path: &str, alt: &str) -> anyhow::Result<ImageRow> {
        let mut s = self.lock();
        if s.images.iter().any(|i| i.path == path) {
            anyhow::bail!("duplicate image path {path}");
        }
        let row = ImageRow {
            id: s.id(),
            path: path.into(),
            alt: alt.into(),
        };
        s.images.push(row.clone());
        Ok(row)
    }

    async fn update_path(&self, id: u32, path: &str) -> anyhow::Result<()> {
        let mut s = self.lock();
        if let Some(i) = s.images.iter_mut().find(|i| i.id == id) {
            i.path = path.into();
        }
        Ok(())
    }

    async fn delete(&self, id: u32) -> anyhow::Result<()> {
        self.lock().images.retain(|i| i.id != id);
        Ok(())
    }

    async fn is_referenced(&self, id: u32) -> anyhow::Result<bool> {
        Ok(self.lock().image_referenced(id))
    }
}
