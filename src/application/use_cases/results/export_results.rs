use crate::application::dto::results::ResultsByUser;
use crate::application::errors::ApiError;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::results::{
    ResultPorts, forms_csv, pack_tar_gz, results_for_user, tests_csv,
};
use crate::domain::users::user::Role;

/// Which part of the results an export carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsKind {
    All,
    Forms,
    Tests,
}

impl ResultsKind {
    pub fn archive_name(&self) -> &'static str {
        match self {
            ResultsKind::All => "results.tar.gz",
            ResultsKind::Forms => "form-results.tar.gz",
            ResultsKind::Tests => "test-results.tar.gz",
        }
    }
}

#[derive(Debug)]
pub struct ResultsArchive {
    pub file_name: &'static str,
    pub bytes: Vec<u8>,
}

/// Builds a gzip tarball with one JSON file, or one or two CSV files, per participant.
pub struct ExportResults<'a> {
    pub users: &'a dyn UserRepository,
    pub ports: ResultPorts<'a>,
}

impl<'a> ExportResults<'a> {
    pub async fn execute(&self, kind: ResultsKind, csv: bool) -> Result<ResultsArchive, ApiError> {
        let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
        for user in self.users.list_by_role(Role::User).await? {
            let results = results_for_user(&self.ports, &user).await?;
            let name = entry_stem(&user.username);
            match (kind, csv) {
                (ResultsKind::All, false) => {
                    entries.push((format!("{name}.json"), to_json(&results)?));
                }
                (ResultsKind::Forms, false) => {
                    entries.push((format!("{name}.json"), to_json(&results.forms())?));
                }
                (ResultsKind::Tests, false) => {
                    entries.push((format!("{name}.json"), to_json(&results.tests())?));
                }
                (ResultsKind::All, true) => {
                    entries.push((format!("{name}-forms.csv"), forms_csv(&results)?));
                    entries.push((format!("{name}-test.csv"), tests_csv(&results)?));
                }
                (ResultsKind::Forms, true) => {
                    entries.push((format!("{name}-forms.csv"), forms_csv(&results)?));
                }
                (ResultsKind::Tests, true) => {
                    entries.push((format!("{name}-test.csv"), tests_csv(&results)?));
                }
            }
        }

        let bytes = pack_tar_gz(&entries)?;
        tracing::info!(kind = ?kind, csv, files = entries.len(), bytes = bytes.len(), "results_exported");
        Ok(ResultsArchive {
            file_name: kind.archive_name(),
            bytes,
        })
    }
}

/// CSV files of one participant, packed together or served one at a time.
pub struct ExportUserResults<'a> {
    pub users: &'a dyn UserRepository,
    pub ports: ResultPorts<'a>,
}

impl<'a> ExportUserResults<'a> {
    async fn load(&self, user_id: u32) -> Result<ResultsByUser, ApiError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|u| u.role == Role::User)
            .ok_or_else(|| ApiError::not_found(format!("User {user_id} not found")))?;
        Ok(results_for_user(&self.ports, &user).await?)
    }

    /// `forms.csv` and `test.csv` in a gzip tarball.
    pub async fn archive(&self, user_id: u32) -> Result<ResultsArchive, ApiError> {
        let results = self.load(user_id).await?;
        let entries = vec![
            ("forms.csv".to_string(), forms_csv(&results)?),
            ("test.csv".to_string(), tests_csv(&results)?),
        ];
        let bytes = pack_tar_gz(&entries)?;
        tracing::info!(user_id, bytes = bytes.len(), "user_results_exported");
        Ok(ResultsArchive {
            file_name: ResultsKind::All.archive_name(),
            bytes,
        })
    }

    pub async fn forms_csv(&self, user_id: u32) -> Result<Vec<u8>, ApiError> {
        Ok(forms_csv(&self.load(user_id).await?)?)
    }

    pub async fn tests_csv(&self, user_id: u32) -> Result<Vec<u8>, ApiError> {
        Ok(tests_csv(&self.load(user_id).await?)?)
    }
}

/// Usernames may hold characters that tar treats as path components.
fn entry_stem(username: &str) -> String {
    let stem: String = username
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    if stem.starts_with('.') {
        format!("_{stem}")
    } else {
        stem
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> anyhow::Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}
