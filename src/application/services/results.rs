use std::collections::BTreeMap;
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::application::dto::results::{
    FormSubmission, ResultsByConfig, ResultsByUser, TestResult,
};
use crate::application::dto::users::User;
use crate::application::ports::attempt_repository::{AttemptRepository, AttemptRow};
use crate::application::ports::event_log_repository::EventLogRepository;
use crate::application::ports::form_answer_repository::FormAnswerRepository;
use crate::application::ports::user_repository::UserRow;
use crate::application::services::event_logs::{self, Score};
use crate::domain::forms::form::FormType;

pub struct ResultPorts<'a> {
    pub attempts: &'a dyn AttemptRepository,
    pub answers: &'a dyn FormAnswerRepository,
    pub events: &'a dyn EventLogRepository,
}

/// Result of one finished attempt with its per-question event summaries.
pub async fn test_result(
    events: &dyn EventLogRepository,
    attempt: &AttemptRow,
) -> anyhow::Result<TestResult> {
    let question_logs = events.list_question_logs(attempt.id).await?;
    let option_logs = events.list_option_logs(attempt.id).await?;
    let question_events = event_logs::build_question_logs(&question_logs, &option_logs);
    let score = Score::of(&question_events);
    let end = attempt.end.unwrap_or(attempt.start);
    Ok(TestResult {
        attempt_id: attempt.id,
        group: attempt.group_label.clone(),
        timestamp: attempt.start.timestamp_millis(),
        time_taken: (end - attempt.start).num_milliseconds(),
        correct_questions: score.correct,
        questions_answered: score.answered,
        accuracy: score.accuracy(),
        question_events,
    })
}

/// Everything a user produced, grouped by configuration version.
pub async fn results_for_user(
    ports: &ResultPorts<'_>,
    user: &UserRow,
) -> anyhow::Result<ResultsByUser> {
    let mut by_version: BTreeMap<u32, ResultsByConfig> = BTreeMap::new();

    for submission in ports.answers.list_for_user(user.id).await? {
        let results = config_entry(&mut by_version, submission.config_version);
        let dto = FormSubmission {
            attempt_id: submission.attempt_id,
            timestamp: submission.timestamp.timestamp_millis(),
            answers: submission.answers,
        };
        match submission.form_type {
            FormType::Pre => results.pre_test_form.push(dto),
            FormType::Post => results.post_test_form.push(dto),
        }
    }

    for attempt in ports.attempts.list_by_user(user.id).await? {
        if attempt.end.is_none() {
            continue;
        }
        let result = test_result(ports.events, &attempt).await?;
        config_entry(&mut by_version, attempt.config_version)
            .attempts_results
            .push(result);
    }

    Ok(ResultsByUser {
        user: user.to_user(),
        results: by_version.into_values().collect(),
    })
}

fn config_entry(map: &mut BTreeMap<u32, ResultsByConfig>, version: u32) -> &mut ResultsByConfig {
    map.entry(version).or_insert_with(|| ResultsByConfig {
        config_version: version,
        pre_test_form: Vec::new(),
        post_test_form: Vec::new(),
        attempts_results: Vec::new(),
    })
}

fn user_columns(user: &User) -> [String; 6] {
    [
        user.id.to_string(),
        user.username.clone(),
        user.anonymous.to_string(),
        user.name.clone().unwrap_or_default(),
        user.email.clone().unwrap_or_default(),
        user.age.map(|a| a.to_string()).unwrap_or_default(),
    ]
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> anyhow::Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("csv flush failed: {}", e.error()))
}

pub fn forms_csv(results: &ResultsByUser) -> anyhow::Result<Vec<u8>> {
    let mut w = csv_writer();
    w.write_record([
        "user_id",
        "user_username",
        "user_anonymous",
        "user_name",
        "user_email",
        "user_age",
        "config_version",
        "attempt_id",
        "form_type",
        "timestamp",
        "question_id",
        "option_id",
        "value",
        "answer",
    ])?;
    let user = user_columns(&results.user);
    for config in &results.results {
        let forms = [
            (FormType::Pre, &config.pre_test_form),
            (FormType::Post, &config.post_test_form),
        ];
        for (kind, submissions) in forms {
            for submission in submissions {
                for answer in &submission.answers {
                    let mut record: Vec<String> = user.to_vec();
                    record.extend([
                        config.config_version.to_string(),
                        submission.attempt_id.to_string(),
                        kind.as_str().to_string(),
                        submission.timestamp.to_string(),
                        answer.question_id.to_string(),
                        opt(answer.option_id),
                        opt(answer.value),
                        answer.answer.clone().unwrap_or_default(),
                    ]);
                    w.write_record(&record)?;
                }
            }
        }
    }
    finish(w)
}

pub fn tests_csv(results: &ResultsByUser) -> anyhow::Result<Vec<u8>> {
    let mut w = csv_writer();
    w.write_record([
        "user_id",
        "user_username",
        "user_anonymous",
        "user_name",
        "user_email",
        "user_age",
        "config_version",
        "attempt_id",
        "group",
        "timestamp",
        "time_taken",
        "correct_questions",
        "questions_answered",
        "accuracy",
        "question_id",
        "question_start",
        "question_end",
        "question_correct",
        "question_skipped",
        "total_option_changes",
        "total_option_hovers",
        "event_option_id",
        "event_type",
        "event_timestamp",
    ])?;
    let user = user_columns(&results.user);
    for config in &results.results {
        for attempt in &config.attempts_results {
            let attempt_columns = [
                config.config_version.to_string(),
                attempt.attempt_id.to_string(),
                attempt.group.clone(),
                attempt.timestamp.to_string(),
                attempt.time_taken.to_string(),
                attempt.correct_questions.to_string(),
                attempt.questions_answered.to_string(),
                format!("{:.2}", attempt.accuracy),
            ];
            for question in &attempt.question_events {
                let question_columns = |start: Option<i64>, end: Option<i64>| {
                    [
                        question.question_id.to_string(),
                        opt(start),
                        opt(end),
                        question.correct.to_string(),
                        question.skipped.to_string(),
                        question.total_option_changes.to_string(),
                        question.total_option_hovers.to_string(),
                    ]
                };
                let mut rows: Vec<Vec<String>> = Vec::new();
                if question.timestamps.is_empty() {
                    for event in &question.events {
                        rows.push(
                            question_columns(None, None)
                                .into_iter()
                                .chain([
                                    event.option_id.to_string(),
                                    event.kind.as_str().to_string(),
                                    event.timestamp.to_string(),
                                ])
                                .collect(),
                        );
                    }
                }
                for window in &question.timestamps {
                    let inside: Vec<_> = question
                        .events
                        .iter()
                        .filter(|e| e.timestamp >= window.start && e.timestamp <= window.end)
                        .collect();
                    let columns = question_columns(Some(window.start), Some(window.end));
                    if inside.is_empty() {
                        rows.push(
                            columns
                                .clone()
                                .into_iter()
                                .chain([String::new(), String::new(), String::new()])
                                .collect(),
                        );
                    }
                    for event in inside {
                        rows.push(
                            columns
                                .clone()
                                .into_iter()
                                .chain([
                                    event.option_id.to_string(),
                                    event.kind.as_str().to_string(),
                                    event.timestamp.to_string(),
                                ])
                                .collect(),
                        );
                    }
                }
                for row in rows {
                    let mut record: Vec<String> = user.to_vec();
                    record.extend(attempt_columns.iter().cloned());
                    record.extend(row);
                    w.write_record(&record)?;
                }
            }
        }
    }
    finish(w)
}

/// Packs `(file name, bytes)` entries into a gzip-compressed tar archive.
pub fn pack_tar_gz(entries: &[(String, Vec<u8>)]) -> anyhow::Result<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let mtime = chrono::Utc::now().timestamp().max(0) as u64;
    for (name, bytes) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(bytes.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(mtime);
        header.set_cksum();
        builder.append_data(&mut header, name, bytes.as_slice())?;
    }
    let mut encoder = builder.into_inner()?;
    encoder.flush()?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::events::{OptionEventLog, QuestionEventLog, QuestionTimestamp};
    use crate::application::dto::forms::FormAnswer;
    use crate::domain::events::option_event::OptionEventType;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn sample() -> ResultsByUser {
        ResultsByUser {
            user: User {
                id: 3,
                username: "ana".into(),
                anonymous: false,
                name: Some("Ana".into()),
                email: None,
                age: Some(30),
            },
            results: vec![ResultsByConfig {
                config_version: 1,
                pre_test_form: vec![FormSubmission {
                    attempt_id: 9,
                    timestamp: 1_000,
                    answers: vec![
                        FormAnswer {
                            question_id: 4,
                            option_id: Some(5),
                            value: None,
                            answer: None,
                        },
                        FormAnswer {
                            question_id: 6,
                            option_id: None,
                            value: None,
                            answer: Some("fine; thanks".into()),
                        },
                    ],
                }],
                post_test_form: Vec::new(),
                attempts_results: vec![TestResult {
                    attempt_id: 9,
                    group: "control".into(),
                    timestamp: 1_000,
                    time_taken: 5_000,
                    correct_questions: 1,
                    questions_answered: 1,
                    accuracy: 100.0,
                    question_events: vec![QuestionEventLog {
                        question_id: 11,
                        timestamps: vec![
                            QuestionTimestamp {
                                start: 2_000,
                                end: 2_500,
                            },
                            QuestionTimestamp {
                                start: 3_000,
                                end: 3_100,
                            },
                        ],
                        correct: true,
                        skipped: false,
                        total_option_changes: 1,
                        total_option_hovers: 1,
                        option_selections: Vec::new(),
                        events: vec![
                            OptionEventLog {
                                option_id: 21,
                                kind: OptionEventType::Hover,
                                timestamp: 2_100,
                            },
                            OptionEventLog {
                                option_id: 21,
                                kind: OptionEventType::Select,
                                timestamp: 2_200,
                            },
                        ],
                    }],
                }],
            }],
        }
    }

    #[test]
    fn forms_csv_has_one_row_per_answer() {
        let csv = String::from_utf8(forms_csv(&sample()).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("user_id;user_username;"));
        assert_eq!(lines[1], "3;ana;false;Ana;;30;1;9;pre;1000;4;5;;");
        assert!(lines[2].ends_with(";6;;;\"fine; thanks\""));
    }

    #[test]
    fn tests_csv_expands_events_inside_visit_windows() {
        let csv = String::from_utf8(tests_csv(&sample()).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        // header, two events in the first window, one empty row for the second window
        assert_eq!(lines.len(), 4);
        assert!(lines[1].ends_with(";11;2000;2500;true;false;1;1;21;hover;2100"));
        assert!(lines[2].ends_with(";21;select;2200"));
        assert!(lines[3].ends_with(";11;3000;3100;true;false;1;1;;;"));
        assert!(lines[1].contains(";control;1000;5000;1;1;100.00;"));
    }

    #[test]
    fn archive_contains_every_entry() {
        let bytes = pack_tar_gz(&[
            ("ana.json".to_string(), b"{}".to_vec()),
            ("bob.json".to_string(), b"[]".to_vec()),
        ])
        .unwrap();
        let mut archive = tar::Archive::new(GzDecoder::new(bytes.as_slice()));
        let mut seen = Vec::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            seen.push((name, content));
        }
        assert_eq!(
            seen,
            vec![
                ("ana.json".to_string(), "{}".to_string()),
                ("bob.json".to_string(), "[]".to_string())
            ]
        );
    }
}
