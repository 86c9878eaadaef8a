use std::collections::HashMap;

use crate::application::dto::attempts::UserTestAttemptAnswer;
use crate::application::dto::events::{
    OptionEventLog, OptionSelectionEvent, QuestionEventLog, QuestionTimestamp,
};
use crate::application::ports::event_log_repository::{OptionLogRow, QuestionLogRow};
use crate::domain::events::option_event::OptionEventType;

/// Correct and answered question counts of one attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub correct: u32,
    pub answered: u32,
}

impl Score {
    pub fn of(logs: &[QuestionEventLog]) -> Self {
        let answered = logs.iter().filter(|l| !l.skipped).count() as u32;
        let correct = logs.iter().filter(|l| l.correct).count() as u32;
        Score { correct, answered }
    }

    /// Percentage of answered questions that were correct.
    pub fn accuracy(&self) -> f64 {
        if self.answered == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.answered) * 100.0
        }
    }
}

/// Folds the raw logs of one attempt into per-question summaries, ordered by first activity.
pub fn build_question_logs(
    question_logs: &[QuestionLogRow],
    option_logs: &[OptionLogRow],
) -> Vec<QuestionEventLog> {
    let mut order: Vec<(i64, u32)> = Vec::new();
    let mut visits: HashMap<u32, Vec<QuestionTimestamp>> = HashMap::new();
    let mut events: HashMap<u32, Vec<&OptionLogRow>> = HashMap::new();

    for log in question_logs {
        let start = log.timestamp.timestamp_millis();
        visits.entry(log.question_id).or_default().push(QuestionTimestamp {
            start,
            end: start + i64::from(log.duration),
        });
        order.push((start, log.question_id));
    }
    for log in option_logs {
        events.entry(log.question_id).or_default().push(log);
        order.push((log.timestamp.timestamp_millis(), log.question_id));
    }
    order.sort_by_key(|(ts, _)| *ts);

    let mut seen = Vec::new();
    for (_, question_id) in order {
        if !seen.contains(&question_id) {
            seen.push(question_id);
        }
    }

    seen.into_iter()
        .map(|question_id| {
            let mut timestamps = visits.remove(&question_id).unwrap_or_default();
            timestamps.sort_by_key(|t| t.start);
            let mut option_events = events.remove(&question_id).unwrap_or_default();
            option_events.sort_by_key(|e| e.timestamp);

            let final_choice = option_events.iter().rev().find(|e| e.kind.is_change());
            let (correct, skipped) = match final_choice {
                Some(e) if e.kind == OptionEventType::Select => (e.correct, false),
                _ => (false, true),
            };

            QuestionEventLog {
                question_id,
                timestamps,
                correct,
                skipped,
                total_option_changes: option_events.iter().filter(|e| e.kind.is_change()).count()
                    as u32,
                total_option_hovers: option_events
                    .iter()
                    .filter(|e| e.kind == OptionEventType::Hover)
                    .count() as u32,
                option_selections: option_events
                    .iter()
                    .filter(|e| e.kind == OptionEventType::Select)
                    .map(|e| OptionSelectionEvent {
                        option_id: e.option_id,
                        timestamp: e.timestamp.timestamp_millis(),
                    })
                    .collect(),
                events: option_events
                    .iter()
                    .map(|e| OptionEventLog {
                        option_id: e.option_id,
                        kind: e.kind,
                        timestamp: e.timestamp.timestamp_millis(),
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Option currently chosen for each question, following the select/deselect history.
pub fn current_answers(option_logs: &[OptionLogRow]) -> Vec<UserTestAttemptAnswer> {
    let mut sorted: Vec<&OptionLogRow> = option_logs.iter().filter(|e| e.kind.is_change()).collect();
    sorted.sort_by_key(|e| e.timestamp);

    let mut answers: Vec<(u32, Option<u32>)> = Vec::new();
    for event in sorted {
        let choice = match event.kind {
            OptionEventType::Select => Some(event.option_id),
            _ => None,
        };
        match answers.iter_mut().find(|(q, _)| *q == event.question_id) {
            Some(entry) => entry.1 = choice,
            None => answers.push((event.question_id, choice)),
        }
    }
    answers
        .into_iter()
        .filter_map(|(question_id, option_id)| {
            option_id.map(|option_id| UserTestAttemptAnswer {
                question_id,
                option_id,
            })
        })
        .collect()
}
