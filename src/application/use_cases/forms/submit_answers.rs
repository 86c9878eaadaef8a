use std::collections::{HashMap, HashSet};

use chrono::Utc;

use crate::application::dto::forms::{FormAnswer, NewFormAnswer, NewFormAnswers};
use crate::application::errors::ApiError;
use crate::application::ports::attempt_repository::AttemptRepository;
use crate::application::ports::config_repository::ConfigRepository;
use crate::application::ports::form_answer_repository::FormAnswerRepository;
use crate::application::ports::form_repository::{FormOptionRow, FormQuestionRow, FormRepository};
use crate::application::use_cases::attempts::unfinished_attempt;
use crate::domain::forms::form::{FormQuestionType, FormType};

/// Stores the answers to the pre- or post-test form of the caller's unfinished attempt.
pub struct SubmitFormAnswers<'a> {
    pub configs: &'a dyn ConfigRepository,
    pub attempts: &'a dyn AttemptRepository,
    pub forms: &'a dyn FormRepository,
    pub answers: &'a dyn FormAnswerRepository,
}

/// Answers already accepted for one question of the submission.
#[derive(Default)]
struct Given {
    options: HashSet<u32>,
    free_text: bool,
}

impl Given {
    fn count(&self) -> usize {
        self.options.len() + usize::from(self.free_text)
    }
}

impl<'a> SubmitFormAnswers<'a> {
    pub async fn execute(
        &self,
        user_id: u32,
        kind: FormType,
        req: &NewFormAnswers,
    ) -> Result<(), ApiError> {
        let attempt = unfinished_attempt(self.configs, self.attempts, user_id).await?;
        let form = self
            .forms
            .find_by_config(attempt.config_version, kind)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Form of type {} not found", kind.as_str())))?;
        if self.answers.has_submission(attempt.id, form.id).await? {
            return Err(ApiError::conflict("Form has already been answered"));
        }

        let questions = self.forms.list_questions(form.id).await?;
        let options = self.forms.list_options(form.id).await?;

        let mut given: HashMap<u32, Given> = HashMap::new();
        let mut accepted = Vec::with_capacity(req.answers.len());
        for answer in &req.answers {
            let question = questions
                .iter()
                .find(|q| q.id == answer.question_id)
                .ok_or_else(|| {
                    ApiError::not_found(format!(
                        "Form question with id {} in form {} not found",
                        answer.question_id, form.id
                    ))
                })?;
            let entry = given.entry(question.id).or_default();
            check_repetition(question, entry, answer)?;
            check_shape(question, answer)?;
            if let Some(option_id) = answer.option_id {
                option_of(&options, question.id, option_id)?;
            }

            if let Some(option_id) = answer.option_id {
                entry.options.insert(option_id);
            }
            entry.free_text |= answer.answer.is_some();
            if question.kind == FormQuestionType::SelectMultiple
                && entry.count() > usize::from(question.max.unwrap_or(u16::MAX))
            {
                return Err(wrong_amount(question.id));
            }

            accepted.push(FormAnswer {
                question_id: question.id,
                option_id: answer.option_id,
                value: answer.value,
                answer: answer.answer.clone(),
            });
        }

        for question in questions
            .iter()
            .filter(|q| q.kind == FormQuestionType::SelectMultiple)
        {
            let Some(entry) = given.get(&question.id) else {
                continue;
            };
            if entry.count() < usize::from(question.min.unwrap_or(0)) {
                return Err(wrong_amount(question.id));
            }
        }

        let submission_id = self
            .answers
            .save_submission(attempt.id, form.id, Utc::now(), &accepted)
            .await?;
        tracing::info!(
            user_id,
            attempt_id = attempt.id,
            submission_id,
            form_type = kind.as_str(),
            answers = accepted.len(),
            "form_answers_saved"
        );
        Ok(())
    }
}

fn wrong_amount(question_id: u32) -> ApiError {
    ApiError::bad_request(format!(
        "Form question with id {question_id} has either too few or too many answers"
    ))
}

fn option_of<'o>(
    options: &'o [FormOptionRow],
    question_id: u32,
    option_id: u32,
) -> Result<&'o FormOptionRow, ApiError> {
    options
        .iter()
        .find(|o| o.id == option_id && o.question_id == question_id)
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "Form option with id {option_id} in question {question_id} not found"
            ))
        })
}

fn check_repetition(
    question: &FormQuestionRow,
    given: &Given,
    answer: &NewFormAnswer,
) -> Result<(), ApiError> {
    if given.count() > 0 && question.kind != FormQuestionType::SelectMultiple {
        return Err(ApiError::conflict(format!(
            "Form question with id {} cannot have multiple answers (is not of type {})",
            question.id,
            FormQuestionType::SelectMultiple.as_str()
        )));
    }
    if let Some(option_id) = answer.option_id {
        if given.options.contains(&option_id) {
            return Err(ApiError::conflict(format!(
                "Form option with id {option_id} is repeated in question {}",
                question.id
            )));
        }
    }
    if given.free_text && answer.answer.is_some() {
        return Err(ApiError::conflict(format!(
            "Form answer is repeated in question {}",
            question.id
        )));
    }
    Ok(())
}

/// Which of `optionId`, `value` and `answer` each question type accepts.
fn check_shape(question: &FormQuestionRow, answer: &NewFormAnswer) -> Result<(), ApiError> {
    let id = question.id;
    let bad = |what: &str| {
        ApiError::bad_request(format!("Form answer for question with id {id} {what}"))
    };
    match question.kind {
        FormQuestionType::SelectOne | FormQuestionType::SelectMultiple => {
            if question.other.unwrap_or(false) {
                if answer.option_id.is_none() == answer.answer.is_none() {
                    return Err(ApiError::conflict(format!(
                        "Form answer for question with id {id} requires either optionId or answer fields, but not both at the same time"
                    )));
                }
            } else {
                if answer.option_id.is_none() {
                    return Err(bad("requires optionId field"));
                }
                if answer.answer.is_some() {
                    return Err(bad("cannot have answer field"));
                }
            }
            if answer.value.is_some() {
                return Err(bad("cannot have value field"));
            }
        }
        FormQuestionType::Slider => {
            let Some(value) = answer.value else {
                return Err(bad("requires value field"));
            };
            let min = question.min.unwrap_or(0);
            let max = question.max.unwrap_or(u16::MAX);
            if value < min || value > max {
                return Err(ApiError::bad_request(format!(
                    "Form answer value for question with id {id} out of bounds"
                )));
            }
            if answer.option_id.is_some() || answer.answer.is_some() {
                return Err(bad("cannot have optionId or answer fields"));
            }
        }
        FormQuestionType::TextShort | FormQuestionType::TextLong => {
            let Some(text) = &answer.answer else {
                return Err(bad("requires answer field"));
            };
            if answer.option_id.is_some() || answer.value.is_some() {
                return Err(bad("cannot have optionId or value fields"));
            }
            let len = text.chars().count();
            let min = usize::from(question.min_length.unwrap_or(0));
            let max = usize::from(question.max_length.unwrap_or(u16::MAX));
            if len < min || len > max {
                return Err(ApiError::bad_request(format!(
                    "Form answer for question with id {id} must be between {min} and {max} characters long"
                )));
            }
        }
    }
    Ok(())
}
