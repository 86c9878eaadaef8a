use crate::application::dto::forms::{
    Form, FormOption, FormQuestion, SelectMultipleQuestion, SelectOneQuestion, SliderLabel,
    SliderQuestion, TextQuestion,
};
use crate::application::dto::images::Image;
use crate::application::ports::form_repository::{FormQuestionRow, FormRepository};
use crate::application::services::images::Images;
use crate::domain::forms::form::{FormQuestionType, FormType};

pub async fn load_form(
    repo: &dyn FormRepository,
    images: &Images<'_>,
    version: u32,
    kind: FormType,
) -> anyhow::Result<Option<Form>> {
    let Some(form) = repo.find_by_config(version, kind).await? else {
        return Ok(None);
    };
    let questions = repo.list_questions(form.id).await?;
    let options = repo.list_options(form.id).await?;
    let labels = repo.list_slider_labels(form.id).await?;
    let image_map = images
        .load(
            questions
                .iter()
                .map(|q| q.image_id)
                .chain(options.iter().map(|o| o.image_id)),
        )
        .await?;
    let image = |id: Option<u32>| id.and_then(|id| image_map.get(&id).cloned());

    let questions = questions
        .iter()
        .map(|q| {
            let question_options: Vec<FormOption> = options
                .iter()
                .filter(|o| o.question_id == q.id)
                .map(|o| FormOption {
                    id: o.id,
                    text: o.text.clone(),
                    image: image(o.image_id),
                })
                .collect();
            let question_labels: Vec<SliderLabel> = labels
                .iter()
                .filter(|l| l.question_id == q.id)
                .map(|l| SliderLabel {
                    id: l.id,
                    number: l.number,
                    label: l.label.clone(),
                })
                .collect();
            to_question(q, image(q.image_id), question_options, question_labels)
        })
        .collect();

    Ok(Some(Form {
        id: form.id,
        title: form.title,
        questions,
    }))
}

fn to_question(
    q: &FormQuestionRow,
    image: Option<Image>,
    options: Vec<FormOption>,
    labels: Vec<SliderLabel>,
) -> FormQuestion {
    let text_question = || TextQuestion {
        id: q.id,
        category: q.category.clone(),
        text: q.text.clone(),
        image: image.clone(),
        placeholder: q.placeholder.clone().unwrap_or_default(),
        min_length: q.min_length.unwrap_or_default(),
        max_length: q.max_length.unwrap_or_default(),
    };
    match q.kind {
        FormQuestionType::SelectOne => FormQuestion::SelectOne(SelectOneQuestion {
            id: q.id,
            category: q.category.clone(),
            text: q.text.clone(),
            image: image.clone(),
            options,
            other: q.other.unwrap_or(false),
        }),
        FormQuestionType::SelectMultiple => FormQuestion::SelectMultiple(SelectMultipleQuestion {
            id: q.id,
            category: q.category.clone(),
            text: q.text.clone(),
            image: image.clone(),
            options,
            min: q.min.unwrap_or_default(),
            max: q.max.unwrap_or_default(),
            other: q.other.unwrap_or(false),
        }),
        FormQuestionType::Slider => FormQuestion::Slider(SliderQuestion {
            id: q.id,
            category: q.category.clone(),
            text: q.text.clone(),
            image: image.clone(),
            min: q.min.unwrap_or_default(),
            max: q.max.unwrap_or_default(),
            step: q.step.unwrap_or(1),
            labels,
        }),
        FormQuestionType::TextShort => FormQuestion::TextShort(text_question()),
        FormQuestionType::TextLong => FormQuestion::TextLong(text_question()),
    }
}
