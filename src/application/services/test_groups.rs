use rand::Rng;
use rand::seq::SliceRandom;

use crate::application::dto::test_groups::{
    AssignedTestGroup, AssignedTestOption, AssignedTestPhase, AssignedTestQuestion, TestGroup,
    TestOption, TestPhase, TestQuestion,
};
use crate::application::ports::test_group_repository::{TestGroupRepository, TestGroupRow};
use crate::application::services::images::Images;

/// Loads a group with its phases, questions and options in display order.
pub async fn load_group(
    repo: &dyn TestGroupRepository,
    images: &Images<'_>,
    row: TestGroupRow,
) -> anyhow::Result<TestGroup> {
    let phases = repo.list_phases(row.id).await?;
    let questions = repo.list_questions(row.id).await?;
    let options = repo.list_options(row.id).await?;
    let image_map = images
        .load(
            questions
                .iter()
                .map(|q| q.image_id)
                .chain(options.iter().map(|o| o.image_id)),
        )
        .await?;
    let image = |id: Option<u32>| id.and_then(|id| image_map.get(&id).cloned());

    let phases = phases
        .into_iter()
        .map(|phase| TestPhase {
            id: phase.id,
            randomize_questions: phase.randomize_questions,
            questions: questions
                .iter()
                .filter(|q| q.phase_id == phase.id)
                .map(|q| TestQuestion {
                    id: q.id,
                    text: q.text.clone(),
                    image: image(q.image_id),
                    randomize_options: q.randomize_options,
                    options: options
                        .iter()
                        .filter(|o| o.question_id == q.id)
                        .map(|o| TestOption {
                            id: o.id,
                            text: o.text.clone(),
                            image: image(o.image_id),
                            correct: o.correct,
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    Ok(TestGroup {
        id: row.id,
        label: row.label,
        probability: row.probability,
        greeting: row.greeting,
        allow_previous_phase: row.allow_previous_phase,
        allow_previous_question: row.allow_previous_question,
        allow_skip_question: row.allow_skip_question,
        randomize_phases: row.randomize_phases,
        phases,
    })
}

pub async fn load_groups(
    repo: &dyn TestGroupRepository,
    images: &Images<'_>,
    version: u32,
) -> anyhow::Result<Vec<TestGroup>> {
    let mut groups = Vec::new();
    for row in repo.list_groups(version).await? {
        groups.push(load_group(repo, images, row).await?);
    }
    Ok(groups)
}

/// Participant view of a group: correctness is hidden and randomized levels are shuffled.
pub fn assign<R: Rng + ?Sized>(group: &TestGroup, rng: &mut R) -> AssignedTestGroup {
    let mut phases: Vec<AssignedTestPhase> = group
        .phases
        .iter()
        .map(|phase| {
            let mut questions: Vec<AssignedTestQuestion> = phase
                .questions
                .iter()
                .map(|q| {
                    let mut options: Vec<AssignedTestOption> = q
                        .options
                        .iter()
                        .map(|o| AssignedTestOption {
                            id: o.id,
                            text: o.text.clone(),
                            image: o.image.clone(),
                        })
                        .collect();
                    if q.randomize_options {
                        options.shuffle(rng);
                    }
                    AssignedTestQuestion {
                        id: q.id,
                        text: q.text.clone(),
                        image: q.image.clone(),
                        options,
                    }
                })
                .collect();
            if phase.randomize_questions {
                questions.shuffle(rng);
            }
            AssignedTestPhase { questions }
        })
        .collect();
    if group.randomize_phases {
        phases.shuffle(rng);
    }

    AssignedTestGroup {
        label: group.label.clone(),
        greeting: group.greeting.clone(),
        allow_previous_phase: group.allow_previous_phase,
        allow_previous_question: group.allow_previous_question,
        allow_skip_question: group.allow_skip_question,
        phases,
    }
}

pub fn question_count(group: &TestGroup) -> usize {
    group.phases.iter().map(|p| p.questions.len()).sum()
}
