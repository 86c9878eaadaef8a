use std::collections::HashSet;

use crate::application::dto::configs::{FrequentlyAskedQuestionUpdate, InformationCardUpdate};
use crate::application::dto::images::ImageSlots;
use crate::application::errors::ApiError;
use crate::application::ports::home_repository::{FaqRow, InformationCardRow};
use crate::application::services::images::ImageChanges;
use crate::application::use_cases::ConfigPorts;
use crate::domain::images::image::ImageCategory;

use super::removed_ids;

pub(super) async fn sync_cards(
    ports: &ConfigPorts<'_>,
    version: u32,
    cards: &[InformationCardUpdate],
    slots: &mut ImageSlots,
    changes: &mut ImageChanges,
) -> Result<(), ApiError> {
    let existing = ports.home.list_cards(version).await?;
    let mut kept = HashSet::new();

    for (order, card) in cards.iter().enumerate() {
        let order = order as u16;
        let current = card.id.and_then(|id| existing.iter().find(|c| c.id == id));
        let icon_id = ports
            .images
            .apply_slot(
                ImageCategory::InformationCard,
                current.and_then(|c| c.icon_id),
                slots.next_slot(),
                changes,
            )
            .await?;
        let mut row = InformationCardRow {
            id: 0,
            title: card.title.clone(),
            description: card.description.clone(),
            color: card.color,
            icon_id,
        };
        match current {
            Some(current) => {
                row.id = current.id;
                kept.insert(current.id);
                ports.home.update_card(order, &row).await?;
            }
            None => {
                ports.home.insert_card(version, order, &row).await?;
            }
        }
    }

    let removed = removed_ids(existing.iter().map(|c| c.id), &kept);
    if !removed.is_empty() {
        changes.released.extend(
            existing
                .iter()
                .filter(|c| removed.contains(&c.id))
                .filter_map(|c| c.icon_id),
        );
        ports.home.delete_cards(&removed).await?;
    }
    Ok(())
}

pub(super) async fn sync_faq(
    ports: &ConfigPorts<'_>,
    version: u32,
    faq: &[FrequentlyAskedQuestionUpdate],
) -> Result<(), ApiError> {
    let existing = ports.home.list_faq(version).await?;
    let mut kept = HashSet::new();

    for (order, item) in faq.iter().enumerate() {
        let order = order as u16;
        let current = item.id.filter(|id| existing.iter().any(|f| f.id == *id));
        let mut row = FaqRow {
            id: 0,
            question: item.question.clone(),
            answer: item.answer.clone(),
        };
        match current {
            Some(id) => {
                row.id = id;
                kept.insert(id);
                ports.home.update_faq(order, &row).await?;
            }
            None => {
                ports.home.insert_faq(version, order, &row).await?;
            }
        }
    }

    let removed = removed_ids(existing.iter().map(|f| f.id), &kept);
    if !removed.is_empty() {
        ports.home.delete_faq(&removed).await?;
    }
    Ok(())
}
