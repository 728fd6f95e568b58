//! Study-session card selection.
//!
//! Overdue cards come first, earliest due date first. Remaining capacity is
//! filled with not-yet-due cards, newest first.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::types::StudyCandidate;

/// Pick up to `max_session_size` card ids from a deck snapshot.
///
/// Ties are broken by id so the same snapshot and `now` always yield the
/// same sequence.
pub fn select_study_cards<Id>(
    cards: &[StudyCandidate<Id>],
    max_session_size: usize,
    now: DateTime<Utc>,
) -> Vec<Id>
where
    Id: Ord + Clone,
{
    if max_session_size == 0 || cards.is_empty() {
        return Vec::new();
    }

    let (mut due, mut not_due): (Vec<_>, Vec<_>) = cards
        .iter()
        .partition(|card| card.state.next_review_date <= now);

    due.sort_by(|a, b| {
        a.state
            .next_review_date
            .cmp(&b.state.next_review_date)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut seen = BTreeSet::new();
    let mut selected = Vec::with_capacity(max_session_size.min(cards.len()));

    for card in due {
        if selected.len() == max_session_size {
            return selected;
        }
        if seen.insert(&card.id) {
            selected.push(card.id.clone());
        }
    }

    not_due.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

    for card in not_due {
        if selected.len() == max_session_size {
            break;
        }
        if seen.insert(&card.id) {
            selected.push(card.id.clone());
        }
    }

    selected
}
