//! Composing one emission from the participant and message rotations.
//!
//! Availability is checked before anything is taken, so a failed
//! composition leaves every queue exactly as it was.

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::EngineError;
use crate::snapshot::Snapshot;
use crate::types::{Participant, render_template};

/// A composed message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    /// Category the template came from.
    pub category: String,
    /// Participant named in the message.
    pub participant: Participant,
    /// The template before substitution.
    pub template: String,
    /// Final text with the participant label substituted.
    pub text: String,
    /// The text carries markup (participant mentions) and must be
    /// rendered as HTML.
    pub rich_formatting: bool,
}

/// Take the next participant and the next template of `category` and
/// render them together.
pub fn compose<R: Rng + ?Sized>(
    snapshot: &mut Snapshot,
    catalog: &Catalog,
    category: &str,
    rng: &mut R,
) -> Result<Emission, EngineError> {
    let templates = catalog.templates(category).ok_or_else(|| EngineError::NotFound {
        category: category.to_owned(),
    })?;
    if snapshot.participants.is_empty() {
        return Err(EngineError::NoParticipants);
    }
    if templates.is_empty() {
        return Err(EngineError::EmptyCategory {
            category: category.to_owned(),
        });
    }

    let pool = snapshot.participant_pool();
    let id = snapshot
        .participant_queue
        .take_next(&pool, rng)
        .map_err(|_no_items| EngineError::NoParticipants)?;
    let label = snapshot
        .label_of(&id)
        .map_or_else(|| id.to_string(), str::to_owned);

    let template = snapshot
        .message_queues
        .entry(category.to_owned())
        .or_default()
        .take_next(templates, rng)
        .map_err(|_no_items| EngineError::EmptyCategory {
            category: category.to_owned(),
        })?;

    let text = render_template(&template, &label);
    debug!(
        category,
        participant = %id,
        participants_left = snapshot.participant_queue.len(),
        "emission composed"
    );

    Ok(Emission {
        category: category.to_owned(),
        participant: Participant { id, label },
        template,
        text,
        rich_formatting: true,
    })
}

/// Pick a category uniformly among those that have templates.
pub fn pick_random_category<R: Rng + ?Sized>(
    catalog: &Catalog,
    rng: &mut R,
) -> Result<String, EngineError> {
    catalog
        .non_empty_names()
        .choose(rng)
        .cloned()
        .ok_or(EngineError::NoCategories)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::types::ParticipantId;

    fn catalog() -> Catalog {
        Catalog::from_categories([
            ("greet", vec!["Hi {name}!", "Yo {name}"]),
            ("quiet", vec![]),
        ])
    }

    fn two_people() -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot
            .participants
            .insert(ParticipantId::from("u1"), "Alice".to_owned());
        snapshot
            .participants
            .insert(ParticipantId::from("u2"), "Bob".to_owned());
        snapshot
    }

    #[test]
    fn composes_text_from_both_rotations() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut snapshot = two_people();
        let emission = compose(&mut snapshot, &catalog(), "greet", &mut rng).unwrap();

        assert_eq!(emission.category, "greet");
        assert_eq!(
            emission.text,
            emission.template.replace("{name}", &emission.participant.label)
        );
        assert!(["Alice", "Bob"].contains(&emission.participant.label.as_str()));
        assert_eq!(snapshot.participant_queue.len(), 1);
        assert_eq!(snapshot.message_queues.get("greet").map(|q| q.len()), Some(1));
    }

    #[test]
    fn one_pass_names_everyone_once() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut snapshot = two_people();
        let names: BTreeSet<String> = (0..2)
            .map(|_| compose(&mut snapshot, &catalog(), "greet", &mut rng).unwrap())
            .map(|e| e.participant.label)
            .collect();
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn no_participants_leaves_queues_untouched() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut snapshot = Snapshot::default();
        let err = compose(&mut snapshot, &catalog(), "greet", &mut rng).unwrap_err();
        assert!(matches!(err, EngineError::NoParticipants));
        assert!(snapshot.message_queues.is_empty());
    }

    #[test]
    fn empty_category_does_not_consume_a_participant() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut snapshot = two_people();
        let err = compose(&mut snapshot, &catalog(), "quiet", &mut rng).unwrap_err();
        assert!(matches!(err, EngineError::EmptyCategory { .. }));
        assert!(snapshot.participant_queue.is_empty());
    }

    #[test]
    fn unknown_category_is_not_found() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut snapshot = two_people();
        let err = compose(&mut snapshot, &catalog(), "nope", &mut rng).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { category } if category == "nope"));
    }

    #[test]
    fn random_category_skips_empty_ones() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            assert_eq!(pick_random_category(&catalog(), &mut rng).unwrap(), "greet");
        }
    }

    #[test]
    fn random_category_needs_templates() {
        let mut rng = StdRng::seed_from_u64(3);
        let only_empty = Catalog::from_categories([("quiet", Vec::<String>::new())]);
        assert!(matches!(
            pick_random_category(&only_empty, &mut rng),
            Err(EngineError::NoCategories)
        ));
    }
}
