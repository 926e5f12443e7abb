use encircle_core::{EnemyGoal, EnemyView, PawnId, TargetId};
use log::warn;

/// Enemy pawns partitioned by how they pursue their goal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Roster {
    /// Enemies chasing a stationary target, in identifier order.
    pub(crate) singles: Vec<(PawnId, TargetId)>,
    /// Enemies chasing each other; the first pawn has the lower identifier.
    pub(crate) pairs: Vec<(PawnId, PawnId)>,
}

impl Roster {
    pub(crate) fn classify(enemies: &EnemyView) -> Self {
        let mut roster = Self::default();
        let mut chasers = Vec::new();

        for enemy in enemies.iter() {
            match enemy.goal {
                EnemyGoal::Target(target) => roster.singles.push((enemy.id, target)),
                EnemyGoal::Pawn(partner) => chasers.push((enemy.id, partner)),
            }
        }

        for (index, &(pawn, partner)) in chasers.iter().enumerate() {
            let chased_back = |&(other, other_partner): &(PawnId, PawnId)| {
                other == partner && other_partner == pawn
            };
            if chasers[index + 1..].iter().any(&chased_back) {
                roster.pairs.push((pawn, partner));
            } else if !chasers[..index].iter().any(&chased_back) {
                warn!(
                    "enemy pawn {} chases pawn {} without a mutual partner",
                    pawn.get(),
                    partner.get()
                );
            }
        }

        roster
    }
}
