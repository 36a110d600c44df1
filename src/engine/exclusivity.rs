//! Mutually exclusive weapon modes
//!
//! Rows sharing an exclusivity tag on the same unit and point cost are
//! alternative modes of one weapon. Only the best of them is counted.

use crate::engine::resolution::ResolvedRow;
use ahash::AHashMap;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// Scope of an exclusivity contest
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ContestKey<'a> {
    unit: &'a str,
    points: OrderedFloat<f64>,
    tag: &'a str,
}

/// Ranking: most dead models, then most raw damage, then earliest row
fn rank(index: usize, row: &ResolvedRow) -> (OrderedFloat<f64>, OrderedFloat<f64>, Reverse<usize>) {
    (
        OrderedFloat(row.dead_models),
        OrderedFloat(row.raw_damage),
        Reverse(index),
    )
}

/// Keep cumulative rows and the single winner of each exclusive group
///
/// Output preserves input order.
pub fn resolve_exclusivity(rows: Vec<ResolvedRow>) -> Vec<ResolvedRow> {
    let winning = contest_winners(&rows);

    let mut keep: Vec<bool> = rows.iter().map(|r| !r.weapon.is_exclusive()).collect();
    for idx in winning {
        keep[idx] = true;
    }

    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, kept)| kept.then_some(row))
        .collect()
}

fn contest_winners(rows: &[ResolvedRow]) -> Vec<usize> {
    let mut winners: AHashMap<ContestKey<'_>, usize> = AHashMap::new();

    for (idx, row) in rows.iter().enumerate() {
        if !row.weapon.is_exclusive() {
            continue;
        }
        let key = ContestKey {
            unit: &row.weapon.name,
            points: OrderedFloat(row.weapon.points),
            tag: &row.weapon.profile_id,
        };
        winners
            .entry(key)
            .and_modify(|best| {
                if rank(idx, row) > rank(*best, &rows[*best]) {
                    *best = idx;
                }
            })
            .or_insert(idx);
    }

    winners
        .into_iter()
        .map(|(key, idx)| {
            tracing::debug!(
                "{} [{}]: '{}' wins exclusive slot",
                key.unit,
                key.tag,
                rows[idx].weapon.weapon
            );
            idx
        })
        .collect()
}
