//! Joins secondary-league ranks onto the primary league list.
//!
//! The primary list defines the output: one snapshot per primary entry, in
//! primary order. Managers that only appear in a secondary league are
//! dropped.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use super::{ManagerId, ManagerSnapshot, ManagerStanding};

/// Builds one [`ManagerSnapshot`] per entry of `primary`.
///
/// Each secondary list is indexed by manager id before the join. If a list
/// repeats an id, its first occurrence wins. Every label of `secondary`
/// appears in each output's `league_ranks`, as `None` when the manager is
/// not in that league.
#[must_use]
pub fn reconcile(
    gameweek: i32,
    primary: &[ManagerStanding],
    secondary: &BTreeMap<String, Vec<ManagerStanding>>,
    updated_at: DateTime<Utc>,
) -> Vec<ManagerSnapshot> {
    let indexes: Vec<(&str, HashMap<ManagerId, i32>)> = secondary
        .iter()
        .map(|(label, standings)| (label.as_str(), rank_index(standings)))
        .collect();

    primary
        .iter()
        .map(|standing| ManagerSnapshot {
            manager_id: standing.manager_id,
            gameweek,
            team_name: standing.team_name.clone(),
            player_name: standing.player_name.clone(),
            rank: standing.rank,
            last_rank: standing.last_rank,
            event_points: standing.event_points,
            total_points: standing.total_points,
            league_ranks: indexes
                .iter()
                .map(|(label, index)| {
                    ((*label).to_string(), index.get(&standing.manager_id).copied())
                })
                .collect(),
            updated_at,
        })
        .collect()
}

fn rank_index(standings: &[ManagerStanding]) -> HashMap<ManagerId, i32> {
    let mut index = HashMap::with_capacity(standings.len());
    for standing in standings {
        index.entry(standing.manager_id).or_insert(standing.rank);
    }
    index
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn standing(id: i64, rank: i32, total: i32) -> ManagerStanding {
        ManagerStanding {
            manager_id: ManagerId::new(id),
            player_name: format!("Player {id}"),
            team_name: format!("Team {id}"),
            event_points: 0,
            total_points: total,
            rank,
            last_rank: None,
        }
    }

    #[test]
    fn joins_secondary_rank_by_manager_id() {
        let primary = vec![standing(1, 1, 50), standing(2, 2, 40)];
        let secondary = BTreeMap::from([("h2h".to_string(), vec![standing(2, 1, 0)])]);

        let out = reconcile(7, &primary, &secondary, Utc::now());

        let summary: Vec<(i64, i32, i32, Option<i32>)> = out
            .iter()
            .map(|s| {
                (
                    s.manager_id.get(),
                    s.rank,
                    s.total_points,
                    s.league_ranks.get("h2h").copied().flatten(),
                )
            })
            .collect();
        assert_eq!(summary, vec![(1, 1, 50, None), (2, 2, 40, Some(1))]);
        assert!(out.iter().all(|s| s.gameweek == 7));
    }

    #[test]
    fn preserves_primary_order_and_length() {
        let primary = vec![standing(30, 3, 10), standing(10, 1, 30), standing(20, 2, 20)];
        let secondary = BTreeMap::from([
            (
                "cup".to_string(),
                vec![standing(20, 1, 0), standing(99, 2, 0), standing(30, 3, 0)],
            ),
            ("h2h".to_string(), Vec::new()),
        ]);

        let out = reconcile(1, &primary, &secondary, Utc::now());

        let ids: Vec<i64> = out.iter().map(|s| s.manager_id.get()).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }

    #[test]
    fn secondary_only_managers_are_excluded() {
        let primary = vec![standing(1, 1, 5)];
        let secondary = BTreeMap::from([(
            "cup".to_string(),
            vec![standing(2, 1, 0), standing(3, 2, 0), standing(1, 3, 0)],
        )]);

        let out = reconcile(1, &primary, &secondary, Utc::now());

        assert_eq!(out.len(), 1);
        assert!(out.iter().all(|s| s.manager_id == ManagerId::new(1)));
        assert_eq!(
            out.first().and_then(|s| s.league_ranks.get("cup").copied().flatten()),
            Some(3)
        );
    }

    #[test]
    fn every_label_present_even_when_absent() {
        let primary = vec![standing(1, 1, 5)];
        let secondary = BTreeMap::from([
            ("cup".to_string(), Vec::new()),
            ("h2h".to_string(), Vec::new()),
        ]);

        let out = reconcile(1, &primary, &secondary, Utc::now());

        let Some(first) = out.first() else {
            panic!("expected one snapshot");
        };
        assert_eq!(first.league_ranks.len(), 2);
        assert!(first.league_ranks.values().all(Option::is_none));
    }

    #[test]
    fn repeated_secondary_id_uses_first_rank() {
        let primary = vec![standing(1, 1, 5)];
        let secondary = BTreeMap::from([(
            "cup".to_string(),
            vec![standing(1, 4, 0), standing(1, 9, 0)],
        )]);

        let out = reconcile(1, &primary, &secondary, Utc::now());

        assert_eq!(
            out.first().and_then(|s| s.league_ranks.get("cup").copied().flatten()),
            Some(4)
        );
    }

    #[test]
    fn empty_primary_yields_nothing() {
        let secondary = BTreeMap::from([("cup".to_string(), vec![standing(1, 1, 0)])]);
        assert!(reconcile(1, &[], &secondary, Utc::now()).is_empty());
    }
}
