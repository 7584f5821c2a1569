//! Board state store.
//!
//! The board is three ordered lanes of cards, one per [`WatchStatus`]. All
//! mutation happens through [`reduce`], a pure function from (state, action)
//! to a new state: the input board is never touched, which makes snapshotting
//! for optimistic rollback a plain `clone()`.

pub mod sync;

use serde::{Deserialize, Serialize};

use crate::models::{Card, TrackedRecord, WatchStatus};

/// Ordered container of cards for exactly one status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub status: WatchStatus,
    pub cards: Vec<Card>,
}

impl Lane {
    fn empty(status: WatchStatus) -> Self {
        Self {
            status,
            cards: Vec::new(),
        }
    }
}

/// The whole board: exactly three lanes, always present even when empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub want_to_watch: Lane,
    pub watching: Lane,
    pub watched: Lane,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Creates an empty board with its three lanes
    pub fn new() -> Self {
        Self {
            want_to_watch: Lane::empty(WatchStatus::WantToWatch),
            watching: Lane::empty(WatchStatus::Watching),
            watched: Lane::empty(WatchStatus::Watched),
        }
    }

    pub fn lane(&self, status: WatchStatus) -> &Lane {
        match status {
            WatchStatus::WantToWatch => &self.want_to_watch,
            WatchStatus::Watching => &self.watching,
            WatchStatus::Watched => &self.watched,
        }
    }

    fn lane_mut(&mut self, status: WatchStatus) -> &mut Lane {
        match status {
            WatchStatus::WantToWatch => &mut self.want_to_watch,
            WatchStatus::Watching => &mut self.watching,
            WatchStatus::Watched => &mut self.watched,
        }
    }

    /// Derived flat view: every card paired with the status of the lane that
    /// owns it. Recomputed on demand, never stored.
    pub fn flattened<'a>(&'a self) -> impl Iterator<Item = (WatchStatus, &'a Card)> + 'a {
        WatchStatus::ALL
            .into_iter()
            .flat_map(|status| self.lane(status).cards.iter().map(move |c| (status, c)))
    }

    /// Finds which lane currently owns the card, if any
    pub fn locate(&self, card_id: i64) -> Option<WatchStatus> {
        self.flattened()
            .find(|(_, card)| card.id == card_id)
            .map(|(status, _)| status)
    }

    /// Total number of cards across all lanes
    pub fn total_cards(&self) -> usize {
        WatchStatus::ALL
            .into_iter()
            .map(|status| self.lane(status).cards.len())
            .sum()
    }
}

/// Closed set of board transitions
#[derive(Debug, Clone, PartialEq)]
pub enum BoardAction {
    /// Full replace from the persistence collaborator; not a merge
    Hydrate { records: Vec<TrackedRecord> },
    /// Append a fully-formed card to the end of the named lane
    AddCard { card: Card, status: WatchStatus },
    /// Remove from `from`, append to `to` with the status rewritten
    MoveCard {
        card_id: i64,
        from: WatchStatus,
        to: WatchStatus,
    },
    /// Remove from `from` only
    DeleteCard { card_id: i64, from: WatchStatus },
}

/// Applies one action to the board, returning the next state.
///
/// The returned board is structurally independent of the input; callers that
/// need rollback clone the input before applying.
pub fn reduce(state: &Board, action: BoardAction) -> Board {
    let mut next = state.clone();

    match action {
        BoardAction::Hydrate { records } => {
            for status in WatchStatus::ALL {
                next.lane_mut(status).cards.clear();
            }
            for record in records {
                let status = record.status;
                next.lane_mut(status).cards.push(record.into_card());
            }
        }
        BoardAction::AddCard { mut card, status } => {
            let lane = next.lane_mut(status);
            card.status = status;
            card.order = lane.cards.len() as i32;
            lane.cards.push(card);
        }
        BoardAction::MoveCard { card_id, from, to } => {
            let pos = next.lane(from).cards.iter().position(|c| c.id == card_id);
            let Some(pos) = pos else {
                // Card missing from the source lane: leave the board untouched
                return next;
            };
            let mut card = next.lane_mut(from).cards.remove(pos);
            card.status = to;
            next.lane_mut(to).cards.push(card);
        }
        BoardAction::DeleteCard { card_id, from } => {
            next.lane_mut(from).cards.retain(|c| c.id != card_id);
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Genre, MediaKind, TrackedMedia};

    fn record(id: i64, title: &str, status: WatchStatus) -> TrackedRecord {
        TrackedRecord {
            title_id: id,
            status,
            order: 0,
            media: TrackedMedia {
                id,
                title: title.to_string(),
                kind: MediaKind::Movie,
                poster_path: "/x.jpg".to_string(),
                genres: vec![Genre {
                    id: 28,
                    name: "Action".to_string(),
                }],
            },
        }
    }

    fn card(id: i64, title: &str, status: WatchStatus) -> Card {
        record(id, title, status).into_card()
    }

    fn assert_partition_invariant(board: &Board) {
        let mut seen = std::collections::HashSet::new();
        for status in WatchStatus::ALL {
            for c in &board.lane(status).cards {
                assert!(seen.insert(c.id), "card {} appears in two lanes", c.id);
                assert_eq!(c.status, status, "card {} status disagrees with lane", c.id);
            }
        }
    }

    #[test]
    fn test_new_board_has_three_empty_lanes() {
        let board = Board::new();
        for status in WatchStatus::ALL {
            assert_eq!(board.lane(status).status, status);
            assert!(board.lane(status).cards.is_empty());
        }
        assert_eq!(board.total_cards(), 0);
    }

    #[test]
    fn test_hydrate_partitions_by_status() {
        let board = Board::new();
        let records = vec![
            record(1, "Inception", WatchStatus::WantToWatch),
            record(2, "Severance", WatchStatus::Watching),
            record(3, "Heat", WatchStatus::Watched),
            record(4, "Dune", WatchStatus::WantToWatch),
        ];

        let board = reduce(&board, BoardAction::Hydrate { records });

        assert_eq!(board.want_to_watch.cards.len(), 2);
        assert_eq!(board.watching.cards.len(), 1);
        assert_eq!(board.watched.cards.len(), 1);
        assert_eq!(board.want_to_watch.cards[0].id, 1);
        assert_eq!(board.want_to_watch.cards[1].id, 4);
        assert_partition_invariant(&board);
    }

    #[test]
    fn test_hydrate_is_idempotent() {
        let records = vec![
            record(1, "Inception", WatchStatus::WantToWatch),
            record(2, "Severance", WatchStatus::Watching),
        ];

        let once = reduce(
            &Board::new(),
            BoardAction::Hydrate {
                records: records.clone(),
            },
        );
        let twice = reduce(&once, BoardAction::Hydrate { records });

        assert_eq!(once, twice);
    }

    #[test]
    fn test_hydrate_replaces_instead_of_merging() {
        let board = reduce(
            &Board::new(),
            BoardAction::Hydrate {
                records: vec![
                    record(1, "Inception", WatchStatus::WantToWatch),
                    record(2, "Severance", WatchStatus::Watching),
                ],
            },
        );

        // Second hydration omits card 2; it must be dropped, not kept
        let board = reduce(
            &board,
            BoardAction::Hydrate {
                records: vec![record(1, "Inception", WatchStatus::Watched)],
            },
        );

        assert_eq!(board.total_cards(), 1);
        assert!(board.watching.cards.is_empty());
        assert_eq!(board.watched.cards[0].id, 1);
    }

    #[test]
    fn test_add_card_appends_to_named_lane_only() {
        let board = reduce(
            &Board::new(),
            BoardAction::Hydrate {
                records: vec![record(1, "Inception", WatchStatus::WantToWatch)],
            },
        );
        let before = board.clone();

        let board = reduce(
            &board,
            BoardAction::AddCard {
                card: card(2, "Severance", WatchStatus::WantToWatch),
                status: WatchStatus::Watching,
            },
        );

        assert_eq!(board.watching.cards.len(), 1);
        assert_eq!(board.watching.cards[0].id, 2);
        // Status is rewritten to the target lane's status
        assert_eq!(board.watching.cards[0].status, WatchStatus::Watching);
        assert_eq!(board.want_to_watch, before.want_to_watch);
        assert_eq!(board.watched, before.watched);
        assert_partition_invariant(&board);
    }

    #[test]
    fn test_move_card_conserves_count() {
        let board = reduce(
            &Board::new(),
            BoardAction::Hydrate {
                records: vec![
                    record(1, "Inception", WatchStatus::WantToWatch),
                    record(2, "Severance", WatchStatus::WantToWatch),
                ],
            },
        );
        let total = board.total_cards();

        let board = reduce(
            &board,
            BoardAction::MoveCard {
                card_id: 1,
                from: WatchStatus::WantToWatch,
                to: WatchStatus::Watching,
            },
        );

        assert_eq!(board.total_cards(), total);
        assert_eq!(board.want_to_watch.cards.len(), 1);
        assert_eq!(board.watching.cards.len(), 1);
        assert_eq!(board.watching.cards[0].id, 1);
        assert_eq!(board.watching.cards[0].status, WatchStatus::Watching);
        assert_partition_invariant(&board);
    }

    #[test]
    fn test_move_card_appends_to_end_of_target_lane() {
        let board = reduce(
            &Board::new(),
            BoardAction::Hydrate {
                records: vec![
                    record(1, "Inception", WatchStatus::WantToWatch),
                    record(2, "Severance", WatchStatus::Watching),
                ],
            },
        );

        let board = reduce(
            &board,
            BoardAction::MoveCard {
                card_id: 1,
                from: WatchStatus::WantToWatch,
                to: WatchStatus::Watching,
            },
        );

        assert_eq!(board.watching.cards[0].id, 2);
        assert_eq!(board.watching.cards[1].id, 1);
    }

    #[test]
    fn test_move_card_absent_from_source_is_noop() {
        let board = reduce(
            &Board::new(),
            BoardAction::Hydrate {
                records: vec![record(1, "Inception", WatchStatus::WantToWatch)],
            },
        );

        let after = reduce(
            &board,
            BoardAction::MoveCard {
                card_id: 1,
                from: WatchStatus::Watched,
                to: WatchStatus::Watching,
            },
        );

        assert_eq!(after, board);
    }

    #[test]
    fn test_delete_card_removes_from_named_lane_only() {
        let board = reduce(
            &Board::new(),
            BoardAction::Hydrate {
                records: vec![
                    record(1, "Inception", WatchStatus::WantToWatch),
                    record(2, "Severance", WatchStatus::Watching),
                ],
            },
        );

        let board = reduce(
            &board,
            BoardAction::DeleteCard {
                card_id: 1,
                from: WatchStatus::WantToWatch,
            },
        );

        assert!(board.want_to_watch.cards.is_empty());
        assert_eq!(board.watching.cards.len(), 1);
    }

    #[test]
    fn test_delete_absent_card_is_noop() {
        let board = reduce(
            &Board::new(),
            BoardAction::Hydrate {
                records: vec![record(1, "Inception", WatchStatus::WantToWatch)],
            },
        );

        let after = reduce(
            &board,
            BoardAction::DeleteCard {
                card_id: 99,
                from: WatchStatus::WantToWatch,
            },
        );

        assert_eq!(after, board);
    }

    #[test]
    fn test_reduce_leaves_input_untouched() {
        let board = reduce(
            &Board::new(),
            BoardAction::Hydrate {
                records: vec![record(1, "Inception", WatchStatus::WantToWatch)],
            },
        );
        let snapshot = board.clone();

        let _ = reduce(
            &board,
            BoardAction::MoveCard {
                card_id: 1,
                from: WatchStatus::WantToWatch,
                to: WatchStatus::Watched,
            },
        );

        assert_eq!(board, snapshot);
    }

    #[test]
    fn test_locate_and_flattened() {
        let board = reduce(
            &Board::new(),
            BoardAction::Hydrate {
                records: vec![
                    record(1, "Inception", WatchStatus::WantToWatch),
                    record(2, "Severance", WatchStatus::Watching),
                ],
            },
        );

        assert_eq!(board.locate(1), Some(WatchStatus::WantToWatch));
        assert_eq!(board.locate(2), Some(WatchStatus::Watching));
        assert_eq!(board.locate(99), None);
        assert_eq!(board.flattened().count(), 2);
    }
}
