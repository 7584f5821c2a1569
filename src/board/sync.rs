//! Synchronization controller.
//!
//! Bridges user gestures to remote mutations against the persistence
//! collaborator. Every mutation is applied to the board optimistically before
//! the remote call resolves; the pre-action board is snapshotted first and
//! restored verbatim when the call fails. Snapshots always cover the whole
//! board because a move touches two lanes atomically.

use std::sync::Arc;

use crate::board::{reduce, Board, BoardAction};
use crate::db::TrackedStore;
use crate::error::AppResult;
use crate::models::{Card, UserId, WatchStatus};

/// Session-scoped controller owning one user's board
pub struct BoardSync {
    store: Arc<dyn TrackedStore>,
    user: UserId,
    board: Board,
    dragging: bool,
}

impl BoardSync {
    /// Creates a controller with an empty board for the given user
    pub fn new(store: Arc<dyn TrackedStore>, user: UserId) -> Self {
        Self {
            store,
            user,
            board: Board::new(),
            dragging: false,
        }
    }

    /// The single rendering source of truth
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// True while a drag gesture is in flight; controls whether the
    /// drop-to-delete target is rendered, nothing else
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    /// One-time session hydration: full replace from the persistence store
    pub async fn hydrate(&mut self) -> AppResult<()> {
        let records = self.store.list_tracked(&self.user).await?;
        tracing::debug!(user = %self.user, records = records.len(), "Board hydrated");
        self.board = reduce(&self.board, BoardAction::Hydrate { records });
        Ok(())
    }

    /// Moves a card to another lane, optimistically.
    ///
    /// A move onto the lane the card already occupies, or of a card that
    /// cannot be located, is abandoned with no side effect at all.
    pub async fn request_move(&mut self, card_id: i64, to: WatchStatus) -> AppResult<()> {
        let Some(from) = self.board.locate(card_id) else {
            tracing::debug!(card_id, "Move requested for unknown card, ignoring");
            return Ok(());
        };
        if from == to {
            return Ok(());
        }

        let snapshot = self.board.clone();
        self.board = reduce(&self.board, BoardAction::MoveCard { card_id, from, to });

        match self.store.set_status(&self.user, card_id, to).await {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::warn!(card_id, to = %to, error = %e, "Move rejected, rolling back");
                self.board = snapshot;
                Err(e)
            }
        }
    }

    /// Deletes a card from the board, optimistically
    pub async fn request_delete(&mut self, card_id: i64) -> AppResult<()> {
        let Some(from) = self.board.locate(card_id) else {
            tracing::debug!(card_id, "Delete requested for unknown card, ignoring");
            return Ok(());
        };

        let snapshot = self.board.clone();
        self.board = reduce(&self.board, BoardAction::DeleteCard { card_id, from });

        match self.store.delete_tracked(&self.user, card_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(card_id, error = %e, "Delete rejected, rolling back");
                self.board = snapshot;
                Err(e)
            }
        }
    }

    /// Adds a card, optimistically. The remote create owns the catalog
    /// upsert; any failure (Conflict included) restores the snapshot.
    pub async fn request_add(&mut self, card: Card, status: WatchStatus) -> AppResult<()> {
        let snapshot = self.board.clone();
        let payload = Card {
            status,
            ..card.clone()
        };
        self.board = reduce(&self.board, BoardAction::AddCard { card, status });

        match self.store.create_tracked(&self.user, &payload).await {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::warn!(card_id = payload.id, status = %status, error = %e, "Add rejected, rolling back");
                self.board = snapshot;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockTrackedStore;
    use crate::error::AppError;
    use crate::models::{Genre, MediaKind, TrackedMedia, TrackedRecord};

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

    fn card(id: i64, title: &str) -> Card {
        record(id, title, WatchStatus::WantToWatch).into_card()
    }

    fn user() -> UserId {
        UserId("user_1".to_string())
    }

    async fn hydrated(store: MockTrackedStore) -> BoardSync {
        let mut sync = BoardSync::new(Arc::new(store), user());
        sync.hydrate().await.unwrap();
        sync
    }

    fn store_listing(records: Vec<TrackedRecord>) -> MockTrackedStore {
        let mut store = MockTrackedStore::new();
        store
            .expect_list_tracked()
            .returning(move |_| Ok(records.clone()));
        store
    }

    #[tokio::test]
    async fn test_hydrate_then_move() {
        let mut store = store_listing(vec![record(1, "Inception", WatchStatus::WantToWatch)]);
        store
            .expect_set_status()
            .withf(|_, id, status| *id == 1 && *status == WatchStatus::Watching)
            .times(1)
            .returning(|_, id, status| Ok(record(id, "Inception", status)));

        let mut sync = hydrated(store).await;
        assert_eq!(sync.board().want_to_watch.cards.len(), 1);
        assert!(sync.board().watching.cards.is_empty());
        assert!(sync.board().watched.cards.is_empty());

        sync.request_move(1, WatchStatus::Watching).await.unwrap();

        assert!(sync.board().want_to_watch.cards.is_empty());
        assert_eq!(sync.board().watching.cards[0].id, 1);
        assert_eq!(sync.board().watching.cards[0].status, WatchStatus::Watching);
    }

    #[tokio::test]
    async fn test_same_status_move_is_noop_without_remote_call() {
        let store = store_listing(vec![record(1, "Inception", WatchStatus::WantToWatch)]);
        // No expect_set_status: any remote call would panic the mock

        let mut sync = hydrated(store).await;
        let before = sync.board().clone();

        sync.request_move(1, WatchStatus::WantToWatch).await.unwrap();

        assert_eq!(sync.board(), &before);
    }

    #[tokio::test]
    async fn test_move_unknown_card_is_noop_without_remote_call() {
        let store = store_listing(vec![record(1, "Inception", WatchStatus::WantToWatch)]);

        let mut sync = hydrated(store).await;
        let before = sync.board().clone();

        sync.request_move(99, WatchStatus::Watched).await.unwrap();

        assert_eq!(sync.board(), &before);
    }

    #[tokio::test]
    async fn test_move_failure_restores_exact_snapshot() {
        let mut store = store_listing(vec![
            record(1, "Inception", WatchStatus::WantToWatch),
            record(2, "Severance", WatchStatus::Watching),
        ]);
        store
            .expect_set_status()
            .times(1)
            .returning(|_, _, _| Err(AppError::ExternalApi("upstream down".to_string())));

        let mut sync = hydrated(store).await;
        let before = sync.board().clone();

        let result = sync.request_move(1, WatchStatus::Watched).await;

        assert!(result.is_err());
        assert_eq!(sync.board(), &before);
    }

    #[tokio::test]
    async fn test_delete_applies_optimistically_and_sticks_on_success() {
        let mut store = store_listing(vec![record(1, "Inception", WatchStatus::WantToWatch)]);
        store
            .expect_delete_tracked()
            .withf(|_, id| *id == 1)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut sync = hydrated(store).await;
        sync.request_delete(1).await.unwrap();

        assert_eq!(sync.board().total_cards(), 0);
    }

    #[tokio::test]
    async fn test_delete_absent_card_issues_no_remote_call() {
        let store = store_listing(vec![record(1, "Inception", WatchStatus::WantToWatch)]);
        // No expect_delete_tracked: the mock panics if it is called

        let mut sync = hydrated(store).await;
        let before = sync.board().clone();

        sync.request_delete(99).await.unwrap();

        assert_eq!(sync.board(), &before);
    }

    #[tokio::test]
    async fn test_delete_failure_restores_exact_snapshot() {
        let mut store = store_listing(vec![record(1, "Inception", WatchStatus::WantToWatch)]);
        store
            .expect_delete_tracked()
            .times(1)
            .returning(|_, _| Err(AppError::NotFound("not tracked".to_string())));

        let mut sync = hydrated(store).await;
        let before = sync.board().clone();

        let result = sync.request_delete(1).await;

        assert!(result.is_err());
        assert_eq!(sync.board(), &before);
    }

    #[tokio::test]
    async fn test_add_shows_card_immediately() {
        let mut store = store_listing(vec![]);
        store
            .expect_create_tracked()
            .withf(|_, card| card.id == 5 && card.status == WatchStatus::WantToWatch)
            .times(1)
            .returning(|_, card| Ok(record(card.id, &card.title, card.status)));

        let mut sync = hydrated(store).await;
        sync.request_add(card(5, "Dune"), WatchStatus::WantToWatch)
            .await
            .unwrap();

        assert_eq!(sync.board().want_to_watch.cards[0].id, 5);
    }

    #[tokio::test]
    async fn test_add_then_remote_conflict_reverts() {
        let mut store = store_listing(vec![record(1, "Inception", WatchStatus::WantToWatch)]);
        store
            .expect_create_tracked()
            .times(1)
            .returning(|_, _| Err(AppError::Conflict("already tracked".to_string())));

        let mut sync = hydrated(store).await;
        let before = sync.board().clone();

        let result = sync.request_add(card(5, "Dune"), WatchStatus::WantToWatch).await;

        assert!(result.is_err());
        assert_eq!(sync.board(), &before);
        assert!(sync.board().locate(5).is_none());
    }

    #[tokio::test]
    async fn test_dragging_flag_toggles() {
        let store = store_listing(vec![]);
        let mut sync = hydrated(store).await;

        assert!(!sync.is_dragging());
        sync.set_dragging(true);
        assert!(sync.is_dragging());
        sync.set_dragging(false);
        assert!(!sync.is_dragging());
    }
}
