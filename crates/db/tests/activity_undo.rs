//! Integration tests for the activity log and the undo engine.

use assert_matches::assert_matches;
use pinboard_core::activity::{ActivityPayload, ActivityType, UndoEffect};
use pinboard_core::actor::Actor;
use pinboard_core::card::CardPatch;
use pinboard_core::error::CoreError;
use pinboard_db::models::activity::ActivityEvent;
use pinboard_db::models::card::{CreateCardRequest, MoveCardRequest};
use pinboard_db::repositories::{ActivityRepo, BoardRepo, CardRepo, ListRepo};
use pinboard_db::undo::{UndoEngine, UndoOutcome};
use pinboard_db::StoreError;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn actor(client_id: &str) -> Actor {
    Actor::new(client_id, None, None).unwrap()
}

fn new_card(title: &str) -> CreateCardRequest {
    CreateCardRequest {
        title: title.to_string(),
        description: None,
        due_at: None,
    }
}

async fn latest(pool: &PgPool, board_id: i64) -> ActivityEvent {
    ActivityRepo::list_for_board(pool, board_id, None, 1)
        .await
        .unwrap()
        .remove(0)
}

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_listing_is_newest_first_and_limited(pool: PgPool) {
    let a = actor("client-a");
    let created = BoardRepo::create_with_defaults(&pool, "Log", &a).await.unwrap();
    let board_id = created.board.id;
    for title in ["one", "two", "three"] {
        CardRepo::create(&pool, board_id, created.lists[0].id, &new_card(title), &a)
            .await
            .unwrap();
    }

    let events = ActivityRepo::list_for_board(&pool, board_id, None, 2).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_matches!(&events[0].payload, ActivityPayload::CardCreated(c) if c.after.title == "three");
    assert_matches!(&events[1].payload, ActivityPayload::CardCreated(c) if c.after.title == "two");
    assert!((events[0].created_at, events[0].id) > (events[1].created_at, events[1].id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_clear_hides_history_only_for_that_client(pool: PgPool) {
    let a = actor("client-a");
    let b = actor("client-b");
    let created = BoardRepo::create_with_defaults(&pool, "Clear", &a).await.unwrap();
    let board_id = created.board.id;
    let before_total = ActivityRepo::list_for_board(&pool, board_id, None, 200)
        .await
        .unwrap()
        .len();

    let marker = ActivityRepo::clear(&pool, board_id, &a).await.unwrap();
    assert_eq!(marker.activity_type(), ActivityType::ActivityCleared);

    assert!(ActivityRepo::list_for_board(&pool, board_id, Some("client-a"), 50)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        ActivityRepo::list_for_board(&pool, board_id, Some("client-b"), 200)
            .await
            .unwrap()
            .len(),
        before_total
    );

    // New events after the marker show up for the clearing client again.
    CardRepo::create(&pool, board_id, created.lists[0].id, &new_card("fresh"), &b)
        .await
        .unwrap();
    let visible = ActivityRepo::list_for_board(&pool, board_id, Some("client-a"), 50)
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].activity_type(), ActivityType::CardCreated);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_clear_unknown_board_is_not_found(pool: PgPool) {
    let err = ActivityRepo::clear(&pool, 777, &actor("c")).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { entity: "Board", .. }));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_corrupt_payload_surfaces_as_invalid_data(pool: PgPool) {
    let a = actor("client-a");
    let created = BoardRepo::create_with_defaults(&pool, "Corrupt", &a).await.unwrap();
    let event = latest(&pool, created.board.id).await;

    sqlx::query("UPDATE activity_events SET data = '{\"before\": 1}'::jsonb WHERE id = $1")
        .bind(event.id)
        .execute(&pool)
        .await
        .unwrap();

    let err = ActivityRepo::find_by_id(&pool, event.id).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::InvalidData(_)));
}

// ---------------------------------------------------------------------------
// Undo
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_undo_created_deletes_card_once(pool: PgPool) {
    let a = actor("client-a");
    let created = BoardRepo::create_with_defaults(&pool, "Undo", &a).await.unwrap();
    let card = CardRepo::create(&pool, created.board.id, created.lists[0].id, &new_card("x"), &a)
        .await
        .unwrap();
    let event = latest(&pool, created.board.id).await;

    let outcome = UndoEngine::undo(&pool, event.id, &actor("client-b")).await.unwrap();
    assert_matches!(
        &outcome,
        UndoOutcome::Undone { effect: UndoEffect::Deleted, card: None, card_id, .. } if *card_id == card.id
    );
    assert!(CardRepo::find_by_id(&pool, card.id).await.unwrap().is_none());

    let undo_event = latest(&pool, created.board.id).await;
    assert_eq!(undo_event.actor_client_id, "client-b");
    assert_matches!(
        &undo_event.payload,
        ActivityPayload::CardUndone(u)
            if u.reverted_event_id == event.id && u.before.is_some() && u.after.is_none()
    );

    let again = UndoEngine::undo(&pool, event.id, &a).await.unwrap();
    assert_matches!(again, UndoOutcome::AlreadyUndone { event_id } if event_id == event.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_undo_deleted_restores_original_id(pool: PgPool) {
    let a = actor("client-a");
    let created = BoardRepo::create_with_defaults(&pool, "Undo", &a).await.unwrap();
    let card = CardRepo::create(&pool, created.board.id, created.lists[0].id, &new_card("keep"), &a)
        .await
        .unwrap();
    CardRepo::delete(&pool, card.id, &a).await.unwrap();
    let event = latest(&pool, created.board.id).await;

    let outcome = UndoEngine::undo(&pool, event.id, &a).await.unwrap();
    let restored = match outcome {
        UndoOutcome::Undone {
            effect: UndoEffect::Restored,
            card: Some(restored),
            ..
        } => restored,
        other => panic!("unexpected outcome {other:?}"),
    };
    assert_eq!(restored.snapshot(), card.snapshot());

    let again = UndoEngine::undo(&pool, event.id, &a).await.unwrap();
    assert_matches!(again, UndoOutcome::AlreadyUndone { .. });
}

#[sqlx::test(migrations = "./migrations")]
async fn test_undo_move_restores_logged_placement(pool: PgPool) {
    let a = actor("client-a");
    let created = BoardRepo::create_with_defaults(&pool, "Undo", &a).await.unwrap();
    let (todo, done) = (created.lists[0].id, created.lists[2].id);
    let card = CardRepo::create(&pool, created.board.id, todo, &new_card("m"), &a)
        .await
        .unwrap();
    let moved = MoveCardRequest {
        to_list_id: done,
        before_card_id: None,
        after_card_id: None,
    };
    CardRepo::move_card(&pool, card.id, &moved, &a).await.unwrap();
    let event = latest(&pool, created.board.id).await;

    // A concurrent title edit survives the placement revert.
    let patch = CardPatch {
        title: Some("renamed".into()),
        ..Default::default()
    };
    CardRepo::update(&pool, card.id, &patch, &a).await.unwrap();

    UndoEngine::undo(&pool, event.id, &a).await.unwrap();
    let current = CardRepo::find_by_id(&pool, card.id).await.unwrap().unwrap();
    assert_eq!(current.list_id, todo);
    assert_eq!(current.position, card.position);
    assert_eq!(current.title, "renamed");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_undo_update_reverts_fields(pool: PgPool) {
    let a = actor("client-a");
    let created = BoardRepo::create_with_defaults(&pool, "Undo", &a).await.unwrap();
    let card = CardRepo::create(&pool, created.board.id, created.lists[0].id, &new_card("orig"), &a)
        .await
        .unwrap();
    let patch = CardPatch {
        title: Some("changed".into()),
        description: Some("more".into()),
        ..Default::default()
    };
    CardRepo::update(&pool, card.id, &patch, &a).await.unwrap();
    let event = latest(&pool, created.board.id).await;

    let outcome = UndoEngine::undo(&pool, event.id, &a).await.unwrap();
    assert_matches!(
        outcome,
        UndoOutcome::Undone { effect: UndoEffect::Reverted, card: Some(c), .. }
            if c.title == "orig" && c.description.is_empty()
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_undo_move_into_deleted_list_is_unsupported(pool: PgPool) {
    let a = actor("client-a");
    let created = BoardRepo::create_with_defaults(&pool, "Undo", &a).await.unwrap();
    let board_id = created.board.id;
    let (todo, doing) = (created.lists[0].id, created.lists[1].id);
    let card = CardRepo::create(&pool, board_id, todo, &new_card("m"), &a).await.unwrap();
    let moved = MoveCardRequest {
        to_list_id: doing,
        before_card_id: None,
        after_card_id: None,
    };
    CardRepo::move_card(&pool, card.id, &moved, &a).await.unwrap();
    let event = latest(&pool, board_id).await;
    ListRepo::delete(&pool, board_id, todo, &a).await.unwrap();

    let err = UndoEngine::undo(&pool, event.id, &a).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Unsupported(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_undo_delete_into_deleted_list_is_unsupported(pool: PgPool) {
    let a = actor("client-a");
    let created = BoardRepo::create_with_defaults(&pool, "Undo", &a).await.unwrap();
    let board_id = created.board.id;
    let todo = created.lists[0].id;
    let card = CardRepo::create(&pool, board_id, todo, &new_card("d"), &a).await.unwrap();
    CardRepo::delete(&pool, card.id, &a).await.unwrap();
    let event = latest(&pool, board_id).await;
    ListRepo::delete(&pool, board_id, todo, &a).await.unwrap();

    let err = UndoEngine::undo(&pool, event.id, &a).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Unsupported(_)));
    assert!(CardRepo::find_by_id(&pool, card.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_undo_delete_when_card_id_is_back_is_already_undone(pool: PgPool) {
    let a = actor("client-a");
    let created = BoardRepo::create_with_defaults(&pool, "Undo", &a).await.unwrap();
    let board_id = created.board.id;
    let todo = created.lists[0].id;
    let card = CardRepo::create(&pool, board_id, todo, &new_card("twin"), &a).await.unwrap();
    CardRepo::delete(&pool, card.id, &a).await.unwrap();
    let event = latest(&pool, board_id).await;

    sqlx::query(
        "INSERT INTO cards (id, board_id, list_id, title, position) VALUES ($1, $2, $3, 'back', 5)",
    )
    .bind(card.id)
    .bind(board_id)
    .bind(todo)
    .execute(&pool)
    .await
    .unwrap();

    let outcome = UndoEngine::undo(&pool, event.id, &a).await.unwrap();
    assert_matches!(outcome, UndoOutcome::AlreadyUndone { event_id } if event_id == event.id);

    // The existing row is untouched and no undo was logged.
    let current = CardRepo::find_by_id(&pool, card.id).await.unwrap().unwrap();
    assert_eq!(current.title, "back");
    assert_eq!(latest(&pool, board_id).await.id, event.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_undo_create_of_gone_card_is_not_found(pool: PgPool) {
    let a = actor("client-a");
    let created = BoardRepo::create_with_defaults(&pool, "Undo", &a).await.unwrap();
    let board_id = created.board.id;
    let card = CardRepo::create(&pool, board_id, created.lists[0].id, &new_card("c"), &a)
        .await
        .unwrap();
    let event = latest(&pool, board_id).await;
    CardRepo::delete(&pool, card.id, &a).await.unwrap();

    let err = UndoEngine::undo(&pool, event.id, &a).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { entity: "Card", id }) if id == card.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_undo_non_card_event_is_unsupported(pool: PgPool) {
    let a = actor("client-a");
    let created = BoardRepo::create_with_defaults(&pool, "Undo", &a).await.unwrap();
    let event = latest(&pool, created.board.id).await;
    assert_eq!(event.activity_type(), ActivityType::ListCreated);

    let err = UndoEngine::undo(&pool, event.id, &a).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Unsupported(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_undo_of_undo_is_unsupported(pool: PgPool) {
    let a = actor("client-a");
    let created = BoardRepo::create_with_defaults(&pool, "Undo", &a).await.unwrap();
    CardRepo::create(&pool, created.board.id, created.lists[0].id, &new_card("x"), &a)
        .await
        .unwrap();
    let event = latest(&pool, created.board.id).await;
    UndoEngine::undo(&pool, event.id, &a).await.unwrap();
    let undo_event = latest(&pool, created.board.id).await;

    let err = UndoEngine::undo(&pool, undo_event.id, &a).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Unsupported(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_undo_missing_event_is_not_found(pool: PgPool) {
    let err = UndoEngine::undo(&pool, 123456, &actor("c")).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { entity: "ActivityEvent", .. }));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_undos_apply_once(pool: PgPool) {
    let a = actor("client-a");
    let created = BoardRepo::create_with_defaults(&pool, "Race", &a).await.unwrap();
    CardRepo::create(&pool, created.board.id, created.lists[0].id, &new_card("x"), &a)
        .await
        .unwrap();
    let event = latest(&pool, created.board.id).await;

    let (first, second) = tokio::join!(
        UndoEngine::undo(&pool, event.id, &a),
        UndoEngine::undo(&pool, event.id, &a),
    );
    let outcomes = [first.unwrap(), second.unwrap()];
    let applied = outcomes
        .iter()
        .filter(|o| matches!(o, UndoOutcome::Undone { .. }))
        .count();
    assert_eq!(applied, 1);

    let undo_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM activity_events WHERE reverted_event_id = $1")
            .bind(event.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(undo_count, 1);
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_sprint_scenario(pool: PgPool) {
    let a = actor("client-a");
    let created = BoardRepo::create_with_defaults(&pool, "Sprint", &a).await.unwrap();
    let board_id = created.board.id;
    let (todo, doing) = (created.lists[0].id, created.lists[1].id);

    let card = CardRepo::create(&pool, board_id, todo, &new_card("Fix bug"), &a)
        .await
        .unwrap();
    assert_eq!(card.position, 1.0);

    let moved = MoveCardRequest {
        to_list_id: doing,
        before_card_id: None,
        after_card_id: None,
    };
    let moved = CardRepo::move_card(&pool, card.id, &moved, &a).await.unwrap();
    assert_eq!((moved.list_id, moved.position), (doing, 1.0));
    let move_event = latest(&pool, board_id).await;

    UndoEngine::undo(&pool, move_event.id, &a).await.unwrap();
    let back = CardRepo::find_by_id(&pool, card.id).await.unwrap().unwrap();
    assert_eq!((back.list_id, back.position), (todo, 1.0));

    let types: Vec<_> = ActivityRepo::list_for_board(&pool, board_id, None, 3)
        .await
        .unwrap()
        .iter()
        .map(ActivityEvent::activity_type)
        .collect();
    assert_eq!(
        types,
        [ActivityType::CardUndone, ActivityType::CardMoved, ActivityType::CardCreated]
    );
}
