//! End-to-end engine behaviour against a real SQLite database

use std::sync::Arc;

use futures::future::join_all;

use revassign_core::{
    Engine, ErrorKind, PrStatus, SeededRandom, Team, TeamMember, User, UserStore,
};
use revassign_db::Database;
use tempfile::TempDir;
use uuid::Uuid;

struct Fixture {
    engine: Engine<Database>,
    db: Arc<Database>,
    _temp: TempDir,
}

async fn setup() -> Fixture {
    let temp = TempDir::new().unwrap();
    let db = Arc::new(Database::new(temp.path().join("engine.db")).await.unwrap());
    let engine = Engine::new(Arc::clone(&db)).with_random(Arc::new(SeededRandom::new(7)));
    Fixture {
        engine,
        db,
        _temp: temp,
    }
}

/// Create `name` with one active member per username; returns member ids
async fn create_team(engine: &Engine<Database>, name: &str, usernames: &[&str]) -> Vec<Uuid> {
    let members: Vec<TeamMember> = usernames
        .iter()
        .map(|u| TeamMember::new(Uuid::new_v4(), *u))
        .collect();
    let ids = members.iter().map(|m| m.id).collect();
    engine.teams.create(Team::new(name, members)).await.unwrap();
    ids
}

#[tokio::test]
async fn test_full_review_cycle() {
    let f = setup().await;
    let ids = create_team(&f.engine, "backend", &["a", "b", "c"]).await;
    let (a, b, c) = (ids[0], ids[1], ids[2]);
    let pr_id = Uuid::new_v4();

    let pr = f.engine.pull_requests.create(pr_id, "Add search", a).await.unwrap();
    assert_eq!(pr.status, PrStatus::Open);
    assert_eq!(pr.assigned_reviewers, vec![b, c]);
    assert!(pr.merged_at.is_none());

    // Everyone else in the team is already reviewing
    let err = f.engine.pull_requests.reassign(b, pr_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoCandidate);

    let d = Uuid::new_v4();
    f.db.upsert_users(
        &[User {
            id: d,
            username: "d".to_string(),
            team_name: "backend".to_string(),
            is_active: true,
        }],
        None,
    )
    .await
    .unwrap();

    let outcome = f.engine.pull_requests.reassign(b, pr_id).await.unwrap();
    assert_eq!(outcome.replaced_by, d);
    assert_eq!(outcome.pull_request.assigned_reviewers, vec![d, c]);

    let merged = f.engine.pull_requests.merge(pr_id).await.unwrap();
    assert_eq!(merged.status, PrStatus::Merged);
    let merged_at = merged.merged_at.unwrap();
    assert!(merged_at >= merged.created_at);

    let again = f.engine.pull_requests.merge(pr_id).await.unwrap();
    assert_eq!(again.merged_at, Some(merged_at));
    assert_eq!(again, merged);

    let err = f.engine.pull_requests.reassign(c, pr_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyMerged);
}

#[tokio::test]
async fn test_reviewers_capped_and_exclude_author() {
    let f = setup().await;
    let ids = create_team(&f.engine, "platform", &["a", "b", "c", "d", "e"]).await;

    let pr = f
        .engine
        .pull_requests
        .create(Uuid::new_v4(), "Bump deps", ids[2])
        .await
        .unwrap();
    assert_eq!(pr.assigned_reviewers, vec![ids[0], ids[1]]);
    assert!(!pr.is_reviewer(ids[2]));
}

#[tokio::test]
async fn test_inactive_members_skipped() {
    let f = setup().await;
    let ids = create_team(&f.engine, "backend", &["a", "b", "c", "d"]).await;
    f.engine.users.set_active(ids[1], false).await.unwrap();

    let pr = f
        .engine
        .pull_requests
        .create(Uuid::new_v4(), "Fix login", ids[0])
        .await
        .unwrap();
    assert_eq!(pr.assigned_reviewers, vec![ids[2], ids[3]]);
}

#[tokio::test]
async fn test_solo_team_gets_no_reviewers() {
    let f = setup().await;
    let ids = create_team(&f.engine, "solo", &["a"]).await;

    let pr = f
        .engine
        .pull_requests
        .create(Uuid::new_v4(), "Lonely change", ids[0])
        .await
        .unwrap();
    assert!(pr.assigned_reviewers.is_empty());
}

#[tokio::test]
async fn test_create_failures() {
    let f = setup().await;
    let ids = create_team(&f.engine, "backend", &["a", "b"]).await;

    let err = f
        .engine
        .pull_requests
        .create(Uuid::new_v4(), "Ghost", Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    f.engine.users.set_active(ids[0], false).await.unwrap();
    let err = f
        .engine
        .pull_requests
        .create(Uuid::new_v4(), "Sleepy", ids[0])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotActive);

    let pr_id = Uuid::new_v4();
    f.engine.pull_requests.create(pr_id, "First", ids[1]).await.unwrap();
    let err = f
        .engine
        .pull_requests
        .create(pr_id, "Second", ids[1])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let stored = f.engine.pull_requests.merge(pr_id).await.unwrap();
    assert_eq!(stored.name, "First");
}

#[tokio::test]
async fn test_reassign_failures() {
    let f = setup().await;
    let ids = create_team(&f.engine, "backend", &["a", "b", "c", "d", "e"]).await;
    let pr_id = Uuid::new_v4();
    f.engine.pull_requests.create(pr_id, "Refactor", ids[0]).await.unwrap();

    let err = f
        .engine
        .pull_requests
        .reassign(ids[1], Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = f
        .engine
        .pull_requests
        .reassign(Uuid::new_v4(), pr_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // e has candidates available but is not on the pull request
    let err = f.engine.pull_requests.reassign(ids[4], pr_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoAssigned);

    let first = f.engine.pull_requests.reassign(ids[1], pr_id).await.unwrap();
    assert!(!first.pull_request.is_reviewer(ids[1]));

    let err = f.engine.pull_requests.reassign(ids[1], pr_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoAssigned);
}

#[tokio::test]
async fn test_replacement_never_author_or_duplicate() {
    let f = setup().await;
    let ids = create_team(&f.engine, "backend", &["a", "b", "c", "d", "e", "f"]).await;
    let pr_id = Uuid::new_v4();
    let mut pr = f.engine.pull_requests.create(pr_id, "Loop", ids[0]).await.unwrap();

    for _ in 0..10 {
        let old = pr.assigned_reviewers[0];
        let outcome = f.engine.pull_requests.reassign(old, pr_id).await.unwrap();
        pr = outcome.pull_request;

        assert_ne!(outcome.replaced_by, ids[0]);
        assert_ne!(outcome.replaced_by, old);
        assert_eq!(pr.assigned_reviewers.len(), 2);
        assert_ne!(pr.assigned_reviewers[0], pr.assigned_reviewers[1]);
        assert!(!pr.is_reviewer(ids[0]));
    }
}

#[tokio::test]
async fn test_merge_missing_pull_request() {
    let f = setup().await;
    let err = f.engine.pull_requests.merge(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_team_lifecycle() {
    let f = setup().await;
    let ids = create_team(&f.engine, "backend", &["a", "b"]).await;

    let err = f
        .engine
        .teams
        .create(Team::new("backend", vec![TeamMember::new(Uuid::new_v4(), "z")]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let team = f.engine.teams.get("backend").await.unwrap();
    assert_eq!(team.members.len(), 2);
    assert_eq!(team.members[0].id, ids[0]);

    let err = f.engine.teams.get("frontend").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // Moving a user into a new team updates them in place
    f.engine
        .teams
        .create(Team::new(
            "frontend",
            vec![TeamMember::new(ids[1], "b").with_active(false)],
        ))
        .await
        .unwrap();
    let moved = f.db.get_user(ids[1], None).await.unwrap();
    assert_eq!(moved.team_name, "frontend");
    assert!(!moved.is_active);
    assert_eq!(f.engine.teams.get("backend").await.unwrap().members.len(), 1);
}

#[tokio::test]
async fn test_set_active() {
    let f = setup().await;
    let ids = create_team(&f.engine, "backend", &["a"]).await;

    let user = f.engine.users.set_active(ids[0], false).await.unwrap();
    assert!(!user.is_active);
    assert_eq!(user.username, "a");

    let user = f.engine.users.set_active(ids[0], true).await.unwrap();
    assert!(user.is_active);

    let err = f
        .engine
        .users
        .set_active(Uuid::new_v4(), true)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_list_by_reviewer_and_statistics() {
    let f = setup().await;
    let ids = create_team(&f.engine, "backend", &["a", "b", "c"]).await;

    let first = f
        .engine
        .pull_requests
        .create(Uuid::new_v4(), "One", ids[0])
        .await
        .unwrap();
    let second = f
        .engine
        .pull_requests
        .create(Uuid::new_v4(), "Two", ids[1])
        .await
        .unwrap();
    f.engine.pull_requests.merge(second.id).await.unwrap();

    // c reviews both; a only reviews the second
    let reviewing = f.engine.pull_requests.list_by_reviewer(ids[2]).await.unwrap();
    let names: Vec<_> = reviewing.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["One", "Two"]);
    assert_eq!(reviewing[0].status, PrStatus::Open);
    assert_eq!(reviewing[1].status, PrStatus::Merged);

    assert_eq!(
        f.engine.pull_requests.list_by_reviewer(ids[0]).await.unwrap(),
        vec![f.engine.pull_requests.merge(second.id).await.unwrap().summary()]
    );

    let reviewers = f.engine.statistics.reviewers().await.unwrap();
    assert_eq!(reviewers[0].reviewer_id, ids[2]);
    assert_eq!(reviewers[0].assigned_count, 2);

    let prs = f.engine.statistics.pull_requests().await.unwrap();
    assert_eq!(prs.len(), 2);
    assert!(prs.iter().all(|p| p.reviewer_count == 2));
    assert_eq!(prs[0].pr_id, first.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reassignments_of_one_link() {
    let f = setup().await;
    let names: Vec<String> = (0..10).map(|i| format!("dev{}", i)).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let ids = create_team(&f.engine, "backend", &names).await;

    for round in 0..10 {
        let pr_id = Uuid::new_v4();
        let pr = f
            .engine
            .pull_requests
            .create(pr_id, format!("Round {}", round), ids[0])
            .await
            .unwrap();
        let old = pr.assigned_reviewers[0];

        let results = join_all((0..4).map(|_| f.engine.pull_requests.reassign(old, pr_id))).await;

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "round {}: {:?}", round, results);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                matches!(err.kind(), ErrorKind::NoAssigned | ErrorKind::NoCandidate),
                "round {}: unexpected {}",
                round,
                err
            );
        }

        let after = f.engine.pull_requests.merge(pr_id).await.unwrap();
        assert_eq!(after.assigned_reviewers.len(), 2);
        assert!(!after.is_reviewer(old));
        assert!(!after.is_reviewer(ids[0]));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_merges_agree_on_timestamp() {
    let f = setup().await;
    let ids = create_team(&f.engine, "backend", &["a", "b", "c"]).await;
    let pr_id = Uuid::new_v4();
    f.engine.pull_requests.create(pr_id, "Race", ids[0]).await.unwrap();

    let results = join_all((0..4).map(|_| f.engine.pull_requests.merge(pr_id))).await;
    let merged: Vec<_> = results.into_iter().map(|r| r.unwrap()).collect();

    let first = merged[0].merged_at.unwrap();
    for pr in &merged {
        assert_eq!(pr.status, PrStatus::Merged);
        assert_eq!(pr.merged_at, Some(first));
    }
}
