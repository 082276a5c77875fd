use chrono::Utc;
use issue_harvester::{
    scan_issue, AttachmentStatus, CollectionMode, CollectionRequest, Issue, IssueStateFilter,
    RequestArgs, StorageManager, User, ValidationError,
};
use tempfile::TempDir;

fn example_issue(repo: &str, number: u64, body: &str) -> Issue {
    Issue {
        number,
        title: format!("Crash in {repo}"),
        body: Some(body.to_string()),
        state: "closed".to_string(),
        labels: vec![],
        user: User {
            login: "octocat".to_string(),
            id: 1,
        },
        comments: vec![],
        created_at: Utc::now(),
        updated_at: Utc::now(),
        closed_at: Some(Utc::now()),
        repository: repo.to_string(),
        attachments: vec![],
    }
}

#[test]
fn detected_attachments_survive_a_store_roundtrip() {
    let temp = TempDir::new().unwrap();
    let storage = StorageManager::new(temp.path());

    let mut issue = example_issue(
        "widgets",
        17,
        "Crash log: https://github.com/acme/widgets/files/123/crash.log",
    );
    scan_issue(&mut issue);
    assert_eq!(issue.attachments.len(), 1);
    assert_eq!(issue.attachments[0].filename, "crash.log");
    assert_eq!(issue.attachments[0].status, AttachmentStatus::Pending);

    storage.save_issues("acme", vec![issue]).unwrap();

    let stored = storage.load_issue("acme", "widgets", 17).unwrap().unwrap();
    assert_eq!(stored.org, "acme");
    assert_eq!(stored.repo, "widgets");
    assert_eq!(stored.issue.attachments.len(), 1);
    assert_eq!(
        stored.issue.attachments[0].original_url,
        "https://github.com/acme/widgets/files/123/crash.log"
    );
}

#[test]
fn recollecting_updates_records_without_duplicating_them() {
    let temp = TempDir::new().unwrap();
    let storage = StorageManager::new(temp.path());

    storage
        .save_issues("acme", vec![example_issue("widgets", 5, "first pass")])
        .unwrap();
    storage
        .save_issues("acme", vec![example_issue("widgets", 5, "second pass")])
        .unwrap();

    let stats = storage.stats().unwrap();
    assert_eq!(stats.total_issues, 1);
    assert_eq!(stats.per_repository.get("acme/widgets"), Some(&1));

    let stored = storage.load_issue("acme", "widgets", 5).unwrap().unwrap();
    assert_eq!(stored.issue.body.as_deref(), Some("second pass"));
}

#[test]
fn stats_span_repositories_from_separate_runs() {
    let temp = TempDir::new().unwrap();

    StorageManager::new(temp.path())
        .save_issues("acme", vec![example_issue("widgets", 1, "a")])
        .unwrap();
    StorageManager::new(temp.path())
        .save_issues("acme", vec![example_issue("gadgets", 1, "b")])
        .unwrap();

    let stats = StorageManager::new(temp.path()).stats().unwrap();
    assert_eq!(stats.total_issues, 2);
    assert_eq!(stats.per_repository.len(), 2);
}

#[test]
fn request_validation_selects_mode_from_arguments() {
    let single = CollectionRequest::validate(RequestArgs {
        org: "acme".to_string(),
        repo: Some("widgets".to_string()),
        issue_number: Some(42),
        limit: 10,
        ..RequestArgs::default()
    })
    .unwrap();
    assert!(matches!(
        single.mode(),
        CollectionMode::SingleIssue { number: 42, .. }
    ));

    let org_wide = CollectionRequest::validate(RequestArgs {
        org: "acme".to_string(),
        limit: 10,
        exclude_repos: Some("archive,sandbox".to_string()),
        ..RequestArgs::default()
    })
    .unwrap();
    match org_wide.mode() {
        CollectionMode::Organization { exclusions } => {
            assert_eq!(exclusions, &["archive", "sandbox"]);
        }
        other => panic!("expected organization mode, got {other:?}"),
    }
    assert_eq!(org_wide.state(), IssueStateFilter::Closed);

    let invalid = CollectionRequest::validate(RequestArgs {
        org: "acme".to_string(),
        issue_number: Some(42),
        limit: 10,
        ..RequestArgs::default()
    });
    assert!(matches!(
        invalid,
        Err(ValidationError::IssueNumberWithoutRepository)
    ));
}
