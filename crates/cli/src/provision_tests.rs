// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use proptest::prelude::*;
use tokio::time::Instant;

use super::*;
use crate::test_support::{rate_limited, Call, FakeSecretStore, Op};

fn job(tools: &[&str]) -> ProvisionJob {
    ProvisionJob::new("gh", "token-1", tools.iter().copied())
}

/// Run a job against `store`, returning the result and every progress report.
async fn run(
    store: &FakeSecretStore,
    job: &ProvisionJob,
    policy: &ProvisionPolicy,
) -> (Result<ProvisionReport, ProvisionError>, Vec<Progress>) {
    let mut progress = Vec::new();
    let result = provision(store, job, policy, |p| progress.push(p)).await;
    (result, progress)
}

fn offsets(calls: &[Call], start: Instant) -> Vec<Duration> {
    calls.iter().map(|c| c.at - start).collect()
}

fn assert_near(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(50),
        "expected ~{expected:?}, got {actual:?}"
    );
}

#[yare::parameterized(
    first  = { 0, 1000 },
    second = { 1, 2000 },
    third  = { 2, 4000 },
    fourth = { 3, 8000 },
)]
fn backoff_doubles_from_one_second(attempt: u32, expected_ms: u64) {
    let policy = ProvisionPolicy::default();
    assert_eq!(policy.backoff(attempt), Duration::from_millis(expected_ms));
}

#[yare::parameterized(
    empty      = { 0, 2, 0 },
    one        = { 1, 2, 1 },
    exact      = { 4, 2, 2 },
    remainder  = { 5, 2, 3 },
    github     = { 21, 2, 11 },
    zero_batch = { 3, 0, 3 },
)]
fn batch_count(tools: usize, batch_size: usize, expected: usize) {
    let policy = ProvisionPolicy { batch_size, ..ProvisionPolicy::default() };
    assert_eq!(policy.batch_count(tools), expected);
}

#[test]
fn job_debug_redacts_value() {
    let rendered = format!("{:?}", job(&["a"]));
    assert!(!rendered.contains("token-1"));
}

#[tokio::test(start_paused = true)]
async fn five_tools_run_in_three_paced_batches() -> anyhow::Result<()> {
    let store = FakeSecretStore::new();
    let start = Instant::now();
    let (result, progress) =
        run(&store, &job(&["A", "B", "C", "D", "E"]), &ProvisionPolicy::default()).await;
    let report = result?;

    assert_eq!(
        progress,
        vec![
            Progress { completed: 2, total: 5 },
            Progress { completed: 4, total: 5 },
            Progress { completed: 5, total: 5 },
        ]
    );
    assert_eq!(report.completed, 5);

    // Batches start at 0s, 1s, 2s; nothing waits after the last one.
    for (tool, second) in [("A", 0), ("B", 0), ("C", 1), ("D", 1), ("E", 2)] {
        let writes = store.writes_for(tool);
        assert_eq!(writes.len(), 1, "{tool} written once");
        assert_near(writes[0].at - start, Duration::from_secs(second));
    }
    assert_near(start.elapsed(), Duration::from_secs(2));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn tools_in_one_batch_back_off_concurrently() -> anyhow::Result<()> {
    let store = FakeSecretStore::new()
        .script("A", [rate_limited()])
        .script("B", [rate_limited()]);
    let start = Instant::now();
    let (result, progress) = run(&store, &job(&["A", "B"]), &ProvisionPolicy::default()).await;
    result?;

    // A sequential run would put B's first write at 1s and its retry at 2s.
    for tool in ["A", "B"] {
        let at = offsets(&store.writes_for(tool), start);
        assert_eq!(at.len(), 2, "{tool} written twice");
        assert_near(at[0], Duration::ZERO);
        assert_near(at[1], Duration::from_secs(1));
    }
    assert_near(start.elapsed(), Duration::from_secs(1));
    assert_eq!(progress, vec![Progress { completed: 2, total: 2 }]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn existing_secret_is_updated_new_one_created() -> anyhow::Result<()> {
    let store = FakeSecretStore::new().with_record("sec-a", "gh-A", Some("A"));
    let (result, _) = run(&store, &job(&["A", "B"]), &ProvisionPolicy::default()).await;
    let report = result?;

    assert_eq!(store.writes_for("A")[0].op, Op::Update("sec-a".to_owned()));
    assert_eq!(store.writes_for("B")[0].op, Op::Create);
    assert_eq!(report.count(WriteMode::Update), 1);
    assert_eq!(report.count(WriteMode::Create), 1);
    assert_eq!(report.action_label(), "saved");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn secret_under_other_prefix_is_not_reused() -> anyhow::Result<()> {
    let store = FakeSecretStore::new().with_record("sec-x", "linear-api-key-A", Some("A"));
    let (result, _) = run(&store, &job(&["A"]), &ProvisionPolicy::default()).await;
    result?;
    assert_eq!(store.writes_for("A")[0].op, Op::Create);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn rate_limits_within_budget_back_off_then_succeed() -> anyhow::Result<()> {
    let store = FakeSecretStore::new().script("A", [rate_limited(), rate_limited(), rate_limited()]);
    let start = Instant::now();
    let (result, progress) = run(&store, &job(&["A"]), &ProvisionPolicy::default()).await;
    result?;

    let at = offsets(&store.writes_for("A"), start);
    assert_eq!(at.len(), 4);
    assert_near(at[1] - at[0], Duration::from_secs(1));
    assert_near(at[2] - at[1], Duration::from_secs(2));
    assert_near(at[3] - at[2], Duration::from_secs(4));
    assert_eq!(progress, vec![Progress { completed: 1, total: 1 }]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn rate_limits_beyond_budget_fail_the_tool() -> anyhow::Result<()> {
    let store = FakeSecretStore::new().script("A", std::iter::repeat_with(rate_limited).take(4));
    let (result, progress) = run(&store, &job(&["A", "B"]), &ProvisionPolicy::default()).await;

    let Err(err) = result else {
        anyhow::bail!("expected job failure");
    };
    let msg = err.to_string();
    assert!(msg.starts_with("Failed to save secrets for some tools:\n"), "{msg}");
    assert!(msg.contains("A: Rate limited after 4 attempts: Too Many Requests"), "{msg}");
    assert_eq!(err.failed_tools(), vec!["A"]);

    // The sibling in the batch still got written.
    assert_eq!(store.writes_for("A").len(), 4);
    assert_eq!(store.writes_for("B").len(), 1);
    assert_eq!(progress, vec![Progress { completed: 2, total: 2 }]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn transport_failures_are_retried() -> anyhow::Result<()> {
    let store = FakeSecretStore::new()
        .script("A", [StoreError::Transport("connection reset".to_owned())]);
    let start = Instant::now();
    let (result, _) = run(&store, &job(&["A"]), &ProvisionPolicy::default()).await;
    result?;

    let at = offsets(&store.writes_for("A"), start);
    assert_eq!(at.len(), 2);
    assert_near(at[1] - at[0], Duration::from_secs(1));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn exhausted_transport_failure_reports_its_message() -> anyhow::Result<()> {
    let store = FakeSecretStore::new().script(
        "A",
        std::iter::repeat_with(|| StoreError::Transport("connection refused".to_owned())).take(4),
    );
    let (result, _) = run(&store, &job(&["A"]), &ProvisionPolicy::default()).await;
    crate::assert_err_contains!(result, "A: connection refused");
    assert_eq!(store.writes_for("A").len(), 4);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn error_status_is_terminal_and_not_retried() -> anyhow::Result<()> {
    let store = FakeSecretStore::new()
        .script("A", [StoreError::Status { status: 400, body: "bad payload".to_owned() }]);
    let (result, _) = run(&store, &job(&["A"]), &ProvisionPolicy::default()).await;
    crate::assert_err_contains!(result, "A: bad payload");
    assert_eq!(store.writes_for("A").len(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn every_failed_tool_is_named() -> anyhow::Result<()> {
    let store = FakeSecretStore::new()
        .script("A", [StoreError::Status { status: 400, body: "bad a".to_owned() }])
        .script("D", [StoreError::Status { status: 403, body: "forbidden".to_owned() }])
        .script("E", std::iter::repeat_with(rate_limited).take(4));
    let (result, progress) =
        run(&store, &job(&["A", "B", "C", "D", "E"]), &ProvisionPolicy::default()).await;

    let Err(err) = result else {
        anyhow::bail!("expected job failure");
    };
    let msg = err.to_string();
    for line in ["A: bad a", "D: forbidden", "E: Rate limited after 4 attempts"] {
        assert!(msg.contains(line), "missing {line:?} in {msg}");
    }
    assert_eq!(err.failed_tools(), vec!["A", "D", "E"]);
    // Progress keeps moving while tools fail.
    assert_eq!(progress.last(), Some(&Progress { completed: 5, total: 5 }));
    // A failed job does not re-fetch.
    assert!(!store.calls().iter().any(|c| c.op == Op::List(Some(DEFAULT_REFRESH_LIMIT))));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn second_run_updates_every_tool() -> anyhow::Result<()> {
    let store = FakeSecretStore::new();
    let tools = ["A", "B", "C"];

    let (first, _) = run(&store, &job(&tools), &ProvisionPolicy::default()).await;
    let first = first?;
    assert_eq!(first.count(WriteMode::Create), 3);
    assert_eq!(first.action_label(), "saved");

    let (second, _) = run(&store, &job(&tools), &ProvisionPolicy::default()).await;
    let second = second?;
    assert_eq!(second.count(WriteMode::Update), 3);
    assert_eq!(second.count(WriteMode::Create), 0);
    assert_eq!(second.action_label(), "updated");
    assert_eq!(store.records().len(), 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unrelated_existing_secret_does_not_make_it_an_update() -> anyhow::Result<()> {
    let store = FakeSecretStore::new().with_record("sec-z", "something-else", None);
    let (result, _) = run(&store, &job(&["A"]), &ProvisionPolicy::default()).await;
    assert_eq!(result?.action_label(), "saved");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_prefetch_aborts_before_writing() -> anyhow::Result<()> {
    let store = FakeSecretStore::new()
        .fail_lists([StoreError::Status { status: 500, body: "boom".to_owned() }]);
    let (result, progress) = run(&store, &job(&["A"]), &ProvisionPolicy::default()).await;

    assert!(matches!(result, Err(ProvisionError::Fetch(_))));
    crate::assert_err_contains!(result, "failed to fetch existing secrets");
    assert!(store.writes_for("A").is_empty());
    assert!(progress.is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn successful_job_refreshes_index() -> anyhow::Result<()> {
    let store = FakeSecretStore::new();
    let (result, _) = run(&store, &job(&["A", "B"]), &ProvisionPolicy::default()).await;
    let report = result?;

    let lists: Vec<Op> =
        store.calls().into_iter().map(|c| c.op).filter(|op| matches!(op, Op::List(_))).collect();
    assert_eq!(lists, vec![Op::List(None), Op::List(Some(DEFAULT_REFRESH_LIMIT))]);

    let refreshed = report.refreshed.ok_or_else(|| anyhow::anyhow!("no refreshed index"))?;
    assert!(refreshed.tool_secret("A").is_some());
    assert!(refreshed.is_configured(&["B"]));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_still_succeeds() -> anyhow::Result<()> {
    let store = FakeSecretStore::new().fail_limited_lists([StoreError::Transport("gone".to_owned())]);
    let (result, _) = run(&store, &job(&["A"]), &ProvisionPolicy::default()).await;
    let report = result?;
    assert!(report.refreshed.is_none());
    assert_eq!(report.completed, 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn empty_tool_list_writes_nothing() -> anyhow::Result<()> {
    let store = FakeSecretStore::new();
    let (result, progress) = run(&store, &job(&[]), &ProvisionPolicy::default()).await;
    let report = result?;
    assert_eq!(report.completed, 0);
    assert!(progress.is_empty());
    assert_eq!(report.action_label(), "saved");
    Ok(())
}

proptest! {
    #[test]
    fn progress_is_strictly_increasing_and_ends_at_total(
        tools in 0usize..30,
        batch_size in 1usize..6,
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .start_paused(true)
            .build()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let names: Vec<String> = (0..tools).map(|i| format!("tool_{i}")).collect();
        let job = ProvisionJob::new("p", "v", names);
        let policy = ProvisionPolicy { batch_size, ..ProvisionPolicy::default() };
        let store = FakeSecretStore::new();

        let (result, progress) = rt.block_on(run(&store, &job, &policy));
        prop_assert!(result.is_ok());
        prop_assert_eq!(progress.len(), tools.div_ceil(batch_size));
        prop_assert!(progress.windows(2).all(|w| w[0].completed < w[1].completed));
        prop_assert!(progress.iter().all(|p| p.total == tools));
        if tools > 0 {
            prop_assert_eq!(progress.last().map(|p| p.completed), Some(tools));
        }
        prop_assert_eq!(store.records().len(), tools);
    }
}
