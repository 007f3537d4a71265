// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: an in-memory secrets store and assertion helpers.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use tokio::time::Instant;

use crate::secrets::store::{SecretStore, StoreError};
use crate::secrets::{SecretRecord, SecretWrite};

/// Assert that an expression is `Err` and its message contains a substring.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = err.to_string();
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}

/// Kind of call made against [`FakeSecretStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    List(Option<usize>),
    Create,
    Update(String),
}

/// One recorded call, stamped with tokio's (possibly paused) clock.
#[derive(Debug, Clone)]
pub struct Call {
    pub op: Op,
    pub tool: Option<String>,
    pub at: Instant,
}

#[derive(Default)]
struct FakeState {
    records: Vec<SecretRecord>,
    next_id: u64,
    /// Errors returned, in order, by the next writes for a tool.
    scripts: HashMap<String, VecDeque<StoreError>>,
    /// Errors returned, in order, by the next listings.
    list_failures: VecDeque<StoreError>,
    /// Errors returned, in order, by the next listings that carry a limit.
    limited_list_failures: VecDeque<StoreError>,
    calls: Vec<Call>,
}

/// In-memory secrets store with scripted per-tool failures.
#[derive(Default)]
pub struct FakeSecretStore {
    state: Mutex<FakeState>,
}

impl FakeSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed an existing record.
    pub fn with_record(self, id: &str, name: &str, tool: Option<&str>) -> Self {
        self.state().records.push(SecretRecord {
            secret_id: id.to_owned(),
            secret_name: name.to_owned(),
            tool_name: tool.map(str::to_owned),
            tool_arg: crate::secrets::TOOL_ARG_API_TOKEN.to_owned(),
            is_default_for_tool: true,
        });
        self
    }

    /// Queue errors for the next writes of `tool`; later writes succeed.
    pub fn script(self, tool: &str, errors: impl IntoIterator<Item = StoreError>) -> Self {
        self.state().scripts.entry(tool.to_owned()).or_default().extend(errors);
        self
    }

    /// Queue errors for the next listings.
    pub fn fail_lists(self, errors: impl IntoIterator<Item = StoreError>) -> Self {
        self.state().list_failures.extend(errors);
        self
    }

    /// Queue errors for the next listings that carry a page limit.
    pub fn fail_limited_lists(self, errors: impl IntoIterator<Item = StoreError>) -> Self {
        self.state().limited_list_failures.extend(errors);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Write calls (create or update) made for `tool`, in order.
    pub fn writes_for(&self, tool: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.tool.as_deref() == Some(tool) && !matches!(c.op, Op::List(_)))
            .collect()
    }

    pub fn records(&self) -> Vec<SecretRecord> {
        self.state().records.clone()
    }

    fn record_call(state: &mut FakeState, op: Op, tool: Option<&str>) {
        state.calls.push(Call { op, tool: tool.map(str::to_owned), at: Instant::now() });
    }

    fn next_scripted(state: &mut FakeState, tool: &str) -> Option<StoreError> {
        state.scripts.get_mut(tool).and_then(VecDeque::pop_front)
    }
}

impl SecretStore for FakeSecretStore {
    async fn list(&self, limit: Option<usize>) -> Result<Vec<SecretRecord>, StoreError> {
        let mut state = self.state();
        Self::record_call(&mut state, Op::List(limit), None);
        if let Some(err) = state.list_failures.pop_front() {
            return Err(err);
        }
        if limit.is_some() {
            if let Some(err) = state.limited_list_failures.pop_front() {
                return Err(err);
            }
        }
        let take = limit.unwrap_or(usize::MAX);
        Ok(state.records.iter().take(take).cloned().collect())
    }

    async fn create(&self, write: &SecretWrite) -> Result<(), StoreError> {
        let mut state = self.state();
        Self::record_call(&mut state, Op::Create, Some(&write.tool_name));
        if let Some(err) = Self::next_scripted(&mut state, &write.tool_name) {
            return Err(err);
        }
        state.next_id += 1;
        let secret_id = format!("sec-{}", state.next_id);
        state.records.push(SecretRecord {
            secret_id,
            secret_name: write.secret_name.clone(),
            tool_name: Some(write.tool_name.clone()),
            tool_arg: write.tool_arg.clone(),
            is_default_for_tool: write.is_default_for_tool,
        });
        Ok(())
    }

    async fn update(&self, secret_id: &str, write: &SecretWrite) -> Result<(), StoreError> {
        let mut state = self.state();
        Self::record_call(&mut state, Op::Update(secret_id.to_owned()), Some(&write.tool_name));
        if let Some(err) = Self::next_scripted(&mut state, &write.tool_name) {
            return Err(err);
        }
        let Some(record) = state.records.iter_mut().find(|r| r.secret_id == secret_id) else {
            return Err(StoreError::Status { status: 404, body: "secret not found".to_owned() });
        };
        record.secret_name = write.secret_name.clone();
        record.tool_name = Some(write.tool_name.clone());
        record.tool_arg = write.tool_arg.clone();
        Ok(())
    }
}

/// Shorthand for a 429 response.
pub fn rate_limited() -> StoreError {
    StoreError::RateLimited { body: "Too Many Requests".to_owned() }
}

/// Install the process-wide rustls provider so HTTP clients can be built.
pub fn install_crypto() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
