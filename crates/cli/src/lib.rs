// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod command;
pub mod config;
pub mod extract;
pub mod integration;
pub mod invoke;
pub mod provision;
pub mod secrets;
#[cfg(test)]
pub mod test_support;
