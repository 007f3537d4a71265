// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agentplay invoke`: call one agent and show both sides of the exchange.

use std::io::IsTerminal;
use std::path::PathBuf;

use tokio::io::AsyncReadExt;

use crate::config::Config;
use crate::extract::{self, Extracted};
use crate::integration::{AgentOptions, Integration};
use crate::invoke::{AgentClient, Exchange, InvokeError, RecordedRequest, RecordedResponse};

#[derive(Debug, clap::Args)]
pub struct InvokeArgs {
    /// Agent to call.
    pub integration: Integration,

    /// Input text (defaults to stdin when piped, else a sample).
    #[arg(long, conflicts_with = "text_file")]
    pub text: Option<String>,

    /// Read the input text from a file.
    #[arg(long)]
    pub text_file: Option<PathBuf>,

    /// Agent name for tool-using agents.
    #[arg(long)]
    pub name: Option<String>,

    /// Objective for tool-using agents.
    #[arg(long)]
    pub objective: Option<String>,

    /// Instructions for tool-using agents.
    #[arg(long)]
    pub instructions: Option<String>,

    /// Target language for translation.
    #[arg(long)]
    pub target_language: Option<String>,

    /// Comma-separated labels for classification.
    #[arg(long, value_delimiter = ',')]
    pub classify_by: Option<Vec<String>>,

    /// Moderation threshold between 0 and 1.
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Print only the response body.
    #[arg(long)]
    pub raw: bool,
}

impl InvokeArgs {
    pub fn validate(&self) -> anyhow::Result<()> {
        let labels = self.classify_by.as_deref().unwrap_or_default();
        if labels.iter().any(|l| l.trim().is_empty()) {
            anyhow::bail!("--classify-by labels must not be empty");
        }
        if let Some(t) = self.threshold {
            if !(0.0..=1.0).contains(&t) {
                anyhow::bail!("--threshold must be between 0 and 1, got {t}");
            }
        }
        Ok(())
    }

    pub fn options(&self) -> AgentOptions {
        AgentOptions {
            name: self.name.clone(),
            objective: self.objective.clone(),
            instructions: self.instructions.clone(),
            target_language: self.target_language.clone(),
            threshold: self.threshold,
            classify_by: self.classify_by.clone(),
        }
    }

    async fn input_text(&self) -> anyhow::Result<String> {
        if let Some(ref text) = self.text {
            return Ok(text.clone());
        }
        if let Some(ref path) = self.text_file {
            return Ok(tokio::fs::read_to_string(path).await?);
        }
        if !std::io::stdin().is_terminal() {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            if !buf.trim().is_empty() {
                return Ok(buf);
            }
        }
        Ok(self.integration.sample_text().to_owned())
    }
}

/// Run `agentplay invoke`. Returns a process exit code.
pub async fn run(config: &Config, args: &InvokeArgs) -> i32 {
    let text = match args.input_text().await {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };

    let integration = args.integration;
    let request = integration.build_request(text, &args.options());
    let client = AgentClient::new(config.agent_route(), config.upstream.clone(), config.timeout());

    match client.invoke(&integration.path(), &request).await {
        Ok(exchange) => {
            if args.raw {
                println!("{}", pretty_body(&exchange.response));
            } else {
                print!("{}", render_exchange(integration, &exchange));
            }
            0
        }
        Err(e) => {
            if !args.raw {
                print!("{}", render_request(e.request()));
                if let InvokeError::Status { exchange, .. } = &e {
                    print!("{}", render_response(&exchange.response));
                }
            }
            eprintln!("error: {e}");
            1
        }
    }
}

/// Best-effort display value for `exchange`, if the response has one.
pub fn best_effort(integration: Integration, exchange: &Exchange) -> Option<String> {
    let body = exchange.response.body.as_json()?;
    let mut out = extract::first_match(integration.extraction_rules(), body)
        .filter(|e| !matches!(e, Extracted::Text(s) if s.is_empty()))
        .map(|e| e.to_string())
        .unwrap_or_default();
    if integration == Integration::Summary {
        let points = extract::key_points(body);
        if !points.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&points.iter().map(|p| format!("- {p}")).collect::<Vec<_>>().join("\n"));
        }
    }
    (!out.is_empty()).then_some(out)
}

pub fn render_exchange(integration: Integration, exchange: &Exchange) -> String {
    let mut out = render_request(&exchange.request);
    if let Some(result) = best_effort(integration, exchange) {
        out.push_str("== Result\n");
        out.push_str(&result);
        out.push_str("\n\n");
    }
    out.push_str(&render_response(&exchange.response));
    out
}

fn render_request(request: &RecordedRequest) -> String {
    let body = serde_json::to_string_pretty(&request.body).unwrap_or_default();
    format!("== Request\n{} {}\n{body}\n\n== curl\n{}\n\n", request.method, request.url, request.curl)
}

fn render_response(response: &RecordedResponse) -> String {
    format!(
        "== Response ({} {})\n{}\n",
        response.status,
        response.status_text,
        pretty_body(response)
    )
}

fn pretty_body(response: &RecordedResponse) -> String {
    match response.body.as_json() {
        Some(v) => serde_json::to_string_pretty(v).unwrap_or_default(),
        None => response.body.to_message(),
    }
}

#[cfg(test)]
#[path = "invoke_tests.rs"]
mod tests;
