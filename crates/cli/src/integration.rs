// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalog of the agent integrations the playground exercises.

use crate::extract::{self, Rule};
use crate::invoke::{AgentArgs, AgentRequest};

/// GitHub operations that each need their own `api_token` binding.
pub const GITHUB_TOOL_NAMES: &[&str] = &[
    "agno__github__search_repositories",
    "agno__github__list_repositories",
    "agno__github__get_repository",
    "agno__github__get_repository_languages",
    "agno__github__get_pull_request_count",
    "agno__github__get_pull_request",
    "agno__github__get_pull_request_changes",
    "agno__github__list_issues",
    "agno__github__get_issue",
    "agno__github__list_issue_comments",
    "agno__github__list_branches",
    "agno__github__get_repository_stars",
    "agno__github__get_pull_requests",
    "agno__github__get_pull_request_comments",
    "agno__github__get_pull_request_with_details",
    "agno__github__get_repository_with_stats",
    "agno__github__get_file_content",
    "agno__github__get_directory_content",
    "agno__github__get_branch_content",
    "agno__github__search_code",
    "agno__github__search_issues_and_prs",
];

/// A remote agent the playground can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Integration {
    Summary,
    Linear,
    #[value(name = "github")]
    GitHub,
    #[value(name = "youtube")]
    YouTube,
    Sentiment,
    Entities,
    Classification,
    Translation,
    Moderation,
}

/// Form fields a page collects beyond the input text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentOptions {
    pub name: Option<String>,
    pub objective: Option<String>,
    pub instructions: Option<String>,
    pub target_language: Option<String>,
    pub threshold: Option<f64>,
    pub classify_by: Option<Vec<String>>,
}

/// Default threshold for moderation.
pub const DEFAULT_MODERATION_THRESHOLD: f64 = 0.5;

/// Default labels for classification.
pub const DEFAULT_CLASSIFY_BY: &[&str] = &["fact", "fiction", "sci-fi", "fantasy"];

/// Default target for translation.
pub const DEFAULT_TARGET_LANGUAGE: &str = "spanish";

impl Integration {
    pub const ALL: &'static [Integration] = &[
        Self::Summary,
        Self::Linear,
        Self::GitHub,
        Self::YouTube,
        Self::Sentiment,
        Self::Entities,
        Self::Classification,
        Self::Translation,
        Self::Moderation,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Linear => "linear",
            Self::GitHub => "github",
            Self::YouTube => "youtube",
            Self::Sentiment => "sentiment",
            Self::Entities => "entities",
            Self::Classification => "classification",
            Self::Translation => "translation",
            Self::Moderation => "moderation",
        }
    }

    /// Human name, as shown in messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Summary => "Summary",
            Self::Linear => "Linear",
            Self::GitHub => "GitHub",
            Self::YouTube => "YouTube",
            Self::Sentiment => "Sentiment",
            Self::Entities => "Entities",
            Self::Classification => "Classification",
            Self::Translation => "Translation",
            Self::Moderation => "Moderation",
        }
    }

    /// Local proxy path the page posts to.
    pub fn path(&self) -> String {
        format!("/api/agents/{}", self.slug())
    }

    /// Remote agent id sent in `agent_names`.
    pub fn agent_name(&self) -> &'static str {
        match self {
            Self::Summary => "summary_agent",
            Self::Linear => "custom_agent",
            Self::GitHub => "github_agent",
            Self::YouTube => "youtube_analyst_agent",
            Self::Sentiment => "sentiment_analysis_agent",
            Self::Entities => "extractor",
            Self::Classification => "classification_agent",
            Self::Translation => "translation_agent",
            Self::Moderation => "moderation_agent",
        }
    }

    /// Tool names whose credentials can be provisioned; empty if none.
    pub fn tool_names(&self) -> &'static [&'static str] {
        match self {
            Self::GitHub => GITHUB_TOOL_NAMES,
            _ => &[],
        }
    }

    pub fn supports_provisioning(&self) -> bool {
        !self.tool_names().is_empty()
    }

    /// Default secret name prefix, e.g. `github-api-key`.
    pub fn default_secret_name(&self) -> String {
        format!("{}-api-key", self.slug())
    }

    /// Best-effort extraction rules for this agent's responses.
    pub fn extraction_rules(&self) -> &'static [Rule] {
        match self {
            Self::Summary => extract::SUMMARY_RULES,
            Self::Linear | Self::GitHub => extract::TEXT_RULES,
            Self::YouTube => extract::YOUTUBE_RULES,
            Self::Sentiment => extract::SENTIMENT_RULES,
            Self::Entities => extract::ENTITY_RULES,
            Self::Classification => extract::CLASSIFICATION_RULES,
            Self::Translation => extract::TRANSLATION_RULES,
            Self::Moderation => extract::MODERATION_RULES,
        }
    }

    /// Text used when the caller supplies none.
    pub fn sample_text(&self) -> &'static str {
        match self {
            Self::Summary => {
                "In the rapidly evolving landscape of artificial intelligence, the ability to \
                 condense vast amounts of information into concise and meaningful summaries is \
                 crucial. From research papers and business reports to legal documents and news \
                 articles, professionals across industries rely on summarization to extract key \
                 insights efficiently. Traditional summarization techniques often struggle with \
                 maintaining coherence and contextual relevance. However, advanced AI models now \
                 leverage natural language understanding to identify core ideas, eliminate \
                 redundancy, and generate human-like summaries. As organizations continue to deal \
                 with an ever-growing influx of data, the demand for intelligent summarization tools \
                 will only increase. Whether enhancing productivity, improving decision-making, or \
                 streamlining workflows, AI-powered summarization is set to become an indispensable \
                 asset in the digital age."
            }
            Self::Linear => {
                "The global electric vehicle (EV) market is witnessing exponential growth, driven by \
                 advancements in battery technology and government incentives. Major automakers, \
                 including Tesla, Ford, and Volkswagen, are investing heavily in EV production. \
                 However, challenges such as charging infrastructure and raw material shortages for \
                 lithium-ion batteries remain key concerns. Industry experts predict that by 2030, \
                 EVs will account for over 50% of new car sales worldwide, marking a significant \
                 shift in the automotive landscape."
            }
            Self::GitHub => "show me my github issues",
            Self::YouTube => "Macbook comparison",
            Self::Sentiment => {
                "I recently purchased the latest smartphone, and I have mixed feelings about it. The \
                 design is absolutely stunning, and the display quality is top-notch. I love how \
                 vibrant and smooth everything looks. However, the battery life is disappointing. It \
                 barely lasts a full day, even with moderate use, which is frustrating. The camera \
                 takes great pictures in daylight, but the low-light performance is underwhelming. \
                 Overall, it’s a decent phone, but for the price, I expected better battery \
                 performance."
            }
            Self::Entities => {
                "A leading technology company recently announced the launch of its latest smartphone, \
                 the Nova X, at an event in Tech Valley. The company’s CEO, Jordan Lane, highlighted \
                 the device’s improved battery life, advanced camera system, and AI-powered \
                 enhancements. To achieve higher performance and energy efficiency, the company \
                 partnered with Coretron Systems to develop the new Zenith chipset. Pre-orders will \
                 begin on October 10, and the device will be available in global markets by October \
                 20. Industry analysts predict strong demand across multiple regions, driven by \
                 innovation and evolving consumer expectations."
            }
            Self::Classification => {
                "A major tech company has announced a breakthrough in battery technology that \
                 significantly enhances energy density and reduces charging time. This innovation is \
                 expected to accelerate the adoption of electric vehicles, making them more practical \
                 for everyday use. Industry experts predict that this advancement could drive \
                 increased competition in the market and attract further investment in sustainable \
                 energy solutions."
            }
            Self::Translation => {
                "The future of artificial intelligence is rapidly evolving. With advancements in deep \
                 learning and neural networks, AI is transforming industries such as healthcare, \
                 finance, and transportation. As technology continues to improve, AI will play an \
                 even greater role in solving complex problems and enhancing human capabilities."
            }
            Self::Moderation => {
                "I absolutely hate this service! It’s a total scam, and the customer support is \
                 useless. Anyone who buys from them is getting ripped off. I swear, if they don’t fix \
                 this issue, I’m going to make sure no one ever buys from them again! Also, I’ve seen \
                 people spreading false information about their competitors—this is unethical \
                 business practice."
            }
        }
    }

    /// Build the request body this agent expects.
    pub fn build_request(&self, text: impl Into<String>, options: &AgentOptions) -> AgentRequest {
        let args = match self {
            Self::Summary => AgentArgs::SummarizeText,
            Self::Linear | Self::GitHub | Self::YouTube => {
                let (name, objective, instructions) = self.custom_defaults();
                AgentArgs::Custom {
                    name: options.name.clone().unwrap_or_else(|| name.to_owned()),
                    objective: options.objective.clone().unwrap_or_else(|| objective.to_owned()),
                    instructions: options
                        .instructions
                        .clone()
                        .unwrap_or_else(|| instructions.to_owned()),
                }
            }
            Self::Sentiment => AgentArgs::Sentiment,
            Self::Entities => AgentArgs::ExtractCategorizedEntities,
            Self::Classification => AgentArgs::Classify {
                classify_by: options.classify_by.clone().unwrap_or_else(|| {
                    DEFAULT_CLASSIFY_BY.iter().map(|&label| label.to_owned()).collect()
                }),
            },
            Self::Translation => AgentArgs::TranslateText {
                target_language: options
                    .target_language
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_owned()),
            },
            Self::Moderation => AgentArgs::Moderation {
                threshold: options.threshold.unwrap_or(DEFAULT_MODERATION_THRESHOLD),
            },
        };
        AgentRequest { text: text.into(), agent_names: vec![self.agent_name().to_owned()], args }
    }

    /// `(name, objective, instructions)` defaults of the tool-using agents.
    fn custom_defaults(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::GitHub => (
                "",
                "check all repositories accessible to me and list unmerged PRs",
                "use tools to show me the information I requested",
            ),
            Self::YouTube => (
                "youtube_analyst_agent",
                "Compare all the products mentioned in this youtube video : \
                 https://www.youtube.com/watch?v=avtz2A99zXo",
                "compare all the products create a table , show pros and cons and also attach \
                 video timestamps",
            ),
            _ => ("calc 2+2", "Calculate 2+2", "Return result of calculation"),
        }
    }
}

impl std::fmt::Display for Integration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

#[cfg(test)]
#[path = "integration_tests.rs"]
mod tests;
