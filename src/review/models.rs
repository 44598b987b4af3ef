use serde::Deserialize;

/// Models available for upstream reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    /// Fast, cheap model - review quality is bounded by the prompt schema,
    /// so a bigger model buys little here
    Reviewer,
}

impl Model {
    pub fn id(&self) -> &'static str {
        match self {
            Model::Reviewer => "openai/gpt-4o-mini",
        }
    }

    pub fn max_tokens(&self) -> u32 {
        match self {
            Model::Reviewer => 1800,
        }
    }
}

/// API usage information from OpenRouter
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
    /// Actual cost in USD as reported by OpenRouter (`total_cost` on the wire)
    #[serde(default, alias = "total_cost")]
    pub cost: Option<f64>,
}

impl Usage {
    /// Cost reported by OpenRouter, or 0.0 if not available. We don't
    /// estimate costs - hardcoded rates are always wrong.
    pub fn cost(&self) -> f64 {
        self.cost.unwrap_or(0.0)
    }
}
