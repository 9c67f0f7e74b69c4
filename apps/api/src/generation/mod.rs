// AI writing assistance: summaries, experience bullets and descriptions,
// cover letters and ATS scoring, behind a per-user rate limit.
// All LLM calls go through llm_client; no direct Anthropic API calls here.

pub mod handlers;
pub mod modes;
pub mod prompts;
pub mod rate_limit;

pub use rate_limit::RateLimiter;
