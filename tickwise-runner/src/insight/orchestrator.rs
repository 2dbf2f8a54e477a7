//! Bounded generative call with rule-based fallback.
//!
//! The provider runs on its own thread; the caller polls for the reply in short
//! slices so a timeout or a cancellation returns promptly even while the HTTP
//! request is still in flight. An abandoned call finishes in the background and
//! its reply is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::fallback::rule_based_insight;
use super::parser::parse_insight_text;
use super::prompt::{build_prompt, SYSTEM_PROMPT};
use super::provider::{ChatCompletionsClient, InsightProvider};
use super::{Confidence, InsightContext, InsightError, InsightResult, InsightSource};
use crate::config::InsightConfig;

/// How often a waiting caller re-checks its cancel token.
const POLL_SLICE: Duration = Duration::from_millis(20);

/// Cooperative cancellation flag, cheap to clone and share across threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Whether the generative path is attempted at all. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightMode {
    Disabled,
    Enabled,
}

pub struct InsightOrchestrator {
    provider: Option<Arc<dyn InsightProvider>>,
    timeout: Duration,
}

impl InsightOrchestrator {
    /// Rule-based narratives only.
    pub fn disabled() -> Self {
        Self {
            provider: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn with_provider(provider: Arc<dyn InsightProvider>, timeout: Duration) -> Self {
        Self {
            provider: Some(provider),
            timeout,
        }
    }

    /// Enabled when the config resolves a usable credential, disabled otherwise.
    pub fn from_config(config: &InsightConfig) -> Self {
        let Some(api_key) = config.resolve_credential() else {
            info!("no usable insight credential; rule-based narratives only");
            return Self::disabled();
        };
        match ChatCompletionsClient::new(config, api_key) {
            Ok(client) => {
                info!(model = %config.model, timeout_ms = config.timeout_ms, "generative insight enabled");
                Self::with_provider(Arc::new(client), config.timeout())
            }
            Err(e) => {
                warn!(error = %e, "could not build insight client; rule-based narratives only");
                Self::disabled()
            }
        }
    }

    pub fn mode(&self) -> InsightMode {
        if self.provider.is_some() {
            InsightMode::Enabled
        } else {
            InsightMode::Disabled
        }
    }

    /// Always returns an insight: the generative one when it succeeds in time,
    /// the rule-based one otherwise.
    pub fn generate(&self, ctx: &InsightContext<'_>, cancel: Option<&CancelToken>) -> InsightResult {
        match self.try_generate(ctx, cancel) {
            Ok(insight) => insight,
            Err(InsightError::Disabled) => rule_based_insight(ctx),
            Err(e) => {
                warn!(symbol = ctx.symbol, error = %e, "generative insight failed; using rule-based narrative");
                rule_based_insight(ctx)
            }
        }
    }

    fn try_generate(
        &self,
        ctx: &InsightContext<'_>,
        cancel: Option<&CancelToken>,
    ) -> Result<InsightResult, InsightError> {
        let provider = self.provider.as_ref().ok_or(InsightError::Disabled)?;
        let text = self.call_bounded(Arc::clone(provider), build_prompt(ctx), cancel)?;
        if text.trim().is_empty() {
            return Err(InsightError::EmptyResponse);
        }

        let parsed = parse_insight_text(&text);
        debug!(
            symbol = ctx.symbol,
            provider = provider.name(),
            key_factors = parsed.key_factors.len(),
            "generative insight received"
        );
        Ok(InsightResult {
            source: InsightSource::GenerativeAi,
            narrative: text,
            sentiment: parsed.sentiment,
            key_factors: parsed.key_factors,
            confidence: Confidence::High,
            generated_at: ctx.as_of,
        })
    }

    fn call_bounded(
        &self,
        provider: Arc<dyn InsightProvider>,
        prompt: String,
        cancel: Option<&CancelToken>,
    ) -> Result<String, InsightError> {
        let cancelled = || cancel.is_some_and(CancelToken::is_cancelled);
        if cancelled() {
            return Err(InsightError::Cancelled);
        }

        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("tickwise-insight".into())
            .spawn(move || {
                // receiver may be gone after a timeout
                let _ = tx.send(provider.complete(SYSTEM_PROMPT, &prompt));
            })
            .map_err(|e| InsightError::Transport(format!("spawn insight thread: {e}")))?;

        let deadline = Instant::now() + self.timeout;
        loop {
            if cancelled() {
                return Err(InsightError::Cancelled);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(InsightError::Timeout(self.timeout.as_millis() as u64));
            }
            match rx.recv_timeout(remaining.min(POLL_SLICE)) {
                Ok(reply) => return reply,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(InsightError::Transport(
                        "provider thread ended without a reply".into(),
                    ))
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::tests_support::fixture;
    use crate::insight::Sentiment;
    use std::sync::atomic::AtomicUsize;

    enum Script {
        Reply(&'static str),
        Fail,
        Slow(Duration),
        Panic,
    }

    struct Mock {
        script: Script,
        calls: AtomicUsize,
    }

    impl Mock {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl InsightProvider for Mock {
        fn name(&self) -> &str {
            "mock"
        }

        fn complete(&self, system: &str, prompt: &str) -> Result<String, InsightError> {
            assert!(!system.is_empty());
            assert!(prompt.contains("MARKET ANALYSIS FOR"));
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                Script::Reply(text) => Ok(text.to_string()),
                Script::Fail => Err(InsightError::HttpStatus {
                    status: 503,
                    body: "overloaded".into(),
                }),
                Script::Slow(delay) => {
                    thread::sleep(delay);
                    Ok("Bullish, but late.".into())
                }
                Script::Panic => panic!("provider blew up"),
            }
        }
    }

    const REPLY: &str = "\
Overall the setup looks constructive with a bullish bias.
• Price holds above the rising 50-bar average
• Momentum is positive and broadening
- Volatility remains contained
Sentiment: positive, consider a buy on weakness.";

    fn orchestrator(mock: &Arc<Mock>, timeout: Duration) -> InsightOrchestrator {
        InsightOrchestrator::with_provider(mock.clone(), timeout)
    }

    #[test]
    fn successful_reply_is_generative() {
        let fx = fixture(260);
        let mock = Mock::new(Script::Reply(REPLY));
        let insight = orchestrator(&mock, Duration::from_secs(5)).generate(&fx.context(), None);

        assert_eq!(insight.source, InsightSource::GenerativeAi);
        assert_eq!(insight.narrative, REPLY);
        assert_eq!(insight.confidence, Confidence::High);
        assert_eq!(insight.sentiment, Sentiment::Positive);
        assert_eq!(insight.key_factors.len(), 3);
        assert_eq!(insight.generated_at, fx.series.last().timestamp);
        assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn provider_error_falls_back() {
        let fx = fixture(260);
        let mock = Mock::new(Script::Fail);
        let insight = orchestrator(&mock, Duration::from_secs(5)).generate(&fx.context(), None);
        assert_eq!(insight, rule_based_insight(&fx.context()));
    }

    #[test]
    fn empty_reply_falls_back() {
        let fx = fixture(260);
        let mock = Mock::new(Script::Reply("   \n"));
        let insight = orchestrator(&mock, Duration::from_secs(5)).generate(&fx.context(), None);
        assert_eq!(insight.source, InsightSource::RuleBased);
    }

    #[test]
    fn panicking_provider_falls_back() {
        let fx = fixture(260);
        let mock = Mock::new(Script::Panic);
        let insight = orchestrator(&mock, Duration::from_secs(5)).generate(&fx.context(), None);
        assert_eq!(insight.source, InsightSource::RuleBased);
    }

    #[test]
    fn slow_provider_times_out() {
        let fx = fixture(260);
        let mock = Mock::new(Script::Slow(Duration::from_secs(3)));
        let start = Instant::now();
        let insight = orchestrator(&mock, Duration::from_millis(50)).generate(&fx.context(), None);
        assert_eq!(insight.source, InsightSource::RuleBased);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn pre_cancelled_never_calls_provider() {
        let fx = fixture(260);
        let mock = Mock::new(Script::Reply(REPLY));
        let token = CancelToken::new();
        token.cancel();
        let insight =
            orchestrator(&mock, Duration::from_secs(5)).generate(&fx.context(), Some(&token));
        assert_eq!(insight.source, InsightSource::RuleBased);
        assert_eq!(mock.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cancel_during_call_returns_promptly() {
        let fx = fixture(260);
        let mock = Mock::new(Script::Slow(Duration::from_secs(5)));
        let token = CancelToken::new();
        let remote = token.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            remote.cancel();
        });

        let start = Instant::now();
        let insight =
            orchestrator(&mock, Duration::from_secs(30)).generate(&fx.context(), Some(&token));
        canceller.join().unwrap();

        assert_eq!(insight.source, InsightSource::RuleBased);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn disabled_is_rule_based() {
        let fx = fixture(260);
        let orch = InsightOrchestrator::disabled();
        assert_eq!(orch.mode(), InsightMode::Disabled);
        assert_eq!(
            orch.generate(&fx.context(), None),
            rule_based_insight(&fx.context())
        );
    }

    #[test]
    fn mode_follows_credential() {
        let off = InsightConfig {
            enabled: false,
            api_key: Some("sk-0123456789abcdef".into()),
            ..Default::default()
        };
        assert_eq!(InsightOrchestrator::from_config(&off).mode(), InsightMode::Disabled);

        let missing = InsightConfig {
            api_key_env: "TICKWISE_TEST_UNSET_VAR".into(),
            ..Default::default()
        };
        assert_eq!(
            InsightOrchestrator::from_config(&missing).mode(),
            InsightMode::Disabled
        );

        let keyed = InsightConfig {
            api_key: Some("sk-0123456789abcdef".into()),
            ..Default::default()
        };
        assert_eq!(InsightOrchestrator::from_config(&keyed).mode(), InsightMode::Enabled);
    }
}
