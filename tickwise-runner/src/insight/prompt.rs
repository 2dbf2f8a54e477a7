//! Prompt construction for the generative call.

use super::InsightContext;

/// System message sent with every request.
pub const SYSTEM_PROMPT: &str = "You are a senior financial analyst with more than 20 years \
of experience in equity markets. Be concise, balanced and specific.";

/// Number of indicator tags listed in the prompt.
const TOP_SIGNALS: usize = 5;

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.decimals$}"))
}

/// Render the user prompt for one analysed symbol.
pub fn build_prompt(ctx: &InsightContext<'_>) -> String {
    let ind = ctx.indicators;
    let risk = ctx.risk;
    let snap = ctx.snapshot;

    let mut prompt = format!(
        "MARKET ANALYSIS FOR {}\n\n\
PRICE:\n\
- Current price: {:.2}\n\
- 1-bar change: {:+.2}%\n\
- 20-bar change: {:+.2}%\n\n\
TECHNICAL INDICATORS:\n\
- Trend: {}\n\
- RSI({}): {} ({})\n\
- MACD: {} / signal {} / histogram {} ({})\n\
- Bollinger position: {}\n\n\
RISK:\n\
- Annual volatility: {:.1}%\n\
- Sharpe ratio: {:.2}\n\
- Max drawdown: {:.1}%\n\
- Beta: {:.2}\n\
- Risk rating: {}\n",
        ctx.symbol,
        snap.current_price,
        snap.change_1_bar_pct,
        snap.change_20_bar_pct,
        ind.trend,
        ind.rsi.name.trim_start_matches("rsi_"),
        fmt_opt(ind.rsi.latest, 1),
        ind.rsi.tag,
        fmt_opt(ind.macd.macd, 3),
        fmt_opt(ind.macd.signal, 3),
        fmt_opt(ind.macd.histogram, 3),
        ind.macd.tag,
        ind.bollinger.tag,
        risk.volatility_annual * 100.0,
        risk.sharpe_ratio,
        risk.max_drawdown * 100.0,
        risk.beta,
        risk.risk_rating,
    );

    prompt.push_str("\nTOP SIGNALS:\n");
    for (name, tag) in ind.tags().into_iter().take(TOP_SIGNALS) {
        prompt.push_str(&format!("- {name}: {tag}\n"));
    }

    prompt.push_str(&format!(
        "\nMODEL SCORE: {} ({})\n\n",
        ctx.recommendation.score,
        ctx.recommendation.decision.label()
    ));
    prompt.push_str(
        "Please provide:\n\
1. An overall assessment of the current market situation\n\
2. The key factors driving the price, as bullet points\n\
3. Market sentiment (positive / negative / neutral)\n\
4. Main opportunities and risks\n\
5. What to watch before acting\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::tests_support::fixture;

    #[test]
    fn prompt_mentions_every_section() {
        let fx = fixture(260);
        let prompt = build_prompt(&fx.context());
        for needle in [
            "MARKET ANALYSIS FOR FIX",
            "Current price:",
            "Trend:",
            "RSI(14):",
            "MACD:",
            "Bollinger position:",
            "Annual volatility:",
            "Sharpe ratio:",
            "Max drawdown:",
            "Beta:",
            "Risk rating:",
            "TOP SIGNALS:",
            "Please provide:",
        ] {
            assert!(prompt.contains(needle), "missing {needle:?} in:\n{prompt}");
        }
    }

    #[test]
    fn prompt_lists_five_signals() {
        let fx = fixture(260);
        let prompt = build_prompt(&fx.context());
        let section = prompt
            .split("TOP SIGNALS:\n")
            .nth(1)
            .and_then(|rest| rest.split("\n\n").next())
            .unwrap();
        assert_eq!(section.lines().count(), 5);
        assert!(section.starts_with("- trend:"));
    }

    #[test]
    fn undefined_values_render_as_na() {
        let fx = fixture(5);
        let prompt = build_prompt(&fx.context());
        assert!(prompt.contains("RSI(14): n/a (No Signal)"));
    }
}
