//! Rule-based narrative generator.
//!
//! Built only from the scored recommendation's reasoning tags plus the risk
//! values the scorer already used, so the text always agrees with the decision
//! it accompanies. Output is a pure function of its inputs.

use tickwise_core::risk::RiskRating;
use tickwise_core::scoring::Decision;

use super::parser::MAX_KEY_FACTORS;
use super::{Confidence, InsightContext, InsightResult, InsightSource, Sentiment};

/// Beta above this reads as higher market sensitivity.
const BETA_HIGH: f64 = 1.2;
/// Beta below this reads as lower market sensitivity.
const BETA_LOW: f64 = 0.8;

pub const BULLISH_STANCE: &str = "favours adding exposure";
pub const BEARISH_STANCE: &str = "favours reducing exposure";
pub const NEUTRAL_STANCE: &str = "favours waiting for clearer signals";

/// Assessment wording for `decision`. The risk rating never changes it.
pub fn stance_for(decision: Decision) -> &'static str {
    if decision.is_bullish() {
        BULLISH_STANCE
    } else if decision.is_bearish() {
        BEARISH_STANCE
    } else {
        NEUTRAL_STANCE
    }
}

pub fn beta_sensitivity(beta: f64) -> &'static str {
    if beta > BETA_HIGH {
        "higher"
    } else if beta < BETA_LOW {
        "lower"
    } else {
        "similar"
    }
}

pub fn sentiment_for(decision: Decision) -> Sentiment {
    if decision.is_bullish() {
        Sentiment::Positive
    } else if decision.is_bearish() {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

pub fn rule_based_insight(ctx: &InsightContext<'_>) -> InsightResult {
    let rec = ctx.recommendation;
    let risk = ctx.risk;

    let volatility = if risk.is_degenerate() {
        "no measurable volatility".to_string()
    } else {
        format!(
            "{:.1}% annualized ({} risk)",
            risk.volatility_annual * 100.0,
            risk.risk_rating.label().to_lowercase()
        )
    };

    let mut narrative = format!(
        "MARKET ANALYSIS FOR {}\n\n\
Recommendation: {} (score {:+}, horizon {})\n\
{}.\n\n\
CURRENT SITUATION:\n\
• Price: {:.2}\n\
• Trend: {}\n\
• Volatility: {}\n\
• Performance: Sharpe ratio {:.2}, max drawdown {:.1}%\n\n\
KEY FACTORS:\n",
        ctx.symbol,
        rec.decision.label(),
        rec.score,
        rec.horizon.label(),
        rec.rationale,
        ctx.snapshot.current_price,
        ctx.indicators.trend,
        volatility,
        risk.sharpe_ratio,
        risk.max_drawdown * 100.0,
    );

    for tag in &rec.reasoning {
        narrative.push_str(&format!("• {} ({:+})\n", tag.label, tag.points));
    }
    narrative.push_str(&format!(
        "• Beta of {:.2} shows {} market sensitivity\n",
        risk.beta,
        beta_sensitivity(risk.beta)
    ));
    if rec.is_partial() {
        narrative.push_str(&format!(
            "• {} factor(s) not scored for lack of usable data\n",
            rec.excluded.len()
        ));
    }

    let monitoring = match risk.risk_rating {
        RiskRating::High | RiskRating::VeryHigh => ", with active monitoring,",
        RiskRating::Low | RiskRating::Moderate => "",
    };
    narrative.push_str(&format!(
        "\nASSESSMENT:\n\
The combination of a {} trend and a {} risk profile {}{} over a {} horizon.\n",
        ctx.indicators.trend.label().to_lowercase(),
        risk.risk_rating.label().to_lowercase(),
        stance_for(rec.decision),
        monitoring,
        rec.horizon.label(),
    ));

    InsightResult {
        source: InsightSource::RuleBased,
        narrative,
        sentiment: sentiment_for(rec.decision),
        key_factors: rec
            .reasoning
            .iter()
            .take(MAX_KEY_FACTORS)
            .map(|t| t.label.clone())
            .collect(),
        confidence: Confidence::MediumHigh,
        generated_at: ctx.as_of,
    }
}
