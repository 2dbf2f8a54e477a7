//! Tickwise Core: indicators, risk metrics, signal tags and recommendation scoring.
//!
//! Everything in this crate is a pure, synchronous function of a validated
//! [`domain::BarSeries`]:
//! - Domain types (bars, validated series, input errors)
//! - Indicator Library (SMA, EMA, RSI, MACD, Bollinger, Stochastic)
//! - Signal Classifier (threshold tags on the latest indicator values)
//! - Risk Library (volatility, Sharpe, drawdown, VaR, beta)
//! - Recommendation Scorer (additive points to a Buy/Sell/Hold decision)

pub mod domain;
pub mod indicators;
pub mod risk;
pub mod scoring;
pub mod signals;
