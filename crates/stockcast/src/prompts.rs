//! Prompt text for the LLM summarizer

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// System instruction sent with every summary request
pub const ANALYST_SYSTEM_PROMPT: &str = r"You are an experienced equity research analyst.

Work through the data in this order:
1. Market overview
   - Latest price
   - 52-week high and low
2. Financial detail
   - Key metrics such as market capitalization, valuation ratios and earnings
3. Price behaviour
   - Recent trend, momentum and volatility visible in the price history
4. Market context
   - Industry position and overall sentiment

Reporting style:
- Open with a short executive summary
- Present figures in tables with clear section headers
- Use bullet points for key insights and mark trends as rising or falling
- Explain technical terms briefly
- Close with a forward-looking view

Base every statement on the data provided. Say so when a figure is missing.";

/// Kind of report requested from the summarizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportType {
    #[default]
    DetailedFinancial,
    Dividend,
    Technical,
    Risk,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [
        ReportType::DetailedFinancial,
        ReportType::Dividend,
        ReportType::Technical,
        ReportType::Risk,
    ];

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            ReportType::DetailedFinancial => "Detailed Financial Report",
            ReportType::Dividend => "Dividend Analysis",
            ReportType::Technical => "Technical Analysis",
            ReportType::Risk => "Risk Assessment",
        }
    }

    /// Query text for `symbol`
    pub fn query(self, symbol: &str) -> String {
        match self {
            ReportType::DetailedFinancial => format!(
                "Give a comprehensive financial analysis report about {symbol} stock including key metrics, ratios, and market position."
            ),
            ReportType::Dividend => {
                format!("Provide detailed dividend information and yield analysis for {symbol} stock.")
            }
            ReportType::Technical => format!(
                "Perform technical analysis on {symbol} stock including trend analysis and key indicators."
            ),
            ReportType::Risk => {
                format!("Analyze the risk profile and volatility characteristics of {symbol} stock.")
            }
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User message combining the query and the serialized snapshot
pub fn summary_prompt(query: &str, snapshot_json: &str) -> String {
    format!("Summarize the following text: {query}. Stock data: {snapshot_json}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_mention_symbol() {
        for report in ReportType::ALL {
            let query = report.query("NVDA");
            assert!(query.contains("NVDA stock"), "{query}");
            assert!(!query.contains("ticker"));
        }
    }

    #[test]
    fn test_report_type_parsing() {
        assert_eq!(
            ReportType::from_str("detailed-financial", false).unwrap(),
            ReportType::DetailedFinancial
        );
        assert_eq!(ReportType::from_str("RISK", true).unwrap(), ReportType::Risk);
        assert!(ReportType::from_str("sentiment", true).is_err());
        assert_eq!(serde_json::to_string(&ReportType::Dividend).unwrap(), "\"dividend\"");
    }

    #[test]
    fn test_summary_prompt() {
        let prompt = summary_prompt("Analyze AAPL", "{\"current_price\":1.0}");
        assert_eq!(
            prompt,
            "Summarize the following text: Analyze AAPL. Stock data: {\"current_price\":1.0}"
        );
    }
}
