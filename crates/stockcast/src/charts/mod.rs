//! Chart documents rendered from a price series and its analysis
//!
//! Figures are plain Plotly JSON (`{data, layout}`), so any Plotly front end
//! can render them. [`Figure::to_html`] wraps one in a standalone page.

pub mod figure;
pub mod indicators;
pub mod price;

pub use figure::{Figure, business_days_after};
pub use indicators::indicator_chart;
pub use price::price_chart;
