//! External forecast handling
//!
//! - [`PredictionParser`]: untrusted forecaster text → [`Prediction`]
//! - [`AnalysisRequest`]: system instruction and prompt sent to the forecaster

mod parser;
mod prompt;
mod types;

pub use parser::PredictionParser;
pub use prompt::{build_analysis_prompt, AnalysisRequest, SYSTEM_INSTRUCTION};
pub use types::{Prediction, PredictionSource, UNAVAILABLE_RATIONALE};
