//! Trade journal and realized P&L

mod resolution;
mod tracker;

pub use resolution::{PendingPosition, Resolution, ResolutionMetrics, ResolutionTracker, ResolvedPosition};
pub use tracker::{PerformanceStats, PerformanceTracker, TradeRecord};
