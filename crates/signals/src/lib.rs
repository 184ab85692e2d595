pub mod confidence;
pub mod divergence;
pub mod engine;
pub mod generator;
pub mod history;
pub mod pipeline;
pub mod report;
pub mod risk;
pub mod session;
pub mod volatility;

// Re-export the per-bar components
pub use confidence::ConfidenceScorer;
pub use divergence::{detect_divergence, DivergenceDetector};
pub use generator::{long_condition, short_condition, DeltaFlowGenerator};
pub use risk::RiskEngine;
pub use session::SessionFilter;

// Re-export batch reporting
pub use report::{aggregate, ReportAggregator};

// Re-export caller-side state
pub use history::BarHistory;
pub use volatility::{true_range, AverageTrueRange};

// Re-export the engine facade and streaming pipeline
pub use engine::DeltaFlowEngine;
pub use pipeline::{FlowEvaluation, FlowPipeline, PipelineOutput, SymbolWorker};
