pub mod config;
pub mod config_loader;
pub mod error;
pub mod market;
pub mod report_formatter;
pub mod signal;
pub mod traits;

pub use config::{
    ConfidenceConfig, DivergenceConfig, EngineConfig, PipelineConfig, ReportConfig, RiskConfig,
    SessionConfig, SignalConfig,
};
pub use config_loader::ConfigLoader;
pub use error::{ensure_finite, EngineError, EngineResult};
pub use market::{BarEvent, Candle, CandleType, OrderFlowSnapshot};
pub use report_formatter::ReportFormatter;
pub use signal::{Action, DivergenceResult, FlowReport, MarketBias, RiskLevels, Side, Signal};
pub use traits::{BarSource, MemoryBarSource};
