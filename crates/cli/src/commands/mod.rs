//! CLI commands for the delta-flow engine.

pub mod config;
pub mod replay;
pub mod session;
pub mod signal;

pub use config::{run_config, ConfigArgs};
pub use replay::{render_text, replay, run_replay, ReplayArgs, ReplayOutcome, SymbolReport};
pub use session::{run_session, SessionArgs};
pub use signal::{evaluate, run_signal, SignalArgs, SignalOutcome};
