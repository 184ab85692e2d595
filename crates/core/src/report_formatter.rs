#![allow(clippy::format_push_string)]

use crate::signal::FlowReport;

pub struct ReportFormatter;

impl ReportFormatter {
    #[must_use]
    pub fn format(title: &str, report: &FlowReport) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str(&format!("  FLOW REPORT: {title}\n"));
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("Signals\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Total:                 {}\n", report.total_signals));
        output.push_str(&format!("Long:                  {}\n", report.long_signals));
        output.push_str(&format!("Short:                 {}\n", report.short_signals));

        if report.total_signals > 0 {
            output.push_str(&format!(
                "Average Confidence:    {:.2}%\n",
                report.average_confidence * 100.0
            ));
        } else {
            output.push_str("Average Confidence:    N/A (no signals)\n");
        }
        output.push_str(&format!("Market Bias:           {}\n", report.market_bias));
        output.push('\n');

        output.push_str("Strongest Signal\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        match &report.strongest_signal {
            Some(signal) => {
                output.push_str(&format!(
                    "{} {} @ {:.2}% (delta {:+.0}, {} candle)\n",
                    signal.action(),
                    signal.symbol(),
                    signal.confidence() * 100.0,
                    signal.delta(),
                    signal.candle_type()
                ));
                output.push_str(&format!(
                    "Stop {:.4} / Target {:.4}\n",
                    signal.atr_stop_loss(),
                    signal.atr_profit_target()
                ));
                output.push_str(&format!("{}\n", signal.reasoning()));
            }
            None => output.push_str("None\n"),
        }

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");

        output
    }
}
