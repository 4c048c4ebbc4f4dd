//! Plain-text rendering of designs for the command-line binaries.
//!
//! Every view is a small `Display` type so the binaries can `println!` it and tests can
//! compare the rendered string.

use std::fmt;

use crate::designer::{DesignOutput, FeatureVector, Recommendation};

const BAR_WIDTH: usize = 30;
const GAUGE_WIDTH: usize = 20;

/// Labels used for the sample-design table columns.
pub const SAMPLE_COLUMNS: [&str; 3] = ["Resistor Value", "Capacitor Value", "Layout Score"];

/// The five inputs with their units.
pub struct FeatureSummary<'a>(pub &'a FeatureVector);

impl fmt::Display for FeatureSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fv = self.0;
        writeln!(f, "• Voltage: {:.1}V", fv.voltage)?;
        writeln!(f, "• Resistance: {:.0}Ω", fv.resistance)?;
        writeln!(f, "• Capacitance: {:.6}F", fv.capacitance)?;
        writeln!(f, "• Frequency: {:.0}Hz", fv.frequency)?;
        write!(f, "• Current: {:.3}A", fv.current)
    }
}

/// Numbered list of raw output values.
pub struct OutputList<'a>(pub &'a DesignOutput);

impl fmt::Display for OutputList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.values().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "• Design Parameter {}: {v:.4}", i + 1)?;
        }
        Ok(())
    }
}

/// Horizontal bar chart; bar lengths are relative to the largest magnitude.
///
/// Positive values draw with `█`, negative values with `░`.
pub struct BarChart<'a> {
    pub items: &'a [(&'static str, f32)],
}

impl fmt::Display for BarChart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.items.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        let max_abs = self
            .items
            .iter()
            .map(|(_, v)| v.abs())
            .fold(0.0_f32, f32::max);

        for (i, (label, value)) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let len = if max_abs > 0.0 {
                ((value.abs() / max_abs) * BAR_WIDTH as f32).round() as usize
            } else {
                0
            };
            let glyph = if *value < 0.0 { "░" } else { "█" };
            write!(
                f,
                "{label:<label_width$} | {}{} {value:.4}",
                glyph.repeat(len),
                " ".repeat(BAR_WIDTH - len.min(BAR_WIDTH)),
            )?;
        }
        Ok(())
    }
}

/// Percentage gauges, clamped to `0..=100` for drawing but printed unclamped.
pub struct Gauges<'a> {
    pub items: &'a [(&'static str, f32)],
}

impl fmt::Display for Gauges<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (label, percent)) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let filled = ((percent.clamp(0.0, 100.0) / 100.0) * GAUGE_WIDTH as f32).round() as usize;
            write!(
                f,
                "[{}{}] {label}: {percent:.1}%",
                "#".repeat(filled),
                ".".repeat(GAUGE_WIDTH - filled),
            )?;
        }
        Ok(())
    }
}

/// One line per recommendation, or a neutral line when there are none.
pub struct Recommendations<'a>(pub &'a [Recommendation]);

impl fmt::Display for Recommendations<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "No recommendations for this design");
        }
        for (i, rec) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "• {}", rec.message())?;
        }
        Ok(())
    }
}

/// Table of sample designs; the per-column maximum is marked with `*`.
///
/// Only the first three values of each design are shown.
pub struct SampleTable<'a> {
    pub designs: &'a [DesignOutput],
}

impl fmt::Display for SampleTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<10}", "Circuit")?;
        for col in SAMPLE_COLUMNS {
            write!(f, " | {col:>16}")?;
        }

        let col_max: Vec<Option<f32>> = (0..SAMPLE_COLUMNS.len())
            .map(|c| {
                self.designs
                    .iter()
                    .filter_map(|d| d.values().get(c).copied())
                    .reduce(f32::max)
            })
            .collect();

        for (i, design) in self.designs.iter().enumerate() {
            writeln!(f)?;
            write!(f, "{:<10}", format!("Circuit {}", i + 1))?;
            for (c, max) in col_max.iter().enumerate() {
                match design.values().get(c) {
                    Some(&v) => {
                        let mark = if Some(v) == *max { "*" } else { " " };
                        write!(f, " | {v:>15.4}{mark}")?;
                    }
                    None => write!(f, " | {:>16}", "-")?,
                }
            }
        }
        Ok(())
    }
}
