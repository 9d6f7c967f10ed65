use anyhow::{Context, Result};
use dota_data::HeroRegistry;
use dota_state::{DraftResult, SLOT_COUNT};
use dota_vision::{DraftReader, EngineConfig, Recognizer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Outcome of reading one screenshot
#[derive(Debug, Clone, Serialize)]
pub struct DraftReport {
    pub path: PathBuf,
    pub result: DraftResult,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Manages the screenshot → hero reader → report pipeline.
///
/// Processing times are collected here, per pipeline, rather than in any
/// process-wide state.
pub struct Pipeline<'r, R> {
    reader: DraftReader<'r>,
    recognizer: R,
    timings: Vec<Duration>,
}

impl<'r, R: Recognizer> Pipeline<'r, R> {
    pub fn new(registry: &'r HeroRegistry, config: EngineConfig, recognizer: R) -> Self {
        info!("Hero reader ready: {} heroes", registry.len());
        Self {
            reader: DraftReader::new(registry, config),
            recognizer,
            timings: Vec::new(),
        }
    }

    /// Read the heroes from one screenshot file
    pub fn process(&mut self, path: &Path) -> Result<DraftReport> {
        let start = Instant::now();
        let frame = image::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .to_rgb8();

        let result = self
            .reader
            .identify(&frame, &self.recognizer)
            .with_context(|| format!("{} does not fit the draft layout", path.display()))?;
        let elapsed = start.elapsed();
        self.timings.push(elapsed);

        if result.aborted() {
            warn!(
                "{}: gave up after {} unreadable slot(s), retry on a new screenshot",
                path.display(),
                result.unresolved_count()
            );
        } else {
            info!(
                "{}: {} hero(es) read in {:.3}s",
                path.display(),
                result.slots().len() - result.unresolved_count(),
                elapsed.as_secs_f64()
            );
        }

        Ok(DraftReport {
            path: path.to_path_buf(),
            result,
            elapsed,
        })
    }

    /// Processing time of every successfully read screenshot, in order
    pub fn timings(&self) -> &[Duration] {
        &self.timings
    }
}

/// Render a report as the `|`-joined hero names and `,`-joined hero ids,
/// or as JSON.
pub fn format_report(report: &DraftReport, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(report).context("Failed to serialize report");
    }

    let result = &report.result;
    let mut out = format!("{}\n{}", result.names_line(), result.ids_csv());
    if result.aborted() {
        out.push_str(&format!(
            "\n(aborted after {} of {} slots)",
            result.slots().len(),
            SLOT_COUNT
        ));
    } else if result.unresolved_count() > 0 {
        let missing: Vec<String> = result
            .slots()
            .iter()
            .filter(|s| s.hero.is_none())
            .map(|s| s.index.to_string())
            .collect();
        out.push_str(&format!("\n(unresolved slots: {})", missing.join(", ")));
    }
    Ok(out)
}
