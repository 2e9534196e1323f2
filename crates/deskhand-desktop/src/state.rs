//! The `state` tool: concurrent desktop-state snapshot aggregation.
//!
//! One invocation fans out a capture task per requested source -- default
//! input language, browser context, running applications, UI element tree,
//! and a screenshot -- onto the runtime, each bounded by its own timeout and
//! all of them by a global snapshot budget. Sources run against independent
//! OS subsystems, so the result is a best-effort temporal approximation, not
//! a transactionally consistent view; the OS offers no cross-subsystem
//! transaction to do better.
//!
//! Partial failure is normal operation: a failed or timed-out source is
//! recorded in the per-source status map and its field stays empty. The
//! whole call fails only when every attempted source failed.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use anyhow::Result;
use base64::Engine as _;
use deskhand_toolkit::apps::AppEntry;
use deskhand_toolkit::elements::{ElementTree, UiElement};
use deskhand_toolkit::platform::Platform;
use deskhand_toolkit::screen::ImageFormat;
use deskhand_toolkit::sysinfo::BrowserContext;
use deskhand_tools::{DispatchError, ErrorKind, ToolDefinition, ToolOutput, ToolOutputMetadata};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// One independently-captured snapshot source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SnapshotSource {
    Language,
    Browser,
    Apps,
    Elements,
    Screenshot,
}

impl SnapshotSource {
    pub const ALL: [SnapshotSource; 5] = [
        SnapshotSource::Language,
        SnapshotSource::Browser,
        SnapshotSource::Apps,
        SnapshotSource::Elements,
        SnapshotSource::Screenshot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotSource::Language => "language",
            SnapshotSource::Browser => "browser",
            SnapshotSource::Apps => "apps",
            SnapshotSource::Elements => "elements",
            SnapshotSource::Screenshot => "screenshot",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "language" => Some(SnapshotSource::Language),
            "browser" => Some(SnapshotSource::Browser),
            "apps" => Some(SnapshotSource::Apps),
            "elements" => Some(SnapshotSource::Elements),
            "screenshot" => Some(SnapshotSource::Screenshot),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timeouts for one snapshot invocation.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Budget for a single source unless overridden per request.
    pub source_timeout: Duration,
    /// Budget for the whole snapshot; sources still pending when it elapses
    /// are recorded as timed out.
    pub global_timeout: Duration,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_secs(2),
            global_timeout: Duration::from_secs(8),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// Outcome of one capture source, success or not. Exactly one entry per
/// attempted source ends up in [`StateSnapshot::sources`]; a caller never
/// sees a snapshot field without knowing whether it is trustworthy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceStatus {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub elapsed_ms: u64,
}

impl SourceStatus {
    fn success(elapsed_ms: u64) -> Self {
        Self {
            ok: true,
            error_kind: None,
            message: None,
            elapsed_ms,
        }
    }

    fn failure(kind: ErrorKind, message: String, elapsed_ms: u64) -> Self {
        Self {
            ok: false,
            error_kind: Some(kind),
            message: Some(message),
            elapsed_ms,
        }
    }
}

/// Screenshot descriptor; the encoded bytes travel separately as the tool
/// output's binary content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScreenshotInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// The aggregated desktop state. Assembled once per invocation, immutable
/// afterwards, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserContext>,
    /// Foreground first, then most-recent-activation, exactly as the
    /// backend reported at capture time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apps: Option<Vec<AppEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive_elements: Option<Vec<UiElement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textual_elements: Option<Vec<UiElement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrollable_elements: Option<Vec<UiElement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<ScreenshotInfo>,
    /// Per-source outcome, keyed by source name.
    pub sources: BTreeMap<String, SourceStatus>,
}

/// What a successful capture task produced.
enum CaptureValue {
    Language(String),
    Browser(BrowserContext),
    Apps(Vec<AppEntry>),
    Elements(ElementTree),
    Screenshot(deskhand_toolkit::screen::Screenshot),
}

/// Why a capture task failed.
struct SourceFailure {
    kind: ErrorKind,
    message: String,
}

// ---------------------------------------------------------------------------
// StateTool
// ---------------------------------------------------------------------------

/// The `state` tool: one registered handler that internally fans out to the
/// capability backends.
pub struct StateTool {
    platform: Platform,
    config: SnapshotConfig,
}

impl StateTool {
    pub fn new(platform: Platform, config: SnapshotConfig) -> Self {
        Self { platform, config }
    }
}

#[async_trait::async_trait]
impl ToolDefinition for StateTool {
    fn name(&self) -> &str {
        "state"
    }

    fn description(&self) -> &str {
        "Capture a best-effort snapshot of the desktop: language, browser, apps, UI elements, screenshot"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "sources": {
                    "type": "array",
                    "description": "Sources to capture (language, browser, apps, elements, screenshot); defaults to all"
                },
                "timeouts": {
                    "type": "object",
                    "description": "Per-source timeout overrides in milliseconds, e.g. {\"elements\": 500}"
                }
            },
            "required": []
        })
    }

    fn timeout(&self) -> Duration {
        // Outlasts the global snapshot budget so the dispatcher deadline is
        // not the one cutting captures short.
        self.config.global_timeout + Duration::from_secs(2)
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let requested = parse_sources(&input)?;
        let overrides = parse_timeout_overrides(&input)?;

        let start = Instant::now();
        let captured = self.capture_all(&requested, &overrides).await;

        let attempted = captured.snapshot.sources.len();
        if attempted > 0 && captured.snapshot.sources.values().all(|s| !s.ok) {
            return Err(anyhow::Error::new(DispatchError::AllSourcesFailed {
                attempted,
            }));
        }

        let bytes = captured.screenshot_b64.as_ref().map(|c| c.len() as u64);
        Ok(ToolOutput {
            result: serde_json::to_value(&captured.snapshot)?,
            content: captured.screenshot_b64,
            metadata: ToolOutputMetadata::finished(start.elapsed().as_millis() as u64, bytes),
        })
    }
}

/// A snapshot plus the encoded screenshot bytes that ride outside it.
struct CapturedState {
    snapshot: StateSnapshot,
    screenshot_b64: Option<String>,
}

impl StateTool {
    async fn capture_all(
        &self,
        requested: &[SnapshotSource],
        overrides: &BTreeMap<SnapshotSource, Duration>,
    ) -> CapturedState {
        let mut set: JoinSet<(SnapshotSource, Result<CaptureValue, SourceFailure>, u64)> =
            JoinSet::new();

        for &source in requested {
            let timeout = overrides
                .get(&source)
                .copied()
                .unwrap_or(self.config.source_timeout);
            let platform = self.platform.clone();

            set.spawn(async move {
                let start = Instant::now();
                let result = tokio::time::timeout(
                    timeout,
                    tokio::task::spawn_blocking(move || capture_blocking(source, &platform)),
                )
                .await;
                let elapsed = start.elapsed().as_millis() as u64;

                let outcome = match result {
                    Ok(Ok(Ok(value))) => Ok(value),
                    Ok(Ok(Err(backend))) => Err(SourceFailure {
                        kind: ErrorKind::PlatformFailure,
                        message: backend.to_string(),
                    }),
                    Ok(Err(join_err)) => Err(SourceFailure {
                        kind: ErrorKind::PlatformFailure,
                        message: format!("capture task failed: {join_err}"),
                    }),
                    Err(_) => Err(SourceFailure {
                        kind: ErrorKind::Timeout,
                        message: format!("source timed out after {}ms", timeout.as_millis()),
                    }),
                };
                (source, outcome, elapsed)
            });
        }

        let mut snapshot = StateSnapshot::default();
        let mut screenshot_b64 = None;
        let mut pending: Vec<SnapshotSource> = requested.to_vec();
        let deadline = tokio::time::Instant::now() + self.config.global_timeout;

        while !pending.is_empty() {
            match tokio::time::timeout_at(deadline, set.join_next()).await {
                Ok(Some(Ok((source, outcome, elapsed)))) => {
                    pending.retain(|s| *s != source);
                    match outcome {
                        Ok(value) => {
                            apply_capture(&mut snapshot, &mut screenshot_b64, value);
                            snapshot
                                .sources
                                .insert(source.as_str().to_string(), SourceStatus::success(elapsed));
                        }
                        Err(failure) => {
                            tracing::warn!(
                                source = source.as_str(),
                                kind = ?failure.kind,
                                error = %failure.message,
                                "snapshot source failed"
                            );
                            snapshot.sources.insert(
                                source.as_str().to_string(),
                                SourceStatus::failure(failure.kind, failure.message, elapsed),
                            );
                        }
                    }
                }
                // A capture task itself died; its source is reported when
                // the global deadline sweep runs below.
                Ok(Some(Err(_join_err))) => continue,
                Ok(None) => break,
                Err(_) => break,
            }
        }

        // Anything still pending missed the global budget: stop waiting for
        // it. The abandoned blocking call may still complete in the
        // background; its result is discarded.
        if !pending.is_empty() {
            tracing::warn!(
                pending = ?pending.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
                budget_ms = self.config.global_timeout.as_millis() as u64,
                "global snapshot deadline elapsed, abandoning pending sources"
            );
            set.abort_all();
            let elapsed = self.config.global_timeout.as_millis() as u64;
            for source in pending {
                snapshot.sources.insert(
                    source.as_str().to_string(),
                    SourceStatus::failure(
                        ErrorKind::Timeout,
                        format!("global snapshot deadline of {elapsed}ms elapsed"),
                        elapsed,
                    ),
                );
            }
        }

        CapturedState {
            snapshot,
            screenshot_b64,
        }
    }
}

/// Run one source capture against its backend. Executed on the blocking pool.
fn capture_blocking(
    source: SnapshotSource,
    platform: &Platform,
) -> deskhand_toolkit::ToolkitResult<CaptureValue> {
    match source {
        SnapshotSource::Language => platform
            .system
            .default_language()
            .map(CaptureValue::Language),
        SnapshotSource::Browser => platform.system.browser_context().map(CaptureValue::Browser),
        SnapshotSource::Apps => platform.apps.list_apps().map(CaptureValue::Apps),
        SnapshotSource::Elements => platform.elements.snapshot().map(CaptureValue::Elements),
        SnapshotSource::Screenshot => platform.screen.screenshot().map(CaptureValue::Screenshot),
    }
}

/// Fold one successful capture into the snapshot.
fn apply_capture(
    snapshot: &mut StateSnapshot,
    screenshot_b64: &mut Option<String>,
    value: CaptureValue,
) {
    match value {
        CaptureValue::Language(lang) => snapshot.default_language = Some(lang),
        CaptureValue::Browser(ctx) => snapshot.browser = Some(ctx),
        CaptureValue::Apps(apps) => snapshot.apps = Some(apps),
        CaptureValue::Elements(tree) => {
            snapshot.interactive_elements = Some(tree.interactive);
            snapshot.textual_elements = Some(tree.textual);
            snapshot.scrollable_elements = Some(tree.scrollable);
        }
        CaptureValue::Screenshot(shot) => {
            snapshot.screenshot = Some(ScreenshotInfo {
                format: shot.format,
                width: shot.width,
                height: shot.height,
            });
            *screenshot_b64 =
                Some(base64::engine::general_purpose::STANDARD.encode(&shot.bytes));
        }
    }
}

/// Parse the optional `sources` argument; defaults to all five.
fn parse_sources(input: &serde_json::Value) -> Result<Vec<SnapshotSource>> {
    let Some(raw) = input.get("sources") else {
        return Ok(SnapshotSource::ALL.to_vec());
    };
    let list = raw
        .as_array()
        .ok_or_else(|| invalid_argument("sources must be an array of source names"))?;
    if list.is_empty() {
        return Err(invalid_argument("sources must not be empty"));
    }

    let mut sources = Vec::with_capacity(list.len());
    for item in list {
        let name = item
            .as_str()
            .ok_or_else(|| invalid_argument("sources must be an array of strings"))?;
        let source = SnapshotSource::parse(name).ok_or_else(|| {
            invalid_argument(&format!(
                "unknown source: {name} (expected language, browser, apps, elements, or screenshot)"
            ))
        })?;
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
    Ok(sources)
}

/// Parse the optional `timeouts` argument (source name -> milliseconds).
fn parse_timeout_overrides(
    input: &serde_json::Value,
) -> Result<BTreeMap<SnapshotSource, Duration>> {
    let Some(raw) = input.get("timeouts") else {
        return Ok(BTreeMap::new());
    };
    let map = raw
        .as_object()
        .ok_or_else(|| invalid_argument("timeouts must be an object of source -> milliseconds"))?;

    let mut overrides = BTreeMap::new();
    for (name, value) in map {
        let source = SnapshotSource::parse(name)
            .ok_or_else(|| invalid_argument(&format!("unknown source in timeouts: {name}")))?;
        let ms = value
            .as_u64()
            .filter(|ms| *ms > 0)
            .ok_or_else(|| {
                invalid_argument(&format!("timeout for {name} must be a positive integer of milliseconds"))
            })?;
        overrides.insert(source, Duration::from_millis(ms));
    }
    Ok(overrides)
}

fn invalid_argument(reason: &str) -> anyhow::Error {
    anyhow::Error::new(DispatchError::InvalidArgument {
        reason: reason.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
