//! The desktop tool set.
//!
//! One tool per automation action, each implementing [`ToolDefinition`]
//! against the capability traits from `deskhand-toolkit`. Tools hold `Arc`
//! clones of exactly the providers they need; the backend set is chosen once
//! at startup and shared.
//!
//! Capability calls are blocking OS work, so every tool pushes them through
//! [`tokio::task::spawn_blocking`]. That keeps the dispatcher's deadline
//! effective: when the budget expires the dispatcher stops waiting and the
//! abandoned call finishes (or fails) on its blocking thread in the
//! background.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use deskhand_toolkit::clipboard::ClipboardProvider;
use deskhand_toolkit::keyboard::{KeyChord, KeyPress, KeyboardProvider, TypeText};
use deskhand_toolkit::launch::{LaunchProvider, LaunchRequest};
use deskhand_toolkit::platform::Platform;
use deskhand_toolkit::pointer::{
    MouseButton, PointerClick, PointerDrag, PointerMove, PointerProvider, PointerScroll,
    ScrollDirection,
};
use deskhand_toolkit::scrape::ScrapeProvider;
use deskhand_toolkit::shell::{ShellCommand, ShellProvider};
use deskhand_toolkit::window::{WindowBounds, WindowProvider};
use deskhand_tools::{DispatchError, ToolDefinition, ToolOutput, ToolOutputMetadata, ToolRegistry};

use crate::state::{SnapshotConfig, StateTool};

/// Build an argument error that keeps its kind through dispatch
/// normalization (schema validation cannot see enum values or ranges).
fn invalid(reason: String) -> anyhow::Error {
    anyhow::Error::new(DispatchError::InvalidArgument { reason })
}

/// Run a blocking capability call on the blocking pool.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> deskhand_toolkit::ToolkitResult<T> + Send + 'static,
    T: Send + 'static,
{
    let value = tokio::task::spawn_blocking(f)
        .await
        .context("capability task failed")??;
    Ok(value)
}

fn require_i32(input: &serde_json::Value, field: &str) -> Result<i32> {
    Ok(input
        .get(field)
        .and_then(|v| v.as_i64())
        .with_context(|| format!("missing required field: {field}"))? as i32)
}

fn require_str<'a>(input: &'a serde_json::Value, field: &str) -> Result<&'a str> {
    input
        .get(field)
        .and_then(|v| v.as_str())
        .with_context(|| format!("missing required field: {field}"))
}

// ---------------------------------------------------------------------------
// ClickTool
// ---------------------------------------------------------------------------

/// Click at screen coordinates.
struct ClickTool {
    pointer: Arc<dyn PointerProvider>,
}

#[async_trait::async_trait]
impl ToolDefinition for ClickTool {
    fn name(&self) -> &str {
        "click"
    }

    fn description(&self) -> &str {
        "Click at screen coordinates with the given mouse button"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "x": {"type": "integer", "description": "Horizontal screen coordinate"},
                "y": {"type": "integer", "description": "Vertical screen coordinate"},
                "button": {
                    "type": "string",
                    "description": "Mouse button: left (default), right, or middle"
                },
                "clicks": {"type": "integer", "description": "Click count, 2 for double-click"}
            },
            "required": ["x", "y"]
        })
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let x = require_i32(&input, "x")?;
        let y = require_i32(&input, "y")?;
        let button = match input.get("button").and_then(|v| v.as_str()) {
            None => MouseButton::Left,
            Some(raw) => MouseButton::parse(raw).ok_or_else(|| {
                invalid(format!("button must be left, right, or middle (got: {raw})"))
            })?,
        };
        let clicks = input.get("clicks").and_then(|v| v.as_u64()).unwrap_or(1) as u32;
        if clicks == 0 || clicks > 3 {
            return Err(invalid(format!("clicks must be between 1 and 3 (got: {clicks})")));
        }

        let start = Instant::now();
        let pointer = Arc::clone(&self.pointer);
        run_blocking(move || {
            pointer.click(&PointerClick {
                x,
                y,
                button,
                clicks,
            })
        })
        .await?;

        Ok(ToolOutput {
            result: serde_json::json!({
                "clicked": {"x": x, "y": y},
                "button": button,
                "clicks": clicks,
            }),
            content: None,
            metadata: ToolOutputMetadata::finished(start.elapsed().as_millis() as u64, None),
        })
    }
}

// ---------------------------------------------------------------------------
// TypeTool
// ---------------------------------------------------------------------------

/// Click a target location to focus it, then type text.
struct TypeTool {
    pointer: Arc<dyn PointerProvider>,
    keyboard: Arc<dyn KeyboardProvider>,
}

#[async_trait::async_trait]
impl ToolDefinition for TypeTool {
    fn name(&self) -> &str {
        "type"
    }

    fn description(&self) -> &str {
        "Click the element at the given coordinates to focus it, then type text into it"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "x": {"type": "integer", "description": "Horizontal coordinate of the target element"},
                "y": {"type": "integer", "description": "Vertical coordinate of the target element"},
                "text": {"type": "string", "description": "Text to type"},
                "clear": {"type": "boolean", "description": "Clear the field before typing"}
            },
            "required": ["x", "y", "text"]
        })
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let x = require_i32(&input, "x")?;
        let y = require_i32(&input, "y")?;
        let text = require_str(&input, "text")?.to_string();
        let clear = input.get("clear").and_then(|v| v.as_bool()).unwrap_or(false);

        let start = Instant::now();
        let pointer = Arc::clone(&self.pointer);
        let keyboard = Arc::clone(&self.keyboard);
        let typed = text.chars().count();
        run_blocking(move || {
            pointer.click(&PointerClick {
                x,
                y,
                button: MouseButton::Left,
                clicks: 1,
            })?;
            keyboard.type_text(&TypeText { text, clear })
        })
        .await?;

        Ok(ToolOutput {
            result: serde_json::json!({
                "typed_chars": typed,
                "cleared": clear,
                "target": {"x": x, "y": y},
            }),
            content: None,
            metadata: ToolOutputMetadata::finished(start.elapsed().as_millis() as u64, None),
        })
    }
}

// ---------------------------------------------------------------------------
// ClipboardTool
// ---------------------------------------------------------------------------

/// Copy text to, or paste text from, the system clipboard.
struct ClipboardTool {
    clipboard: Arc<dyn ClipboardProvider>,
}

#[async_trait::async_trait]
impl ToolDefinition for ClipboardTool {
    fn name(&self) -> &str {
        "clipboard"
    }

    fn description(&self) -> &str {
        "Copy text to the clipboard (mode=copy) or read the clipboard (mode=paste)"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "mode": {"type": "string", "description": "Either copy or paste"},
                "text": {"type": "string", "description": "Text to copy (required when mode=copy)"}
            },
            "required": ["mode"]
        })
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let mode = require_str(&input, "mode")?;
        let start = Instant::now();
        let clipboard = Arc::clone(&self.clipboard);

        match mode {
            "copy" => {
                let text = input
                    .get("text")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| invalid("text is required when mode=copy".to_string()))?
                    .to_string();
                let bytes = text.len() as u64;
                run_blocking(move || clipboard.write_text(&text)).await?;
                Ok(ToolOutput {
                    result: serde_json::json!({"mode": "copy", "copied_bytes": bytes}),
                    content: None,
                    metadata: ToolOutputMetadata::finished(
                        start.elapsed().as_millis() as u64,
                        Some(bytes),
                    ),
                })
            }
            "paste" => {
                let text = run_blocking(move || clipboard.read_text()).await?;
                let bytes = text.len() as u64;
                Ok(ToolOutput {
                    result: serde_json::json!({"mode": "paste", "text": text}),
                    content: None,
                    metadata: ToolOutputMetadata::finished(
                        start.elapsed().as_millis() as u64,
                        Some(bytes),
                    ),
                })
            }
            other => Err(invalid(format!("mode must be copy or paste (got: {other})"))),
        }
    }
}

// ---------------------------------------------------------------------------
// ScrollTool
// ---------------------------------------------------------------------------

/// Scroll the mouse wheel, optionally at a position.
struct ScrollTool {
    pointer: Arc<dyn PointerProvider>,
}

#[async_trait::async_trait]
impl ToolDefinition for ScrollTool {
    fn name(&self) -> &str {
        "scroll"
    }

    fn description(&self) -> &str {
        "Scroll up/down/left/right, optionally moving the cursor to (x, y) first"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "direction": {"type": "string", "description": "up, down, left, or right"},
                "x": {"type": "integer", "description": "Cursor position before scrolling"},
                "y": {"type": "integer", "description": "Cursor position before scrolling"},
                "wheel_times": {"type": "integer", "description": "Number of wheel notches (default 1)"}
            },
            "required": ["direction"]
        })
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let raw = require_str(&input, "direction")?;
        let direction = ScrollDirection::parse(raw)
            .ok_or_else(|| invalid(format!("direction must be up, down, left, or right (got: {raw})")))?;
        let x = input.get("x").and_then(|v| v.as_i64()).map(|v| v as i32);
        let y = input.get("y").and_then(|v| v.as_i64()).map(|v| v as i32);
        let wheel_times = input
            .get("wheel_times")
            .and_then(|v| v.as_u64())
            .unwrap_or(1) as u32;
        if wheel_times == 0 || wheel_times > 50 {
            return Err(invalid(format!(
                "wheel_times must be between 1 and 50 (got: {wheel_times})"
            )));
        }

        let start = Instant::now();
        let pointer = Arc::clone(&self.pointer);
        run_blocking(move || {
            pointer.scroll(&PointerScroll {
                x,
                y,
                direction,
                wheel_times,
            })
        })
        .await?;

        Ok(ToolOutput {
            result: serde_json::json!({"direction": direction, "wheel_times": wheel_times}),
            content: None,
            metadata: ToolOutputMetadata::finished(start.elapsed().as_millis() as u64, None),
        })
    }
}

// ---------------------------------------------------------------------------
// DragTool
// ---------------------------------------------------------------------------

/// Press at one point, move, release at another.
struct DragTool {
    pointer: Arc<dyn PointerProvider>,
}

#[async_trait::async_trait]
impl ToolDefinition for DragTool {
    fn name(&self) -> &str {
        "drag"
    }

    fn description(&self) -> &str {
        "Drag with the left button from one screen position to another"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "from_x": {"type": "integer"},
                "from_y": {"type": "integer"},
                "to_x": {"type": "integer"},
                "to_y": {"type": "integer"}
            },
            "required": ["from_x", "from_y", "to_x", "to_y"]
        })
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let req = PointerDrag {
            from_x: require_i32(&input, "from_x")?,
            from_y: require_i32(&input, "from_y")?,
            to_x: require_i32(&input, "to_x")?,
            to_y: require_i32(&input, "to_y")?,
        };

        let start = Instant::now();
        let pointer = Arc::clone(&self.pointer);
        let summary = serde_json::json!({
            "from": {"x": req.from_x, "y": req.from_y},
            "to": {"x": req.to_x, "y": req.to_y},
        });
        run_blocking(move || pointer.drag(&req)).await?;

        Ok(ToolOutput {
            result: summary,
            content: None,
            metadata: ToolOutputMetadata::finished(start.elapsed().as_millis() as u64, None),
        })
    }
}

// ---------------------------------------------------------------------------
// MoveTool
// ---------------------------------------------------------------------------

/// Move the cursor without clicking.
struct MoveTool {
    pointer: Arc<dyn PointerProvider>,
}

#[async_trait::async_trait]
impl ToolDefinition for MoveTool {
    fn name(&self) -> &str {
        "move"
    }

    fn description(&self) -> &str {
        "Move the mouse cursor to screen coordinates without clicking"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "x": {"type": "integer"},
                "y": {"type": "integer"}
            },
            "required": ["x", "y"]
        })
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let x = require_i32(&input, "x")?;
        let y = require_i32(&input, "y")?;

        let start = Instant::now();
        let pointer = Arc::clone(&self.pointer);
        run_blocking(move || pointer.move_to(&PointerMove { x, y })).await?;

        Ok(ToolOutput {
            result: serde_json::json!({"moved": {"x": x, "y": y}}),
            content: None,
            metadata: ToolOutputMetadata::finished(start.elapsed().as_millis() as u64, None),
        })
    }
}

// ---------------------------------------------------------------------------
// ShortcutTool
// ---------------------------------------------------------------------------

/// Press a key chord, e.g. ctrl+shift+t.
struct ShortcutTool {
    keyboard: Arc<dyn KeyboardProvider>,
}

#[async_trait::async_trait]
impl ToolDefinition for ShortcutTool {
    fn name(&self) -> &str {
        "shortcut"
    }

    fn description(&self) -> &str {
        "Press a keyboard shortcut given as a list of keys, e.g. [\"ctrl\", \"s\"]"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "keys": {
                    "type": "array",
                    "description": "Keys pressed together, modifiers first"
                }
            },
            "required": ["keys"]
        })
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let keys: Vec<String> = input
            .get("keys")
            .and_then(|v| v.as_array())
            .context("missing required field: keys")?
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid("keys must be an array of strings".to_string()))
            })
            .collect::<Result<_>>()?;
        if keys.is_empty() {
            return Err(invalid("keys must not be empty".to_string()));
        }

        let start = Instant::now();
        let keyboard = Arc::clone(&self.keyboard);
        let pressed = keys.clone();
        run_blocking(move || keyboard.shortcut(&KeyChord { keys })).await?;

        Ok(ToolOutput {
            result: serde_json::json!({"pressed": pressed}),
            content: None,
            metadata: ToolOutputMetadata::finished(start.elapsed().as_millis() as u64, None),
        })
    }
}

// ---------------------------------------------------------------------------
// KeyTool
// ---------------------------------------------------------------------------

/// Press a single key.
struct KeyTool {
    keyboard: Arc<dyn KeyboardProvider>,
}

#[async_trait::async_trait]
impl ToolDefinition for KeyTool {
    fn name(&self) -> &str {
        "key"
    }

    fn description(&self) -> &str {
        "Press a single key, e.g. enter, escape, f5"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "key": {"type": "string", "description": "Key name"}
            },
            "required": ["key"]
        })
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let key = require_str(&input, "key")?.to_string();
        if key.is_empty() {
            return Err(invalid("key must not be empty".to_string()));
        }

        let start = Instant::now();
        let keyboard = Arc::clone(&self.keyboard);
        let name = key.clone();
        run_blocking(move || keyboard.press_key(&KeyPress { key })).await?;

        Ok(ToolOutput {
            result: serde_json::json!({"pressed": name}),
            content: None,
            metadata: ToolOutputMetadata::finished(start.elapsed().as_millis() as u64, None),
        })
    }
}

// ---------------------------------------------------------------------------
// WaitTool
// ---------------------------------------------------------------------------

/// Maximum wait accepted by the `wait` tool.
const MAX_WAIT_SECS: f64 = 60.0;

/// Sleep for a duration. No capability backend involved; each call is fully
/// independent.
struct WaitTool;

#[async_trait::async_trait]
impl ToolDefinition for WaitTool {
    fn name(&self) -> &str {
        "wait"
    }

    fn description(&self) -> &str {
        "Pause for the given number of seconds (max 60)"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "seconds": {"type": "number", "description": "Seconds to wait, 0 to 60"}
            },
            "required": ["seconds"]
        })
    }

    fn timeout(&self) -> Duration {
        // Must outlast the longest permitted sleep.
        Duration::from_secs(65)
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let seconds = input
            .get("seconds")
            .and_then(|v| v.as_f64())
            .context("missing required field: seconds")?;
        if !(0.0..=MAX_WAIT_SECS).contains(&seconds) {
            return Err(invalid(format!(
                "seconds must be between 0 and {MAX_WAIT_SECS} (got: {seconds})"
            )));
        }

        let start = Instant::now();
        tokio::time::sleep(Duration::from_secs_f64(seconds)).await;

        Ok(ToolOutput {
            result: serde_json::json!({"waited_seconds": seconds}),
            content: None,
            metadata: ToolOutputMetadata::finished(start.elapsed().as_millis() as u64, None),
        })
    }
}

// ---------------------------------------------------------------------------
// ResizeTool
// ---------------------------------------------------------------------------

/// Move and/or resize an application window.
struct ResizeTool {
    window: Arc<dyn WindowProvider>,
}

#[async_trait::async_trait]
impl ToolDefinition for ResizeTool {
    fn name(&self) -> &str {
        "resize"
    }

    fn description(&self) -> &str {
        "Move and/or resize the foreground window, or a window matched by app name"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "App title substring; defaults to the foreground window"},
                "x": {"type": "integer"},
                "y": {"type": "integer"},
                "width": {"type": "integer"},
                "height": {"type": "integer"}
            },
            "required": []
        })
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let req = WindowBounds {
            name: input
                .get("name")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            x: input.get("x").and_then(|v| v.as_i64()).map(|v| v as i32),
            y: input.get("y").and_then(|v| v.as_i64()).map(|v| v as i32),
            width: input
                .get("width")
                .and_then(|v| v.as_u64())
                .map(|v| v as u32),
            height: input
                .get("height")
                .and_then(|v| v.as_u64())
                .map(|v| v as u32),
        };
        if req.is_empty() {
            return Err(invalid(
                "at least one of x, y, width, height is required".to_string(),
            ));
        }

        let start = Instant::now();
        let window = Arc::clone(&self.window);
        let summary = serde_json::to_value(&req)?;
        run_blocking(move || window.resize(&req)).await?;

        Ok(ToolOutput {
            result: serde_json::json!({"resized": summary}),
            content: None,
            metadata: ToolOutputMetadata::finished(start.elapsed().as_millis() as u64, None),
        })
    }
}

// ---------------------------------------------------------------------------
// LaunchTool
// ---------------------------------------------------------------------------

/// Start an application by name.
struct LaunchTool {
    launch: Arc<dyn LaunchProvider>,
}

#[async_trait::async_trait]
impl ToolDefinition for LaunchTool {
    fn name(&self) -> &str {
        "launch"
    }

    fn description(&self) -> &str {
        "Launch an application by name"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Application name or executable"}
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let name = require_str(&input, "name")?.to_string();
        if name.trim().is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }

        let start = Instant::now();
        let launch = Arc::clone(&self.launch);
        let label = name.clone();
        let launched = run_blocking(move || launch.launch(&LaunchRequest { name })).await?;

        Ok(ToolOutput {
            result: serde_json::json!({"launched": label, "pid": launched.pid}),
            content: None,
            metadata: ToolOutputMetadata::finished(start.elapsed().as_millis() as u64, None),
        })
    }
}

// ---------------------------------------------------------------------------
// ShellTool
// ---------------------------------------------------------------------------

/// Run a command in the platform shell.
struct ShellTool {
    shell: Arc<dyn ShellProvider>,
}

#[async_trait::async_trait]
impl ToolDefinition for ShellTool {
    fn name(&self) -> &str {
        "shell"
    }

    fn description(&self) -> &str {
        "Run a command in the platform's native shell and return its output"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {"type": "string", "description": "Command line to execute"}
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let command = require_str(&input, "command")?.to_string();

        let start = Instant::now();
        let shell = Arc::clone(&self.shell);
        let output = run_blocking(move || shell.run(&ShellCommand { command })).await?;
        let bytes = (output.stdout.len() + output.stderr.len()) as u64;

        Ok(ToolOutput {
            result: serde_json::json!({
                "stdout": output.stdout,
                "stderr": output.stderr,
                "status": output.status,
                "truncated": output.truncated,
            }),
            content: None,
            metadata: ToolOutputMetadata::finished(
                start.elapsed().as_millis() as u64,
                Some(bytes),
            ),
        })
    }
}

// ---------------------------------------------------------------------------
// ScrapeTool
// ---------------------------------------------------------------------------

/// Fetch a web page and reduce it to plain text.
struct ScrapeTool {
    scrape: Arc<dyn ScrapeProvider>,
}

#[async_trait::async_trait]
impl ToolDefinition for ScrapeTool {
    fn name(&self) -> &str {
        "scrape"
    }

    fn description(&self) -> &str {
        "Fetch an http(s) URL and return its title and extracted text"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {"type": "string", "description": "http or https URL"}
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let url = require_str(&input, "url")?.to_string();

        let start = Instant::now();
        let scrape = Arc::clone(&self.scrape);
        let page = run_blocking(move || scrape.fetch(&url)).await?;
        let bytes = page.text.len() as u64;

        Ok(ToolOutput {
            result: serde_json::json!({
                "url": page.url,
                "title": page.title,
                "text": page.text,
                "word_count": page.word_count,
            }),
            content: None,
            metadata: ToolOutputMetadata::finished(
                start.elapsed().as_millis() as u64,
                Some(bytes),
            ),
        })
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Register the full desktop tool set against the given backend set.
///
/// Called once during startup wiring; fails fast if any name collides.
pub fn register_desktop_tools(registry: &ToolRegistry, platform: &Platform) -> Result<()> {
    registry.register(Box::new(ClickTool {
        pointer: Arc::clone(&platform.pointer),
    }))?;
    registry.register(Box::new(TypeTool {
        pointer: Arc::clone(&platform.pointer),
        keyboard: Arc::clone(&platform.keyboard),
    }))?;
    registry.register(Box::new(ClipboardTool {
        clipboard: Arc::clone(&platform.clipboard),
    }))?;
    registry.register(Box::new(ScrollTool {
        pointer: Arc::clone(&platform.pointer),
    }))?;
    registry.register(Box::new(DragTool {
        pointer: Arc::clone(&platform.pointer),
    }))?;
    registry.register(Box::new(MoveTool {
        pointer: Arc::clone(&platform.pointer),
    }))?;
    registry.register(Box::new(ShortcutTool {
        keyboard: Arc::clone(&platform.keyboard),
    }))?;
    registry.register(Box::new(KeyTool {
        keyboard: Arc::clone(&platform.keyboard),
    }))?;
    registry.register(Box::new(WaitTool))?;
    registry.register(Box::new(StateTool::new(
        platform.clone(),
        SnapshotConfig::default(),
    )))?;
    registry.register(Box::new(ResizeTool {
        window: Arc::clone(&platform.window),
    }))?;
    registry.register(Box::new(LaunchTool {
        launch: Arc::clone(&platform.launch),
    }))?;
    registry.register(Box::new(ShellTool {
        shell: Arc::clone(&platform.shell),
    }))?;
    registry.register(Box::new(ScrapeTool {
        scrape: Arc::clone(&platform.scrape),
    }))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
