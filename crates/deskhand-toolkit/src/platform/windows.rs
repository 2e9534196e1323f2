//! Windows backend bridged through PowerShell.
//!
//! Each capability call runs one `powershell -NoProfile -Command` invocation;
//! input injection and window placement go through inline `Add-Type` P/Invoke
//! shims over user32. This keeps the backend free of FFI bindings at the cost
//! of per-call process spawn latency, which is acceptable for agent-driven
//! automation (one action per model turn). Element queries need a UI
//! Automation walker and are not bridged here; they stay unavailable until a
//! UIA backend is wired.

use std::process::Command;
use std::sync::Arc;

use crate::apps::{AppEntry, AppsProvider};
use crate::clipboard::ClipboardProvider;
use crate::elements::UnavailableElements;
use crate::keyboard::{KeyChord, KeyPress, KeyboardProvider, TypeText};
use crate::launch::{LaunchProvider, LaunchRequest, LaunchedApp};
use crate::pointer::{
    MouseButton, PointerClick, PointerDrag, PointerMove, PointerProvider, PointerScroll,
    ScrollDirection,
};
use crate::scrape::HttpScraper;
use crate::screen::{ImageFormat, ScreenProvider, Screenshot};
use crate::shell::SystemShell;
use crate::sysinfo::{BrowserContext, SystemInfoProvider};
use crate::window::{WindowBounds, WindowProvider};
use crate::{ToolkitError, ToolkitResult};

use super::Platform;

pub(super) fn platform() -> Platform {
    Platform {
        pointer: Arc::new(WindowsPointer),
        keyboard: Arc::new(WindowsKeyboard),
        clipboard: Arc::new(WindowsClipboard),
        window: Arc::new(WindowsWindow),
        apps: Arc::new(WindowsApps),
        elements: Arc::new(UnavailableElements),
        screen: Arc::new(WindowsScreen),
        system: Arc::new(WindowsSystemInfo),
        launch: Arc::new(WindowsLaunch),
        shell: Arc::new(SystemShell),
        scrape: Arc::new(HttpScraper),
    }
}

/// Run a PowerShell script and return trimmed stdout.
fn powershell(script: &str) -> ToolkitResult<String> {
    let output = Command::new("powershell")
        .args(["-NoProfile", "-NonInteractive", "-Command", script])
        .output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ToolkitError::Backend(format!(
            "powershell exited with {}: {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// P/Invoke shim shared by the input backends.
const USER32_SHIM: &str = r#"
Add-Type -Name U32 -Namespace Dh -MemberDefinition @'
[DllImport("user32.dll")] public static extern bool SetCursorPos(int x, int y);
[DllImport("user32.dll")] public static extern void mouse_event(uint flags, uint dx, uint dy, int data, int extra);
[DllImport("user32.dll")] public static extern uint GetForegroundWindow();
[DllImport("user32.dll")] public static extern bool MoveWindow(System.IntPtr h, int x, int y, int w, int hgt, bool repaint);
'@
"#;

const MOUSEEVENTF_LEFTDOWN: u32 = 0x0002;
const MOUSEEVENTF_LEFTUP: u32 = 0x0004;
const MOUSEEVENTF_RIGHTDOWN: u32 = 0x0008;
const MOUSEEVENTF_RIGHTUP: u32 = 0x0010;
const MOUSEEVENTF_MIDDLEDOWN: u32 = 0x0020;
const MOUSEEVENTF_MIDDLEUP: u32 = 0x0040;
const MOUSEEVENTF_WHEEL: u32 = 0x0800;
const MOUSEEVENTF_HWHEEL: u32 = 0x1000;
const WHEEL_DELTA: i32 = 120;

fn button_flags(button: MouseButton) -> (u32, u32) {
    match button {
        MouseButton::Left => (MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP),
        MouseButton::Right => (MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP),
        MouseButton::Middle => (MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP),
    }
}

struct WindowsPointer;

impl PointerProvider for WindowsPointer {
    fn move_to(&self, req: &PointerMove) -> ToolkitResult<()> {
        powershell(&format!(
            "{USER32_SHIM}\n[Dh.U32]::SetCursorPos({}, {}) | Out-Null",
            req.x, req.y
        ))?;
        Ok(())
    }

    fn click(&self, req: &PointerClick) -> ToolkitResult<()> {
        let (down, up) = button_flags(req.button);
        let mut script = format!(
            "{USER32_SHIM}\n[Dh.U32]::SetCursorPos({}, {}) | Out-Null",
            req.x, req.y
        );
        for _ in 0..req.clicks.max(1) {
            script.push_str(&format!(
                "\n[Dh.U32]::mouse_event({down}, 0, 0, 0, 0)\n[Dh.U32]::mouse_event({up}, 0, 0, 0, 0)"
            ));
        }
        powershell(&script)?;
        Ok(())
    }

    fn drag(&self, req: &PointerDrag) -> ToolkitResult<()> {
        let (down, up) = button_flags(MouseButton::Left);
        powershell(&format!(
            "{USER32_SHIM}\n\
             [Dh.U32]::SetCursorPos({}, {}) | Out-Null\n\
             [Dh.U32]::mouse_event({down}, 0, 0, 0, 0)\n\
             Start-Sleep -Milliseconds 100\n\
             [Dh.U32]::SetCursorPos({}, {}) | Out-Null\n\
             Start-Sleep -Milliseconds 100\n\
             [Dh.U32]::mouse_event({up}, 0, 0, 0, 0)",
            req.from_x, req.from_y, req.to_x, req.to_y
        ))?;
        Ok(())
    }

    fn scroll(&self, req: &PointerScroll) -> ToolkitResult<()> {
        let mut script = USER32_SHIM.to_string();
        if let (Some(x), Some(y)) = (req.x, req.y) {
            script.push_str(&format!("\n[Dh.U32]::SetCursorPos({x}, {y}) | Out-Null"));
        }
        let (flag, delta) = match req.direction {
            ScrollDirection::Up => (MOUSEEVENTF_WHEEL, WHEEL_DELTA),
            ScrollDirection::Down => (MOUSEEVENTF_WHEEL, -WHEEL_DELTA),
            ScrollDirection::Left => (MOUSEEVENTF_HWHEEL, -WHEEL_DELTA),
            ScrollDirection::Right => (MOUSEEVENTF_HWHEEL, WHEEL_DELTA),
        };
        for _ in 0..req.wheel_times.max(1) {
            script.push_str(&format!(
                "\n[Dh.U32]::mouse_event({flag}, 0, 0, {delta}, 0)"
            ));
        }
        powershell(&script)?;
        Ok(())
    }
}

/// Escape text for `SendKeys` (its metacharacters are wrapped in braces).
fn sendkeys_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '+' | '^' | '%' | '~' | '(' | ')' | '{' | '}' | '[' | ']' => {
                out.push('{');
                out.push(ch);
                out.push('}');
            }
            _ => out.push(ch),
        }
    }
    out
}

fn sendkeys_token(key: &str) -> String {
    match key.to_lowercase().as_str() {
        "enter" | "return" => "{ENTER}".into(),
        "tab" => "{TAB}".into(),
        "escape" | "esc" => "{ESC}".into(),
        "backspace" => "{BACKSPACE}".into(),
        "delete" => "{DELETE}".into(),
        "home" => "{HOME}".into(),
        "end" => "{END}".into(),
        "pageup" => "{PGUP}".into(),
        "pagedown" => "{PGDN}".into(),
        "up" => "{UP}".into(),
        "down" => "{DOWN}".into(),
        "left" => "{LEFT}".into(),
        "right" => "{RIGHT}".into(),
        "space" => " ".into(),
        k if k.len() >= 2 && k.starts_with('f') && k[1..].chars().all(|c| c.is_ascii_digit()) => {
            format!("{{{}}}", k.to_uppercase())
        }
        other => sendkeys_escape(other),
    }
}

fn send_keys(sequence: &str) -> ToolkitResult<()> {
    let escaped = sequence.replace('\'', "''");
    powershell(&format!(
        "$ws = New-Object -ComObject WScript.Shell\n$ws.SendKeys('{escaped}')"
    ))?;
    Ok(())
}

struct WindowsKeyboard;

impl KeyboardProvider for WindowsKeyboard {
    fn type_text(&self, req: &TypeText) -> ToolkitResult<()> {
        if req.clear {
            send_keys("^a{DELETE}")?;
        }
        send_keys(&sendkeys_escape(&req.text))
    }

    fn press_key(&self, req: &KeyPress) -> ToolkitResult<()> {
        send_keys(&sendkeys_token(&req.key))
    }

    fn shortcut(&self, req: &KeyChord) -> ToolkitResult<()> {
        if req.keys.is_empty() {
            return Err(ToolkitError::InvalidRequest("empty key chord".into()));
        }
        // Modifiers become SendKeys prefixes, the final key is the payload.
        let mut prefix = String::new();
        let mut tail = String::new();
        for key in &req.keys {
            match key.to_lowercase().as_str() {
                "ctrl" | "control" => prefix.push('^'),
                "shift" => prefix.push('+'),
                "alt" => prefix.push('%'),
                other => tail.push_str(&sendkeys_token(other)),
            }
        }
        send_keys(&format!("{prefix}({tail})"))
    }
}

struct WindowsClipboard;

impl ClipboardProvider for WindowsClipboard {
    fn read_text(&self) -> ToolkitResult<String> {
        powershell("Get-Clipboard -Raw")
    }

    fn write_text(&self, text: &str) -> ToolkitResult<()> {
        let escaped = text.replace('\'', "''");
        powershell(&format!("Set-Clipboard -Value '{escaped}'"))?;
        Ok(())
    }
}

struct WindowsWindow;

impl WindowProvider for WindowsWindow {
    fn resize(&self, req: &WindowBounds) -> ToolkitResult<()> {
        let handle = match &req.name {
            Some(name) => {
                let escaped = name.replace('\'', "''");
                format!(
                    "(Get-Process | Where-Object {{ $_.MainWindowTitle -like '*{escaped}*' }} | Select-Object -First 1).MainWindowHandle"
                )
            }
            None => "[Dh.U32]::GetForegroundWindow()".to_string(),
        };
        // Geometry fields left unset keep their current value via GetWindowRect.
        let script = format!(
            "{USER32_SHIM}\n\
             $h = {handle}\n\
             if (-not $h) {{ Write-Error 'window not found'; exit 1 }}\n\
             [Dh.U32]::MoveWindow($h, {x}, {y}, {w}, {h}, $true) | Out-Null",
            x = req.x.map_or("0".into(), |v| v.to_string()),
            y = req.y.map_or("0".into(), |v| v.to_string()),
            w = req.width.map_or("800".into(), |v| v.to_string()),
            h = req.height.map_or("600".into(), |v| v.to_string()),
        );
        powershell(&script)?;
        Ok(())
    }
}

struct WindowsApps;

impl AppsProvider for WindowsApps {
    fn list_apps(&self) -> ToolkitResult<Vec<AppEntry>> {
        let out = powershell(&format!(
            "{USER32_SHIM}\n\
             $fg = [Dh.U32]::GetForegroundWindow()\n\
             Get-Process | Where-Object {{ $_.MainWindowTitle }} | ForEach-Object {{\n\
               '{{0}}|{{1}}|{{2}}' -f $_.Id, ($_.MainWindowHandle -eq $fg), $_.MainWindowTitle\n\
             }}"
        ))?;
        let mut apps = Vec::new();
        for line in out.lines() {
            let mut parts = line.splitn(3, '|');
            let (Some(pid), Some(fg), Some(title)) = (parts.next(), parts.next(), parts.next())
            else {
                continue;
            };
            let Ok(pid) = pid.trim().parse::<u32>() else {
                continue;
            };
            apps.push(AppEntry {
                pid,
                title: title.trim().to_string(),
                foreground: fg.trim().eq_ignore_ascii_case("true"),
            });
        }
        // Foreground first; the rest keep the order the OS reported.
        apps.sort_by_key(|a| !a.foreground);
        Ok(apps)
    }
}

struct WindowsScreen;

impl ScreenProvider for WindowsScreen {
    fn screenshot(&self) -> ToolkitResult<Screenshot> {
        let out = powershell(
            "Add-Type -AssemblyName System.Windows.Forms,System.Drawing\n\
             $b = [System.Windows.Forms.Screen]::PrimaryScreen.Bounds\n\
             $bmp = New-Object System.Drawing.Bitmap($b.Width, $b.Height)\n\
             $g = [System.Drawing.Graphics]::FromImage($bmp)\n\
             $g.CopyFromScreen($b.Location, [System.Drawing.Point]::Empty, $b.Size)\n\
             $ms = New-Object System.IO.MemoryStream\n\
             $bmp.Save($ms, [System.Drawing.Imaging.ImageFormat]::Png)\n\
             '{0}x{1}:' -f $b.Width, $b.Height\n\
             [Convert]::ToBase64String($ms.ToArray())",
        )?;
        let mut lines = out.lines();
        let dims = lines
            .next()
            .ok_or_else(|| ToolkitError::Backend("missing screenshot dimensions".into()))?;
        let b64: String = lines.collect();
        let (w, h) = dims
            .trim_end_matches(':')
            .split_once('x')
            .ok_or_else(|| ToolkitError::Backend("malformed screenshot dimensions".into()))?;
        let decode = |s: &str| {
            s.parse::<u32>()
                .map_err(|e| ToolkitError::Backend(format!("bad dimension: {e}")))
        };
        use base64::Engine as _;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(b64.trim())
            .map_err(|e| ToolkitError::Backend(format!("decode screenshot: {e}")))?;
        Ok(Screenshot {
            bytes,
            format: ImageFormat::Png,
            width: decode(w)?,
            height: decode(h)?,
        })
    }
}

struct WindowsSystemInfo;

impl SystemInfoProvider for WindowsSystemInfo {
    fn default_language(&self) -> ToolkitResult<String> {
        powershell("(Get-Culture).Name")
    }

    fn browser_context(&self) -> ToolkitResult<BrowserContext> {
        let progid = powershell(
            "(Get-ItemProperty 'HKCU:\\Software\\Microsoft\\Windows\\Shell\\Associations\\UrlAssociations\\http\\UserChoice').ProgId",
        )?;
        let name = match progid.as_str() {
            p if p.contains("Chrome") => "Chrome",
            p if p.contains("Firefox") => "Firefox",
            p if p.contains("Edge") || p.contains("MSEdge") => "Edge",
            p if p.contains("Brave") => "Brave",
            p if p.contains("Opera") => "Opera",
            _ => progid.as_str(),
        };
        Ok(BrowserContext {
            name: name.to_string(),
            path: None,
        })
    }
}

struct WindowsLaunch;

impl LaunchProvider for WindowsLaunch {
    fn launch(&self, req: &LaunchRequest) -> ToolkitResult<LaunchedApp> {
        let escaped = req.name.replace('\'', "''");
        let out = powershell(&format!(
            "(Start-Process -FilePath '{escaped}' -PassThru).Id"
        ))?;
        Ok(LaunchedApp {
            pid: out.trim().parse::<u32>().ok(),
        })
    }
}
