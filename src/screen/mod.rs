//! Detection of the physical screen resolution.
//!
//! The result is the ceiling for user-entered bounds. Each source is tried in
//! order and the first one that answers wins; 1920x1080 is assumed when none
//! does.

use std::error::Error;
use std::process::Command;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenInfo {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

type DetectResult = Result<ScreenInfo, Box<dyn Error>>;

#[derive(Debug, Deserialize)]
struct HyprMonitor {
    width: u32,
    height: u32,
    #[serde(default)]
    focused: bool,
}

#[derive(Debug, Deserialize)]
struct SwayOutput {
    #[serde(default)]
    focused: bool,
    #[serde(default = "default_true")]
    active: bool,
    current_mode: Option<SwayMode>,
}

#[derive(Debug, Deserialize)]
struct SwayMode {
    width: u32,
    height: u32,
}

fn default_true() -> bool {
    true
}

impl ScreenInfo {
    fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    pub fn detect() -> Self {
        let result = Self::detect_linux().unwrap_or_else(|err| {
            tracing::warn!("Screen detection failed ({err}), assuming default resolution");
            Self::default()
        });

        tracing::info!("Detected screen resolution: {}x{}", result.width, result.height);
        result
    }

    fn detect_linux() -> DetectResult {
        let sources: [(&str, fn() -> DetectResult); 5] = [
            ("hyprctl", Self::detect_hyprland),
            ("swaymsg", Self::detect_sway),
            ("wlr-randr", Self::detect_wlr_randr),
            ("xrandr", Self::detect_xrandr),
            ("sysfs", Self::detect_from_sysfs),
        ];

        for (name, detect) in sources {
            match detect() {
                Ok(screen) => {
                    tracing::debug!("Using {name} for screen detection");
                    return Ok(screen);
                }
                Err(err) => tracing::debug!("{name} screen detection unavailable: {err}"),
            }
        }

        Err("Could not detect screen resolution".into())
    }

    fn command_stdout(program: &str, args: &[&str]) -> Result<String, Box<dyn Error>> {
        let output = Command::new(program).args(args).output()?;
        if !output.status.success() {
            return Err(format!("{program} exited with {}", output.status).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn detect_hyprland() -> DetectResult {
        let output = Self::command_stdout("hyprctl", &["monitors", "-j"])?;
        Self::parse_hyprctl_output(&output).ok_or_else(|| "no usable Hyprland monitor".into())
    }

    fn detect_sway() -> DetectResult {
        let output = Self::command_stdout("swaymsg", &["-t", "get_outputs", "--raw"])?;
        Self::parse_swaymsg_output(&output).ok_or_else(|| "no usable Sway output".into())
    }

    fn detect_wlr_randr() -> DetectResult {
        let output = Self::command_stdout("wlr-randr", &[])?;
        Self::parse_wlr_randr_output(&output).ok_or_else(|| "no current wlr-randr mode".into())
    }

    fn detect_xrandr() -> DetectResult {
        let output = Self::command_stdout("xrandr", &["--current"])?;
        Self::parse_xrandr_primary(&output)
            .or_else(|| Self::parse_xrandr_any_connected(&output))
            .ok_or_else(|| "no connected xrandr screen".into())
    }

    /// Focused monitor, else the first one listed.
    fn parse_hyprctl_output(output: &str) -> Option<ScreenInfo> {
        let monitors: Vec<HyprMonitor> = serde_json::from_str(output).ok()?;
        let monitor = monitors
            .iter()
            .find(|m| m.focused)
            .or_else(|| monitors.first())?;
        Self::new(monitor.width, monitor.height)
    }

    /// Focused output, else the first active one.
    fn parse_swaymsg_output(output: &str) -> Option<ScreenInfo> {
        let outputs: Vec<SwayOutput> = serde_json::from_str(output).ok()?;
        let output = outputs
            .iter()
            .find(|o| o.focused && o.current_mode.is_some())
            .or_else(|| outputs.iter().find(|o| o.active && o.current_mode.is_some()))?;
        let mode = output.current_mode.as_ref()?;
        Self::new(mode.width, mode.height)
    }

    fn parse_resolution(text: &str) -> Option<ScreenInfo> {
        let (width, height) = text.split_once('x')?;
        Self::new(width.trim().parse().ok()?, height.trim().parse().ok()?)
    }

    fn parse_wlr_randr_output(output: &str) -> Option<ScreenInfo> {
        // "  1920x1080 px, 59.996002 Hz (current)"
        output
            .lines()
            .filter(|line| line.contains("current"))
            .find_map(|line| Self::parse_resolution(line.split_whitespace().next()?))
    }

    /// Resolution from an xrandr geometry token such as `1920x1080+0+0`.
    fn parse_xrandr_line(line: &str) -> Option<ScreenInfo> {
        line.split_whitespace()
            .filter(|part| part.contains('x') && part.contains('+'))
            .find_map(|part| Self::parse_resolution(part.split_once('+')?.0))
    }

    fn parse_xrandr_primary(output: &str) -> Option<ScreenInfo> {
        output
            .lines()
            .filter(|line| line.contains(" connected") && line.contains("primary"))
            .find_map(Self::parse_xrandr_line)
    }

    fn parse_xrandr_any_connected(output: &str) -> Option<ScreenInfo> {
        output
            .lines()
            .filter(|line| line.contains(" connected"))
            .find_map(Self::parse_xrandr_line)
    }

    fn detect_from_sysfs() -> DetectResult {
        use std::fs;

        let entries = fs::read_dir("/sys/class/drm")?;
        for entry in entries.flatten() {
            let path = entry.path();
            let is_connector = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with("card") && name.contains('-'));
            if !is_connector {
                continue;
            }

            if let Ok(modes) = fs::read_to_string(path.join("modes")) {
                if let Some(resolution) = Self::parse_drm_modes(&modes) {
                    return Ok(resolution);
                }
            }
        }

        Err("Could not detect from sysfs".into())
    }

    /// First (preferred) mode of a DRM connector.
    fn parse_drm_modes(content: &str) -> Option<ScreenInfo> {
        content.lines().find_map(|line| Self::parse_resolution(line.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyprctl_prefers_focused_monitor() {
        let json = r#"[
            {"id": 0, "name": "DP-1", "width": 2560, "height": 1440, "focused": false},
            {"id": 1, "name": "HDMI-A-1", "width": 1920, "height": 1080, "focused": true}
        ]"#;
        assert_eq!(
            ScreenInfo::parse_hyprctl_output(json),
            Some(ScreenInfo::new(1920, 1080).unwrap())
        );
    }

    #[test]
    fn test_hyprctl_falls_back_to_first_monitor() {
        let json = r#"[{"width": 3840, "height": 2160}]"#;
        assert_eq!(
            ScreenInfo::parse_hyprctl_output(json),
            Some(ScreenInfo::new(3840, 2160).unwrap())
        );
        assert_eq!(ScreenInfo::parse_hyprctl_output("not json"), None);
        assert_eq!(ScreenInfo::parse_hyprctl_output("[]"), None);
    }

    #[test]
    fn test_swaymsg_outputs() {
        let json = r#"[
            {"name": "eDP-1", "active": false, "focused": false, "current_mode": null},
            {"name": "DP-2", "active": true, "focused": false,
             "current_mode": {"width": 2560, "height": 1440, "refresh": 144000}},
            {"name": "DP-3", "active": true, "focused": true,
             "current_mode": {"width": 1280, "height": 1024, "refresh": 60000}}
        ]"#;
        assert_eq!(
            ScreenInfo::parse_swaymsg_output(json),
            Some(ScreenInfo::new(1280, 1024).unwrap())
        );
    }

    #[test]
    fn test_wlr_randr_current_mode() {
        let output = "DP-1 \"Dell\"\n  Modes:\n    2560x1440 px, 59.951000 Hz (preferred)\n    1920x1080 px, 60.000000 Hz (current)\n";
        assert_eq!(
            ScreenInfo::parse_wlr_randr_output(output),
            Some(ScreenInfo::new(1920, 1080).unwrap())
        );
    }

    #[test]
    fn test_xrandr_primary_then_connected() {
        let output = "Screen 0: minimum 320 x 200, current 3840 x 1080, maximum 16384 x 16384\n\
                      HDMI-1 connected 1920x1080+1920+0 (normal left inverted right) 527mm x 296mm\n\
                      DP-1 connected primary 1680x1050+0+0 (normal left inverted right) 474mm x 296mm\n\
                      VGA-1 disconnected (normal left inverted right x axis y axis)\n";
        assert_eq!(
            ScreenInfo::parse_xrandr_primary(output),
            Some(ScreenInfo::new(1680, 1050).unwrap())
        );

        let no_primary = output.replace(" primary", "");
        assert_eq!(
            ScreenInfo::parse_xrandr_any_connected(&no_primary),
            Some(ScreenInfo::new(1920, 1080).unwrap())
        );
    }

    #[test]
    fn test_drm_modes_first_line() {
        assert_eq!(
            ScreenInfo::parse_drm_modes("2560x1440\n1920x1080\n"),
            Some(ScreenInfo::new(2560, 1440).unwrap())
        );
        assert_eq!(ScreenInfo::parse_drm_modes(""), None);
    }

    #[test]
    fn test_zero_resolution_rejected() {
        assert_eq!(ScreenInfo::parse_resolution("0x1080"), None);
    }
}
