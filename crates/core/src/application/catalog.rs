//! Built-in widget catalogue
//!
//! Poll snippets are written for strict mode: the runner prefixes
//! `set -euo pipefail`, so any failing step yields the poll's fallback. None
//! of them echo their own fallback. Pipelines avoid early-exiting readers
//! (`head`) so a producer is never killed by SIGPIPE under `pipefail`.

use crate::domain::{DashboardSpec, PollSpec, WidgetSpec};
use crate::error::{AppError, Result};

/// Widgets shown by the dashboard window, top to bottom
pub const DEFAULT_LAYOUT: &[&str] = &[
    "media",
    "volume",
    "brightness",
    "system",
    "network",
    "power",
];

const BUILTIN_NAMES: &[&str] = &[
    "media",
    "volume",
    "brightness",
    "system",
    "network",
    "power",
    "clock",
    "notifications",
];

pub fn builtin_names() -> &'static [&'static str] {
    BUILTIN_NAMES
}

/// Look up a built-in widget by name
pub fn builtin(name: &str) -> Option<WidgetSpec> {
    match name {
        "media" => Some(media()),
        "volume" => Some(volume()),
        "brightness" => Some(brightness()),
        "system" => Some(system()),
        "network" => Some(network()),
        "power" => Some(power()),
        "clock" => Some(clock()),
        "notifications" => Some(notifications()),
        _ => None,
    }
}

/// Build a dashboard from widget names
///
/// `custom` widgets shadow built-ins of the same name. An empty `names`
/// list selects [`DEFAULT_LAYOUT`].
pub fn compose(names: &[String], custom: &[WidgetSpec]) -> Result<DashboardSpec> {
    let names: Vec<&str> = if names.is_empty() {
        DEFAULT_LAYOUT.to_vec()
    } else {
        names.iter().map(String::as_str).collect()
    };

    let widgets = names
        .into_iter()
        .map(|name| {
            custom
                .iter()
                .find(|w| w.name == name)
                .cloned()
                .or_else(|| builtin(name))
                .ok_or_else(|| AppError::Config(format!("Unknown widget: {}", name)))
        })
        .collect::<Result<Vec<_>>>()?;

    let spec = DashboardSpec::new(widgets);
    spec.validate()?;
    Ok(spec)
}

fn media() -> WidgetSpec {
    WidgetSpec::new("media", "Media Player")
        .icon("🎵")
        .requires(&["playerctl"])
        .poll(
            "status",
            PollSpec::new("Not playing", 1000, "playerctl status 2>/dev/null"),
        )
        .poll(
            "title",
            PollSpec::new("No media", 1000, "playerctl metadata title 2>/dev/null"),
        )
        .poll(
            "artist",
            PollSpec::new("", 1000, "playerctl metadata artist 2>/dev/null"),
        )
        .poll(
            "album",
            PollSpec::new("", 2000, "playerctl metadata album 2>/dev/null"),
        )
        .poll("position", PollSpec::new("", 1000, MEDIA_POSITION))
        .action("previous", "playerctl previous")
        .action("play_pause", "playerctl play-pause")
        .action("next", "playerctl next")
        .value("title")
        .value("artist")
        .value("album")
        .value("status")
        .value("position")
        .button("⏮", "previous")
        .button("⏯", "play_pause")
        .button("⏭", "next")
}

const MEDIA_POSITION: &str = r#"POS=$(playerctl position 2>/dev/null | cut -d. -f1)
LEN=$(playerctl metadata mpris:length 2>/dev/null | awk '{ print int($1 / 1000000) }')
if [ -n "$POS" ] && [ -n "$LEN" ] && [ "$LEN" -gt 0 ]; then
  printf '%02d:%02d / %02d:%02d' $((POS / 60)) $((POS % 60)) $((LEN / 60)) $((LEN % 60))
fi"#;

fn volume() -> WidgetSpec {
    WidgetSpec::new("volume", "Volume")
        .icon("🔊")
        .requires(&["pactl"])
        .poll(
            "level",
            PollSpec::new(
                "0%",
                500,
                r#"pactl get-sink-volume @DEFAULT_SINK@ 2>/dev/null | grep -Po '\d+%' | sed -n 1p"#,
            ),
        )
        .poll("mute", PollSpec::new("🔊", 500, VOLUME_MUTE))
        .action("toggle_mute", "pactl set-sink-mute @DEFAULT_SINK@ toggle")
        .action("down", "pactl set-sink-volume @DEFAULT_SINK@ -5%")
        .action("up", "pactl set-sink-volume @DEFAULT_SINK@ +5%")
        .value("level")
        .bound_button("🔊", "toggle_mute", "mute")
        .button("−", "down")
        .button("+", "up")
}

const VOLUME_MUTE: &str = r#"MUTE=$(pactl get-sink-mute @DEFAULT_SINK@ 2>/dev/null | grep -o 'yes\|no')
if [ "$MUTE" = "yes" ]; then
  echo "🔇"
else
  echo "🔊"
fi"#;

fn brightness() -> WidgetSpec {
    WidgetSpec::new("brightness", "Brightness")
        .icon("💡")
        .requires(&["brightnessctl"])
        .poll(
            "level",
            PollSpec::new(
                "0%",
                1000,
                r#"brightnessctl get 2>/dev/null | awk -v max="$(brightnessctl max 2>/dev/null)" '{ printf "%d%%\n", $1 / max * 100 }'"#,
            ),
        )
        .action("down", "brightnessctl set 10%-")
        .action("up", "brightnessctl set +10%")
        .value("level")
        .button("−", "down")
        .button("+", "up")
}

fn system() -> WidgetSpec {
    WidgetSpec::new("system", "System Stats")
        .icon("📊")
        .requires(&["top", "free", "sensors", "nvidia-smi"])
        .poll(
            "cpu",
            PollSpec::new(
                "0%",
                2000,
                r#"top -bn1 2>/dev/null | grep 'Cpu(s)' | sed 's/.*, *\([0-9.]*\)%* id.*/\1/' | awk '{ print 100 - $1 "%" }'"#,
            ),
        )
        .poll(
            "memory",
            PollSpec::new(
                "0%",
                2000,
                r#"free 2>/dev/null | awk '/^Mem/ { printf "%.1f%%", $3 / $2 * 100.0 }'"#,
            ),
        )
        .poll(
            "gpu",
            PollSpec::new(
                "N/A",
                3000,
                r#"nvidia-smi --query-gpu=utilization.gpu --format=csv,noheader,nounits 2>/dev/null | awk 'NR == 1 { print $1 "%" }'"#,
            ),
        )
        .poll("temperature", PollSpec::new("0°C", 3000, SYSTEM_TEMPERATURE))
        .poll(
            "power",
            PollSpec::new(
                "N/A",
                5000,
                r#"cat /sys/class/power_supply/BAT*/power_now 2>/dev/null | awk '{ sum += $1 } END { printf "%.1fW", sum / 1000000 }'"#,
            ),
        )
        .field("CPU:", "cpu")
        .field("Memory:", "memory")
        .field("GPU:", "gpu")
        .field("Temperature:", "temperature")
        .field("Power:", "power")
}

// Package sensor first, first core as a fallback
const SYSTEM_TEMPERATURE: &str = r#"SENSORS=$(sensors 2>/dev/null)
TEMP=$(printf '%s\n' "$SENSORS" | awk '!found && tolower($0) ~ /package id 0:/ { print $4; found = 1 }')
if [ -z "$TEMP" ]; then
  TEMP=$(printf '%s\n' "$SENSORS" | awk '!found && tolower($0) ~ /core 0:/ { print $3; found = 1 }')
fi
[ -n "$TEMP" ]
echo "$TEMP""#;

fn network() -> WidgetSpec {
    WidgetSpec::new("network", "Network")
        .icon("🌐")
        .requires(&["nmcli", "ip"])
        .poll(
            "connection",
            PollSpec::new("Disconnected", 3000, NETWORK_CONNECTION),
        )
        .poll(
            "ip",
            PollSpec::new(
                "0.0.0.0",
                5000,
                r#"ip route get 1.1.1.1 2>/dev/null | grep -oP 'src \K\S+'"#,
            ),
        )
        .poll("speed", PollSpec::new("↓ 0 KB/s ↑ 0 KB/s", 3000, NETWORK_SPEED))
        .field("Connection:", "connection")
        .field("IP Address:", "ip")
        .field("Speed:", "speed")
}

const NETWORK_CONNECTION: &str = r#"CONNECTION=$(nmcli -t -f NAME connection show --active 2>/dev/null | sed -n 1p)
[ -n "$CONNECTION" ]
echo "$CONNECTION""#;

// Samples the default-route interface counters one second apart
const NETWORK_SPEED: &str = r#"INTERFACE=$(ip route 2>/dev/null | awk '/default/ && !found { print $5; found = 1 }')
STATS="/sys/class/net/$INTERFACE/statistics"
if [ -n "$INTERFACE" ] && [ -f "$STATS/rx_bytes" ]; then
  RX1=$(cat "$STATS/rx_bytes")
  TX1=$(cat "$STATS/tx_bytes")
  sleep 1
  RX2=$(cat "$STATS/rx_bytes")
  TX2=$(cat "$STATS/tx_bytes")
  echo "↓ $(( (RX2 - RX1) / 1024 )) KB/s ↑ $(( (TX2 - TX1) / 1024 )) KB/s"
else
  echo "↓ 0 KB/s ↑ 0 KB/s"
fi"#;

fn power() -> WidgetSpec {
    WidgetSpec::new("power", "Power Options")
        .icon("⚡")
        .requires(&["loginctl", "systemctl"])
        .action("lock", "loginctl lock-session")
        .action("logout", r#"loginctl terminate-user "$USER""#)
        .action("reboot", "systemctl reboot")
        .action("shutdown", "systemctl poweroff")
        .button("🔒 Lock", "lock")
        .button("👤 Logout", "logout")
        .button("🔄 Reboot", "reboot")
        .button("⚡ Shutdown", "shutdown")
}

fn clock() -> WidgetSpec {
    WidgetSpec::new("clock", "Time & Date")
        .icon("⏰")
        .requires(&["date"])
        .poll("time", PollSpec::new("00:00:00", 1000, "date '+%H:%M:%S'"))
        .poll("date", PollSpec::new("", 60000, "date '+%A, %B %d, %Y'"))
        .value("time")
        .value("date")
}

fn notifications() -> WidgetSpec {
    WidgetSpec::new("notifications", "Notifications")
        .icon("🔔")
        .poll(
            "history",
            PollSpec::new("No notifications", 3000, NOTIFICATION_HISTORY),
        )
        .action("clear", NOTIFICATION_CLEAR)
        .button("Clear", "clear")
        .value("history")
}

const NOTIFICATION_HISTORY: &str = r#"if command -v dunstctl >/dev/null 2>&1; then
  dunstctl history 2>/dev/null | sed -n '1,3s/^/• /p'
elif command -v makoctl >/dev/null 2>&1; then
  makoctl history 2>/dev/null | sed -n '1,3s/^/• /p'
elif [ -f "$HOME/.local/share/dunst/log" ]; then
  tail -n 3 "$HOME/.local/share/dunst/log" | sed 's/^/• /'
else
  echo 'No notification daemon found'
fi"#;

const NOTIFICATION_CLEAR: &str = r#"if command -v dunstctl >/dev/null 2>&1; then
  dunstctl close-all
elif command -v makoctl >/dev/null 2>&1; then
  makoctl dismiss -a
fi"#;
