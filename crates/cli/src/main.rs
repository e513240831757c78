//! dashpanel CLI - Command-line interface for the dashboard daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

use dashpanel_core::application::catalog;
use dashpanel_core::domain::{DashboardSnapshot, PollOutcome, RowSnapshot, WidgetSnapshot};
use dashpanel_core::port::ToolProbe;
use dashpanel_infra_system::PathToolProbe;

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9531";

#[derive(Parser)]
#[command(name = "dashpanel")]
#[command(about = "dashpanel dashboard CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, global = true, env = "DASHPANEL_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Print raw JSON results
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every widget with its current values
    Status,

    /// Show one widget
    Get {
        /// Widget name (e.g. volume)
        widget: String,
    },

    /// Press a widget button
    Press {
        /// Widget name (e.g. volume)
        widget: String,

        /// Action name (e.g. toggle_mute)
        action: String,
    },

    /// Show daemon statistics
    Stats,

    /// Check that the tools used by built-in widgets are installed (no daemon needed)
    Doctor {
        /// Shell the daemon runs snippets with
        #[arg(long, default_value = "bash")]
        shell: String,
    },
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
struct StatsResult {
    widgets: usize,
    polls: usize,
    poll_runs: u64,
    poll_failures: u64,
    dispatched: u64,
    dispatch_succeeded: u64,
    dispatch_failed: u64,
    uptime_seconds: i64,
}

#[derive(Deserialize, Tabled)]
struct DispatchResult {
    widget: String,
    action: String,
    dispatch_id: String,
}

#[derive(Tabled)]
struct FieldLine {
    label: String,
    value: String,
    source: String,
}

#[derive(Tabled)]
struct ToolLine {
    widget: String,
    tool: String,
    status: String,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn outcome_label(outcome: PollOutcome) -> String {
    match outcome {
        PollOutcome::Success => "live".green().to_string(),
        PollOutcome::Fallback => "fallback".yellow().to_string(),
        PollOutcome::Pending => "pending".dimmed().to_string(),
    }
}

/// Render one widget as a header, a table of bound values and its buttons
fn render_widget(widget: &WidgetSnapshot) -> String {
    let mut out = format!("{} {}\n", widget.icon, widget.title.cyan().bold());

    let mut fields = Vec::new();
    let mut texts = Vec::new();
    let mut buttons = Vec::new();

    for row in &widget.rows {
        match row {
            RowSnapshot::Text { text } => texts.push(text.clone()),
            RowSnapshot::Field {
                label,
                poll,
                value,
                outcome,
            } => fields.push(FieldLine {
                label: label.clone().unwrap_or_else(|| poll.clone()),
                value: value.clone(),
                source: outcome_label(*outcome),
            }),
            RowSnapshot::Button { label, action } => buttons.push(format!("[{}] {}", label, action)),
        }
    }

    for text in texts {
        out.push_str(&format!("  {}\n", text));
    }
    if !fields.is_empty() {
        out.push_str(&Table::new(fields).to_string());
        out.push('\n');
    }
    if !buttons.is_empty() {
        out.push_str(&format!("  {} {}\n", "Actions:".bold(), buttons.join("  ")));
    }
    out
}

fn doctor(shell: &str) -> usize {
    let probe = PathToolProbe::from_env();
    let mut lines = Vec::new();
    let mut missing = 0;

    let mut check = |widget: &str, tool: &str| {
        let status = match probe.locate(tool) {
            Some(path) => path.display().to_string().green().to_string(),
            None => {
                missing += 1;
                "MISSING".red().to_string()
            }
        };
        lines.push(ToolLine {
            widget: widget.to_string(),
            tool: tool.to_string(),
            status,
        });
    };

    check("(shell)", shell);
    for name in catalog::builtin_names() {
        if let Some(widget) = catalog::builtin(name) {
            for tool in &widget.requires {
                check(name, tool);
            }
        }
    }

    println!("{}", Table::new(lines));
    missing
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let result = call_rpc(&cli.rpc_url, "dashboard.snapshot.v1", json!({})).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            let snapshot: DashboardSnapshot = serde_json::from_value(result)?;
            for widget in &snapshot.widgets {
                println!("{}", render_widget(widget));
            }
        }

        Commands::Get { widget } => {
            let result = call_rpc(&cli.rpc_url, "widget.get.v1", json!({ "widget": widget })).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            let widget: WidgetSnapshot = serde_json::from_value(result)?;
            println!("{}", render_widget(&widget));
        }

        Commands::Press { widget, action } => {
            let params = json!({
                "widget": widget,
                "action": action,
            });

            let result = call_rpc(&cli.rpc_url, "action.dispatch.v1", params).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            let dispatch: DispatchResult = serde_json::from_value(result)?;
            println!("{}", "✓ Action dispatched".green().bold());
            println!();
            println!("{}", Table::new(vec![dispatch]));
        }

        Commands::Stats => {
            println!("{}", "Daemon Status".cyan().bold());
            println!();

            match call_rpc(&cli.rpc_url, "admin.stats.v1", json!({})).await {
                Ok(stats) if cli.json => println!("{}", serde_json::to_string_pretty(&stats)?),
                Ok(stats) => {
                    let stats: StatsResult = serde_json::from_value(stats)?;
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();
                    println!("{}", Table::new(vec![stats]));
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }

        Commands::Doctor { shell } => {
            println!("{}", "Tool check".cyan().bold());
            println!();

            let missing = doctor(&shell);
            println!();
            if missing == 0 {
                println!("{}", "✓ All tools found".green().bold());
            } else {
                println!(
                    "{}",
                    format!(
                        "○ {} tool(s) missing; affected values will show their fallback",
                        missing
                    )
                    .yellow()
                );
            }
        }
    }

    Ok(())
}
