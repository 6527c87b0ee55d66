//! toolcall-bridge CLI: render prompts, extract tool calls, run tools
//!
//! Usage:
//!   toolcall-bridge-cli prompt [file]              Request JSON → upstream prompt
//!   toolcall-bridge-cli extract [file]             Model text → tool calls JSON
//!   toolcall-bridge-cli exec <name> <arguments>    Execute one tool call
//!   toolcall-bridge-cli normalize [file]           Tools JSON array → canonical tools
//!   toolcall-bridge-cli tools                      List registered tools

use std::io::Read;

use anyhow::{bail, Context};
use serde_json::Value;
use toolcall_bridge::tool_call::new_call_id;
use toolcall_bridge::{BridgeConfig, BridgeRequest, ToolBridge, ToolCall};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        command => run(command, &args[2..]).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: &str, args: &[String]) -> anyhow::Result<()> {
    let config = BridgeConfig::from_env().context("loading configuration")?;
    init_tracing(&config.log_filter);
    let bridge = ToolBridge::builder()
        .with_config(config)
        .advertise_registered_tools(true)
        .build()?;

    match command {
        "prompt" => cmd_prompt(&bridge, args).await,
        "extract" => cmd_extract(&bridge, args),
        "exec" => cmd_exec(&bridge, args).await,
        "normalize" => cmd_normalize(args),
        "tools" => cmd_tools(&bridge),
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"toolcall-bridge-cli: function calling to <tool_call> prompt bridge

USAGE:
    toolcall-bridge-cli <COMMAND> [OPTIONS]

COMMANDS:
    prompt [file]               Render a request body ({{messages, tools?, tool_results?}}) as a prompt
    extract [file]              Extract <tool_call> blocks from model text as JSON
    exec <name> <arguments>     Execute a tool with a JSON arguments string
    normalize [file]            Normalize a JSON array of MCP/OpenAI tools
    tools                       List registered tool definitions
    version                     Show version information
    help                        Show this help message

Input is read from stdin when [file] is omitted.

ENVIRONMENT:
    TOOLCALL_BRIDGE_CONFIG      Path of a YAML configuration file
    RUST_LOG                    Log filter (overrides log_filter from the config)"#
    );
}

fn cmd_version() {
    println!("toolcall-bridge-cli {}", env!("CARGO_PKG_VERSION"));
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_input(args: &[String]) -> anyhow::Result<String> {
    match args.first() {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path))
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

async fn cmd_prompt(bridge: &ToolBridge, args: &[String]) -> anyhow::Result<()> {
    let request = BridgeRequest::from_json(&read_input(args)?)?;
    let prepared = bridge.prepare(request).await;
    println!("{}", prepared.prompt);
    Ok(())
}

fn cmd_extract(bridge: &ToolBridge, args: &[String]) -> anyhow::Result<()> {
    let reply = bridge.parse_reply(&read_input(args)?);
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

async fn cmd_exec(bridge: &ToolBridge, args: &[String]) -> anyhow::Result<()> {
    let (Some(name), Some(arguments)) = (args.first(), args.get(1)) else {
        bail!("usage: exec <name> <arguments-json>");
    };
    let call = ToolCall::new(new_call_id(), name.as_str(), arguments.as_str());
    let result = bridge.executor().execute(&call).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    if result.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_normalize(args: &[String]) -> anyhow::Result<()> {
    let input: Value = serde_json::from_str(&read_input(args)?).context("parsing tools JSON")?;
    let Some(tools) = input.as_array() else {
        bail!("expected a JSON array of tool definitions");
    };
    let normalized = toolcall_bridge::mcp::normalize_tools(tools);
    println!("{}", serde_json::to_string_pretty(&normalized)?);
    Ok(())
}

fn cmd_tools(bridge: &ToolBridge) -> anyhow::Result<()> {
    for tool in bridge.executor().definitions() {
        println!("{:<14} {}", tool.name, tool.description);
    }
    Ok(())
}
