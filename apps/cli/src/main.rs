use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

use chatrelay_core_sdk::{
    config::RelayConfig,
    ingest::Inbound,
    relay,
    server::{self, AppState},
    telemetry,
};

/**
 * \brief CLI 程序入口：启动中继服务，或在终端直接发送一条消息。
 */
#[derive(Parser, Debug)]
#[command(name = "chatrelay", version, about = "Chat relay for OpenAI-compatible completion APIs")]
struct Cli {
    /** \brief 以 JSON 行格式输出日志 */
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /**
     * \brief 启动 HTTP 服务（/api/chat 与 /api/ping）。
     */
    Serve {
        /** \brief 覆盖 CHATRELAY_ADDR */
        #[arg(long)]
        addr: Option<String>,
    },

    /**
     * \brief 经由同一中继流程发送一条消息并打印回复。
     * \param role 角色标签，如 sprach_experte / disziplinar_experte / frei
     */
    Chat {
        #[arg(long)]
        message: String,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        temperature: Option<f64>,
        #[arg(long)]
        request_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init(cli.json_logs);

    let mut config = RelayConfig::from_env();

    match cli.command {
        Commands::Serve { addr } => {
            if let Some(addr) = addr {
                config.bind_addr = addr;
            }
            server::run(config).await.context("serve failed")?;
        }
        Commands::Chat {
            message,
            role,
            model,
            temperature,
            request_id,
        } => {
            let mut payload = Map::new();
            payload.insert("message".into(), json!(message));
            if let Some(role) = role {
                payload.insert("role".into(), json!(role));
            }
            if let Some(model) = model {
                payload.insert("model".into(), json!(model));
            }
            if let Some(t) = temperature {
                payload.insert("temperature".into(), json!(t));
            }
            if let Some(id) = request_id {
                payload.insert("requestId".into(), json!(id));
            }

            tracing::debug!(target: "cli.chat", fields = payload.len(), "sending message");
            let state = AppState::new(config);
            let inbound = Inbound::Json(Value::Object(payload));
            match relay::relay(&state.config, &state.client, inbound).await {
                Ok(reply) => {
                    println!("{}", reply.reply);
                    eprintln!(
                        "[requestId={} role={} model={} temperature={}]",
                        reply.request_id,
                        reply.role.as_str(),
                        reply.model,
                        reply.temperature
                    );
                }
                Err(failure) => {
                    eprintln!("{}", failure.body());
                    bail!("chat failed ({})", failure.error.status());
                }
            }
        }
    }

    Ok(())
}
