//! Builds the running application from a loaded [`Config`].

use alertstat_common::{AlertStatError, LoggingConfig};
use alertstat_config::{Config, TransportKind};
use alertstat_graphs::{PlottersBarRenderer, ReportAssembler};
use alertstat_i18n::Messages;
use alertstat_telegram::{
    BotApi, BotApiDelivery, BotApiRelay, Delivery, ExportFileSource, Forwarder, KeywordFilter, OutboxDelivery, User,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::BotResult;
use crate::job::ReportRunner;

/// Identity recorded by `--auth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// The bot account behind the token.
    pub bot: User,
    /// When the credentials were checked.
    pub authorized_at: DateTime<Utc>,
}

/// Everything the process runs.
#[derive(Debug)]
pub struct App {
    /// Report pipeline shared by all report jobs.
    pub runner: Arc<ReportRunner>,
    /// Live keyword forwarding, when configured.
    pub forwarder: Option<Forwarder>,
}

impl App {
    /// Wires sources, transports and the report pipeline.
    pub fn build(config: &Config) -> BotResult<Self> {
        let api = bot_api(config)?;

        let delivery: Arc<dyn Delivery> = match (&api, config.transport()) {
            (Some(api), TransportKind::BotApi) => Arc::new(BotApiDelivery::new(api.clone(), config.telegram.silent)),
            _ => Arc::new(OutboxDelivery::new(config.outbox_dir(), config.telegram.silent)),
        };

        let assembler = ReportAssembler::new(
            Arc::new(PlottersBarRenderer::new()),
            Messages::russian()?,
            config.report.data_dir.clone(),
        );
        let runner = ReportRunner::new(
            Arc::new(ExportFileSource::new(&config.telegram.history_path)),
            delivery.clone(),
            Arc::new(assembler),
            config.telegram.channel.clone(),
            config.report_destination().clone(),
            request_timeout(config),
        );

        let forwarder = match (config.forward_source(), &api) {
            (Some(source), Some(api)) => Some(Forwarder::new(
                api.clone(),
                Arc::new(BotApiRelay::new(api.clone(), config.telegram.silent)),
                source.clone(),
                config.forward_destination().clone(),
                KeywordFilter::new(&config.forwarding.keywords),
                config.forwarding.poll_timeout_seconds,
            )),
            _ => None,
        };

        info!(
            transport = delivery.name(),
            destination = %config.report_destination(),
            forwarding = forwarder.is_some(),
            "Application ready"
        );
        Ok(Self {
            runner: Arc::new(runner),
            forwarder,
        })
    }
}

/// Checks the bot token with `getMe` and records the identity in the session file.
pub async fn authorize(config: &Config) -> BotResult<SessionInfo> {
    let api = bot_api(config)?.ok_or_else(|| AlertStatError::config("--auth requires TG_BOT_TOKEN"))?;
    let bot = api.get_me().await?;
    let session = SessionInfo {
        bot,
        authorized_at: Utc::now(),
    };
    write_session(&config.session_file(), &session).await?;
    info!(
        bot_id = session.bot.id,
        username = session.bot.username.as_deref().unwrap_or(""),
        path = %config.session_file().display(),
        "Bot credentials verified"
    );
    Ok(session)
}

/// Writes `session` as pretty JSON, creating the parent directory.
pub async fn write_session(path: &Path, session: &SessionInfo) -> BotResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(session).map_err(AlertStatError::from)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Logging setup from the config file, with `level` overriding the configured filter.
pub fn logging_config(config: &Config, level: Option<&str>) -> LoggingConfig {
    LoggingConfig {
        level: level.unwrap_or(&config.logging.level).to_string(),
        json_format: config.logging.json,
        file_dir: config.logging.file_dir.clone(),
        ..LoggingConfig::default()
    }
}

fn bot_api(config: &Config) -> BotResult<Option<Arc<BotApi>>> {
    config
        .bot_token()
        .map(|token| BotApi::new(token, request_timeout(config)).map(Arc::new))
        .transpose()
        .map_err(Into::into)
}

fn request_timeout(config: &Config) -> Duration {
    Duration::from_secs(config.telegram.request_timeout_seconds)
}
