use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use vox_auth_types::cookie::CookieSettings;
use vox_auth_types::identity::SessionSettings;
use vox_core::config::Config;
use vox_core::tracing::init_tracing;

use vox_assistant::config::AssistantConfig;
use vox_assistant::domain::collaborators::Capabilities;
use vox_assistant::infra::db::DbHistoryRepository;
use vox_assistant::infra::desktop::{CommandSpeech, SystemBrowser, YoutubePlayer};
use vox_assistant::infra::mail::SmtpMailer;
use vox_assistant::infra::transcription::WhisperTranscriber;
use vox_assistant::infra::wikipedia::WikipediaClient;
use vox_assistant::queue::{CommandQueue, InterpretAndRecord, QueueConfig};
use vox_assistant::router::build_router;
use vox_assistant::state::{AppInterpreter, AppState, AssistantSettings};
use vox_assistant::usecase::command::CommandInterpreter;

const USER_AGENT: &str = concat!("vox-assistant/", env!("CARGO_PKG_VERSION"));

fn capabilities(
    config: &AssistantConfig,
    http: &reqwest::Client,
) -> Capabilities<CommandSpeech, YoutubePlayer, SystemBrowser, WikipediaClient> {
    let desktop = !config.headless;
    Capabilities {
        speech: desktop.then(|| CommandSpeech {
            program: config.speech_command.clone(),
            args: config.speech_args(),
        }),
        media: desktop.then(|| YoutubePlayer {
            client: http.clone(),
            browser: SystemBrowser,
        }),
        browser: desktop.then_some(SystemBrowser),
        encyclopedia: config.encyclopedia_enabled.then(|| WikipediaClient {
            client: http.clone(),
            language: config.wikipedia_language.clone(),
        }),
        headless: config.headless,
    }
}

#[tokio::main]
async fn main() {
    let config = AssistantConfig::from_env();
    init_tracing(config.log_format, "info,sqlx=warn");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .expect("failed to build HTTP client");

    let interpreter: Arc<AppInterpreter> =
        Arc::new(CommandInterpreter::new(capabilities(&config, &http)));
    info!(headless = config.headless, "command interpreter ready");

    let queue = CommandQueue::start(
        Arc::new(InterpretAndRecord {
            history: DbHistoryRepository { db: db.clone() },
            interpreter: Arc::clone(&interpreter),
        }),
        QueueConfig {
            workers: config.command_workers,
            capacity: config.command_queue_size,
        },
    );

    let state = AppState {
        db,
        session: SessionSettings {
            secret: Arc::from(config.session_secret.as_str()),
            cookie: CookieSettings {
                domain: config.cookie_domain.clone(),
                secure: config.secure_cookies,
            },
        },
        interpreter,
        queue,
        mailer: SmtpMailer {
            host: config.smtp_host.clone(),
            username: config.smtp_username.clone(),
            password: config.smtp_password.clone(),
            from_name: config.mail_from_name.clone(),
        },
        transcriber: WhisperTranscriber {
            client: http,
            endpoint: config.transcription_url.clone(),
            api_key: config.transcription_api_key.clone(),
            model: config.transcription_model.clone(),
        },
        settings: AssistantSettings {
            transcription_language: config.transcription_language.clone(),
            expose_recovery_code_on_delivery_failure: config
                .expose_recovery_code_on_delivery_failure,
            allow_used_code_on_password_change: config.allow_used_code_on_password_change,
        },
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("assistant service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
