use std::any::Any;
use std::panic::AssertUnwindSafe;

use chrono::Local;
use futures::FutureExt;
use url::form_urlencoded::byte_serialize;

use vox_domain::command::{Classification, Interpretation};
use vox_domain::id::UserId;

use crate::domain::collaborators::{
    BrowserOpener, Capabilities, Encyclopedia, MediaPlayer, SpeechOutput, SummaryLookup,
};
use crate::domain::repository::HistoryRepository;
use crate::domain::types::{MAX_DISAMBIGUATION_OPTIONS, NewHistoryRecord, SUMMARY_SENTENCES};

// ── Classification ───────────────────────────────────────────────────────────

type Rule = (Classification, fn(&str) -> bool);

/// First match wins. The order is part of the contract: "reproduce ... dime"
/// must stay `PlayMedia`.
const RULES: &[Rule] = &[
    (Classification::PlayMedia, is_play_media),
    (Classification::SearchMedia, is_search_media),
    (Classification::TellTime, is_tell_time),
    (Classification::SearchWeb, is_search_web),
    (Classification::LookupSummary, is_lookup_summary),
    (Classification::ShowHelp, is_show_help),
];

fn is_play_media(text: &str) -> bool {
    text.contains("reproduce")
}

fn is_search_media(text: &str) -> bool {
    text.contains("busca en y") || text.contains("busca en youtube")
}

fn is_tell_time(text: &str) -> bool {
    text.contains("hora")
}

fn is_search_web(text: &str) -> bool {
    text.contains("busca en") && !text.contains("youtube")
}

fn is_lookup_summary(text: &str) -> bool {
    text.contains("dime")
}

fn is_show_help(text: &str) -> bool {
    text.contains("ayuda") || text.contains("qué puedes hacer")
}

/// Classify an already-lowercased transcript.
pub fn classify(text: &str) -> Classification {
    RULES
        .iter()
        .find(|(_, matches)| matches(text))
        .map(|(classification, _)| *classification)
        .unwrap_or(Classification::Unrecognized)
}

fn strip(text: &str, triggers: &[&str]) -> String {
    triggers
        .iter()
        .fold(text.to_owned(), |acc, trigger| acc.replace(trigger, ""))
        .trim()
        .to_owned()
}

/// Query text left after removing the trigger phrase(s) for `classification`.
pub fn extract_query(classification: Classification, text: &str) -> String {
    match classification {
        Classification::PlayMedia => strip(text, &["reproduce"]),
        Classification::SearchMedia if text.contains("busca en youtube") => {
            strip(text, &["busca en youtube"])
        }
        Classification::SearchMedia => strip(text, &["busca en y"]),
        Classification::SearchWeb => strip(text, &["busca en", "google"]),
        Classification::LookupSummary => strip(text, &["dime"]),
        _ => text.trim().to_owned(),
    }
}

fn encode(query: &str) -> String {
    byte_serialize(query.as_bytes()).collect()
}

pub fn youtube_search_url(query: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        encode(query)
    )
}

pub fn google_search_url(query: &str) -> String {
    format!("https://www.google.com/search?q={}", encode(query))
}

// ── Interpreter ──────────────────────────────────────────────────────────────

const HELP_TEXT: &str = "📋 Puedo ayudarte con:\n\
    • Reproducir música en YouTube\n\
    • Buscar en YouTube\n\
    • Decir la hora actual\n\
    • Buscar en Google\n\
    • Buscar información en Wikipedia\n";

const HEADLESS_NOTICE: &str = "\n⚠️  Modo web: algunas funciones se simularán\n";

const APOLOGY: &str = "Lo siento, hubo un error al procesar tu comando.";

/// Maps transcripts to actions and a spoken/displayed reply.
///
/// Never fails: collaborator errors degrade per branch and a panic inside a
/// branch becomes an error reply.
pub struct CommandInterpreter<S, M, B, E> {
    pub capabilities: Capabilities<S, M, B, E>,
}

impl<S, M, B, E> CommandInterpreter<S, M, B, E>
where
    S: SpeechOutput,
    M: MediaPlayer,
    B: BrowserOpener,
    E: Encyclopedia,
{
    pub fn new(capabilities: Capabilities<S, M, B, E>) -> Self {
        Self { capabilities }
    }

    pub async fn interpret(&self, transcript: &str) -> Interpretation {
        let text = transcript.to_lowercase();
        let classification = classify(&text);
        tracing::debug!(classification = %classification, "classified command");

        let outcome = AssertUnwindSafe(self.respond(classification, &text))
            .catch_unwind()
            .await;
        let response = match outcome {
            Ok(response) => response,
            Err(panic) => {
                let detail = panic_detail(panic.as_ref());
                tracing::error!(classification = %classification, detail = %detail, "command handler panicked");
                self.apologize().await;
                format!("❌ Error ejecutando comando: {detail}")
            }
        };
        Interpretation {
            classification,
            response,
        }
    }

    async fn respond(&self, classification: Classification, text: &str) -> String {
        let query = extract_query(classification, text);
        match classification {
            Classification::PlayMedia => self.play_media(&query).await,
            Classification::SearchMedia => self.search_media(&query).await,
            Classification::TellTime => self.tell_time().await,
            Classification::SearchWeb => self.search_web(&query).await,
            Classification::LookupSummary => self.lookup_summary(&query).await,
            Classification::ShowHelp => self.show_help().await,
            Classification::Unrecognized => self.unrecognized(text).await,
        }
    }

    async fn play_media(&self, query: &str) -> String {
        let mut response = format!("Reproduciendo {query}");
        let played = match &self.capabilities.media {
            Some(media) => match media.play(query).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "media playback failed, falling back to browser");
                    false
                }
            },
            None => false,
        };
        if played {
            self.say(&response).await;
        } else {
            response.push_str(" (modo web - abre manualmente YouTube)");
            self.say(&response).await;
            self.open_url(&youtube_search_url(query)).await;
        }
        response
    }

    async fn search_media(&self, query: &str) -> String {
        let mut response = format!("Buscando en YouTube: {query}");
        self.say(&response).await;
        let url = youtube_search_url(query);
        if self.open_url(&url).await {
            response.push_str(". Resultados abiertos en navegador.");
        } else {
            response.push_str(&format!(" | URL: {url}"));
        }
        response
    }

    async fn tell_time(&self) -> String {
        let response = format!("La hora actual es: {}", Local::now().format("%H:%M"));
        self.say(&response).await;
        response
    }

    async fn search_web(&self, query: &str) -> String {
        let mut response = format!("Buscando en Google: {query}");
        self.say(&response).await;
        let url = google_search_url(query);
        if self.open_url(&url).await {
            self.say("Aquí tienes los resultados en tu navegador.").await;
            response.push_str(". Resultados abiertos en navegador.");
        } else {
            response.push_str(&format!(" | URL: {url}"));
        }
        response
    }

    async fn lookup_summary(&self, query: &str) -> String {
        self.say(&format!("Buscando información sobre: {query}"))
            .await;

        let Some(encyclopedia) = &self.capabilities.encyclopedia else {
            let response = format!("Wikipedia no disponible. Busca '{query}' en Google.");
            self.say(&response).await;
            self.open_url(&google_search_url(query)).await;
            return response;
        };

        let response = match encyclopedia.summary(query, SUMMARY_SENTENCES).await {
            Ok(SummaryLookup::Summary(summary)) => format!("Según Wikipedia: {summary}"),
            Ok(SummaryLookup::Disambiguation(options)) => {
                let options: Vec<&str> = options
                    .iter()
                    .take(MAX_DISAMBIGUATION_OPTIONS)
                    .map(String::as_str)
                    .collect();
                format!(
                    "Hay varios resultados para '{query}'. Opciones: {}",
                    options.join(", ")
                )
            }
            Ok(SummaryLookup::NotFound) => {
                format!("No encontré información sobre '{query}' en Wikipedia.")
            }
            Err(e) => {
                tracing::warn!(error = %e, "encyclopedia lookup failed");
                format!("Error en Wikipedia: {e}")
            }
        };
        self.say(&response).await;
        response
    }

    async fn show_help(&self) -> String {
        let mut response = HELP_TEXT.to_owned();
        if self.capabilities.headless {
            response.push_str(HEADLESS_NOTICE);
        }
        self.say("Te muestro lo que puedo hacer en pantalla.").await;
        response
    }

    async fn unrecognized(&self, text: &str) -> String {
        let response =
            format!("No entendí: '{text}'. ¿Puedes reformular? Di 'ayuda' para ver opciones.");
        self.say(&response).await;
        response
    }

    /// Speak `text`, or log it when speech is unavailable or fails.
    async fn say(&self, text: &str) {
        match &self.capabilities.speech {
            Some(speech) => {
                if let Err(e) = speech.speak(text).await {
                    tracing::warn!(error = %e, text, "speech output failed");
                }
            }
            None => tracing::info!(text, "assistant reply"),
        }
    }

    /// Speech may be what panicked, so the apology gets its own guard.
    async fn apologize(&self) {
        if let Err(panic) = AssertUnwindSafe(self.say(APOLOGY)).catch_unwind().await {
            let detail = panic_detail(panic.as_ref());
            tracing::error!(detail = %detail, "speech output panicked during apology");
        }
    }

    /// Returns `false` when the open was only simulated.
    async fn open_url(&self, url: &str) -> bool {
        let Some(browser) = &self.capabilities.browser else {
            tracing::info!(url, "no browser available, simulating open");
            return false;
        };
        match browser.open(url).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, url, "browser open failed, simulating");
                false
            }
        }
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "error desconocido".to_owned()
    }
}

// ── RunCommand ───────────────────────────────────────────────────────────────

/// Interprets a transcript for a user and logs the exchange to history.
pub struct RunCommandUseCase<'a, H, S, M, B, E>
where
    H: HistoryRepository,
{
    pub history: H,
    pub interpreter: &'a CommandInterpreter<S, M, B, E>,
}

impl<H, S, M, B, E> RunCommandUseCase<'_, H, S, M, B, E>
where
    H: HistoryRepository,
    S: SpeechOutput,
    M: MediaPlayer,
    B: BrowserOpener,
    E: Encyclopedia,
{
    pub async fn execute(&self, user_id: UserId, transcript: &str) -> Interpretation {
        let interpretation = self.interpreter.interpret(transcript).await;

        let record = NewHistoryRecord {
            user_id,
            utterance: transcript.to_owned(),
            classification: interpretation.classification,
            response: interpretation.response.clone(),
        };
        // History is best-effort; the reply stands either way.
        if let Err(e) = self.history.create(&record).await {
            tracing::warn!(user_id = %user_id, error = %e, "failed to persist history record");
        }

        interpretation
    }
}
