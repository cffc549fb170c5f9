//! Adapters that act on the host desktop: browser, media and speech.

use std::process::Stdio;

use tokio::process::Command;

use crate::domain::collaborators::{BrowserOpener, CollaboratorError, MediaPlayer, SpeechOutput};
use crate::usecase::command::youtube_search_url;

async fn run(program: &str, args: &[&str]) -> Result<(), CollaboratorError> {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| CollaboratorError::Failed(format!("{program}: {e}")))?;
    if status.success() {
        Ok(())
    } else {
        Err(CollaboratorError::Failed(format!("{program} exited with {status}")))
    }
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl BrowserOpener for SystemBrowser {
    async fn open(&self, url: &str) -> Result<(), CollaboratorError> {
        if cfg!(target_os = "windows") {
            run("cmd", &["/C", "start", "", url]).await
        } else if cfg!(target_os = "macos") {
            run("open", &[url]).await
        } else {
            run("xdg-open", &[url]).await
        }
    }
}

/// Speaks through an external TTS program that takes the text as its last
/// argument (`espeak-ng` by default).
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    pub program: String,
    pub args: Vec<String>,
}

impl SpeechOutput for CommandSpeech {
    async fn speak(&self, text: &str) -> Result<(), CollaboratorError> {
        let mut args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        args.push(text);
        run(&self.program, &args).await
    }
}

const VIDEO_ID_MARKER: &str = "\"videoId\":\"";
const VIDEO_ID_LEN: usize = 11;

/// First video id embedded in a YouTube results page.
pub fn first_video_id(html: &str) -> Option<&str> {
    let start = html.find(VIDEO_ID_MARKER)? + VIDEO_ID_MARKER.len();
    let id = html.get(start..start + VIDEO_ID_LEN)?;
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        .then_some(id)
}

/// Plays the top YouTube result for a query in the system browser.
#[derive(Debug, Clone)]
pub struct YoutubePlayer {
    pub client: reqwest::Client,
    pub browser: SystemBrowser,
}

impl MediaPlayer for YoutubePlayer {
    async fn play(&self, query: &str) -> Result<(), CollaboratorError> {
        let html = self
            .client
            .get(youtube_search_url(query))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(CollaboratorError::failed)?
            .text()
            .await
            .map_err(CollaboratorError::failed)?;
        let id = first_video_id(&html)
            .ok_or_else(|| CollaboratorError::Failed(format!("no video found for '{query}'")))?;
        self.browser
            .open(&format!("https://www.youtube.com/watch?v={id}"))
            .await
    }
}
