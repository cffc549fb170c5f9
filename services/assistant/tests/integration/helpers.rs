use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::{Duration, Utc};

use vox_assistant::domain::collaborators::{
    BrowserOpener, Capabilities, CollaboratorError, Encyclopedia, Mailer, MediaPlayer,
    OutgoingEmail, SpeechOutput, SummaryLookup, Transcriber, TranscriptionError,
};
use vox_assistant::domain::repository::{
    HistoryRepository, RecoveryCodeRepository, UserRepository,
};
use vox_assistant::domain::types::{
    HistoryChanges, HistoryRecord, IdentityField, NewHistoryRecord, NewUser, RecoveryCode, User,
};
use vox_assistant::error::AssistantError;
use vox_assistant::usecase::command::CommandInterpreter;
use vox_auth_types::password::hash_password;
use vox_domain::command::Classification;
use vox_domain::id::{HistoryId, RecoveryCodeId, UserId};

pub const TEST_PASSWORD: &str = "secreto123";

pub fn test_user(id: i64, handle: &str) -> User {
    User {
        id: UserId(id),
        full_name: format!("Usuario {handle}"),
        handle: handle.to_owned(),
        email: format!("{handle}@example.com"),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        active: true,
        created_at: Utc::now(),
    }
}

pub fn recovery_code(user_id: UserId, code: &str, expires_in_secs: i64, used: bool) -> RecoveryCode {
    let now = Utc::now();
    RecoveryCode {
        id: RecoveryCodeId::new(),
        user_id,
        code: code.to_owned(),
        expires_at: now + Duration::seconds(expires_in_secs),
        used_at: used.then_some(now),
        created_at: now,
    }
}

pub fn history_record(id: i64, user_id: i64, utterance: &str, response: &str) -> HistoryRecord {
    HistoryRecord {
        id: HistoryId(id),
        user_id: UserId(user_id),
        utterance: utterance.to_owned(),
        classification: Classification::Unrecognized,
        response: response.to_owned(),
        created_at: Utc::now() + Duration::seconds(id),
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    /// Existence checks report nothing, as if a concurrent registration
    /// committed right after them.
    pub stale_checks: bool,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            stale_checks: false,
        }
    }

    pub fn with_stale_checks(users: Vec<User>) -> Self {
        Self {
            stale_checks: true,
            ..Self::new(users)
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns a shared handle to the internal user list for post-execution inspection.
    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AssistantError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_active_by_handle(&self, handle: &str) -> Result<Option<User>, AssistantError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.active && u.handle == handle)
            .cloned())
    }

    async fn find_active_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, AssistantError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.active && (u.handle == identifier || u.email == identifier))
            .cloned())
    }

    async fn handle_exists(&self, handle: &str) -> Result<bool, AssistantError> {
        if self.stale_checks {
            return Ok(false);
        }
        Ok(self.users.lock().unwrap().iter().any(|u| u.handle == handle))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AssistantError> {
        if self.stale_checks {
            return Ok(false);
        }
        Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn create(&self, user: &NewUser) -> Result<User, AssistantError> {
        let mut users = self.users.lock().unwrap();
        // Mirrors the unique constraints on handle and email.
        if users.iter().any(|u| u.handle == user.handle) {
            return Err(AssistantError::DuplicateIdentity(IdentityField::Handle));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(AssistantError::DuplicateIdentity(IdentityField::Email));
        }
        let id = users.iter().map(|u| u.id.0).max().unwrap_or(0) + 1;
        let created = User {
            id: UserId(id),
            full_name: user.full_name.clone(),
            handle: user.handle.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            active: true,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), AssistantError> {
        if let Some(user) = self.users.lock().unwrap().iter_mut().find(|u| u.id == id) {
            user.password_hash = password_hash.to_owned();
        }
        Ok(())
    }
}

// ── MockRecoveryCodeRepo ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockRecoveryCodeRepo {
    pub codes: Arc<Mutex<Vec<RecoveryCode>>>,
}

impl MockRecoveryCodeRepo {
    pub fn new(codes: Vec<RecoveryCode>) -> Self {
        Self {
            codes: Arc::new(Mutex::new(codes)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn codes_handle(&self) -> Arc<Mutex<Vec<RecoveryCode>>> {
        Arc::clone(&self.codes)
    }
}

impl RecoveryCodeRepository for MockRecoveryCodeRepo {
    async fn replace_active(&self, code: &RecoveryCode) -> Result<(), AssistantError> {
        let mut codes = self.codes.lock().unwrap();
        for existing in codes
            .iter_mut()
            .filter(|c| c.user_id == code.user_id && c.is_valid())
        {
            existing.used_at = Some(Utc::now());
        }
        codes.push(code.clone());
        Ok(())
    }

    async fn find_valid(
        &self,
        user_id: UserId,
        code: &str,
    ) -> Result<Option<RecoveryCode>, AssistantError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user_id == user_id && c.code == code && c.is_valid())
            .cloned())
    }

    async fn find_used(
        &self,
        user_id: UserId,
        code: &str,
    ) -> Result<Option<RecoveryCode>, AssistantError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user_id == user_id && c.code == code && c.is_used())
            .cloned())
    }

    async fn find_unexpired(
        &self,
        user_id: UserId,
        code: &str,
    ) -> Result<Option<RecoveryCode>, AssistantError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c.user_id == user_id && c.code == code && !c.is_expired())
            .cloned())
    }

    async fn mark_used(&self, code: &RecoveryCode) -> Result<(), AssistantError> {
        let mut codes = self.codes.lock().unwrap();
        if let Some(c) = codes.iter_mut().find(|c| c.id == code.id) {
            c.used_at = Some(Utc::now());
        }
        Ok(())
    }
}

// ── MockHistoryRepo ──────────────────────────────────────────────────────────

pub struct MockHistoryRepo {
    pub records: Arc<Mutex<Vec<HistoryRecord>>>,
    /// Every call fails with an internal error when set.
    pub broken: bool,
}

impl MockHistoryRepo {
    pub fn new(records: Vec<HistoryRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            broken: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::empty()
        }
    }

    pub fn records_handle(&self) -> Arc<Mutex<Vec<HistoryRecord>>> {
        Arc::clone(&self.records)
    }

    fn check(&self) -> Result<(), AssistantError> {
        if self.broken {
            Err(AssistantError::Internal(anyhow::anyhow!("database is down")))
        } else {
            Ok(())
        }
    }

    fn owned(&self, user_id: UserId) -> Vec<HistoryRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }
}

impl HistoryRepository for MockHistoryRepo {
    async fn list(&self, user_id: UserId) -> Result<Vec<HistoryRecord>, AssistantError> {
        self.check()?;
        let mut records = self.owned(user_id);
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn search(
        &self,
        user_id: UserId,
        term: &str,
    ) -> Result<Vec<HistoryRecord>, AssistantError> {
        let term = term.to_lowercase();
        Ok(self
            .list(user_id)
            .await?
            .into_iter()
            .filter(|r| {
                r.utterance.to_lowercase().contains(&term)
                    || r.response.to_lowercase().contains(&term)
            })
            .collect())
    }

    async fn get(
        &self,
        user_id: UserId,
        id: HistoryId,
    ) -> Result<Option<HistoryRecord>, AssistantError> {
        self.check()?;
        Ok(self.owned(user_id).into_iter().find(|r| r.id == id))
    }

    async fn create(&self, record: &NewHistoryRecord) -> Result<HistoryRecord, AssistantError> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        let id = records.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        let created = HistoryRecord {
            id: HistoryId(id),
            user_id: record.user_id,
            utterance: record.utterance.clone(),
            classification: record.classification,
            response: record.response.clone(),
            created_at: Utc::now(),
        };
        records.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        user_id: UserId,
        id: HistoryId,
        changes: &HistoryChanges,
    ) -> Result<Option<HistoryRecord>, AssistantError> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        let Some(record) = records
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
        else {
            return Ok(None);
        };
        if let Some(utterance) = &changes.utterance {
            record.utterance = utterance.clone();
        }
        if let Some(response) = &changes.response {
            record.response = response.clone();
        }
        Ok(Some(record.clone()))
    }

    async fn delete(&self, user_id: UserId, id: HistoryId) -> Result<bool, AssistantError> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(records.len() < before)
    }

    async fn list_for_report(
        &self,
        user_id: UserId,
    ) -> Result<Vec<HistoryRecord>, AssistantError> {
        let mut records = self.list(user_id).await?;
        records.reverse();
        Ok(records)
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn working() -> Self {
        Self {
            sent: Arc::new(Mutex::new(vec![])),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::working()
        }
    }

    pub fn sent_handle(&self) -> Arc<Mutex<Vec<OutgoingEmail>>> {
        Arc::clone(&self.sent)
    }
}

impl Mailer for MockMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::Failed("smtp connection refused".into()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

// ── Command collaborators ────────────────────────────────────────────────────

/// Records every call; fails every call when `fail` is set and panics on
/// every call when `panic` is set.
#[derive(Clone, Default)]
pub struct Recorder {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
    pub panic: bool,
}

impl Recorder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, value: &str) -> Result<(), CollaboratorError> {
        self.calls.lock().unwrap().push(value.to_owned());
        if self.panic {
            panic!("tts crashed");
        }
        if self.fail {
            Err(CollaboratorError::Failed("unavailable in test".into()))
        } else {
            Ok(())
        }
    }
}

impl SpeechOutput for Recorder {
    async fn speak(&self, text: &str) -> Result<(), CollaboratorError> {
        self.record(text)
    }
}

impl MediaPlayer for Recorder {
    async fn play(&self, query: &str) -> Result<(), CollaboratorError> {
        self.record(query)
    }
}

impl BrowserOpener for Recorder {
    async fn open(&self, url: &str) -> Result<(), CollaboratorError> {
        self.record(url)
    }
}

pub enum EncyclopediaReply {
    Found(SummaryLookup),
    Fail(&'static str),
    Panic,
}

pub struct MockEncyclopedia {
    pub reply: EncyclopediaReply,
}

impl Encyclopedia for MockEncyclopedia {
    async fn summary(
        &self,
        _query: &str,
        _sentences: usize,
    ) -> Result<SummaryLookup, CollaboratorError> {
        match &self.reply {
            EncyclopediaReply::Found(lookup) => Ok(lookup.clone()),
            EncyclopediaReply::Fail(reason) => Err(CollaboratorError::Failed((*reason).into())),
            EncyclopediaReply::Panic => panic!("boom"),
        }
    }
}

pub type TestInterpreter = CommandInterpreter<Recorder, Recorder, Recorder, MockEncyclopedia>;

/// Handles to the collaborators wired into a [`TestInterpreter`].
pub struct Probes {
    pub speech: Recorder,
    pub media: Recorder,
    pub browser: Recorder,
}

pub struct InterpreterBuilder {
    pub speech: Option<Recorder>,
    pub media: Option<Recorder>,
    pub browser: Option<Recorder>,
    pub encyclopedia: Option<MockEncyclopedia>,
    pub headless: bool,
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self {
            speech: Some(Recorder::default()),
            media: Some(Recorder::default()),
            browser: Some(Recorder::default()),
            encyclopedia: Some(MockEncyclopedia {
                reply: EncyclopediaReply::Found(SummaryLookup::NotFound),
            }),
            headless: false,
        }
    }
}

impl InterpreterBuilder {
    /// Server deployment: no speech, media or browser.
    pub fn headless() -> Self {
        Self {
            speech: None,
            media: None,
            browser: None,
            headless: true,
            ..Self::default()
        }
    }

    pub fn build(self) -> (TestInterpreter, Probes) {
        let probes = Probes {
            speech: self.speech.clone().unwrap_or_default(),
            media: self.media.clone().unwrap_or_default(),
            browser: self.browser.clone().unwrap_or_default(),
        };
        let interpreter = CommandInterpreter::new(Capabilities {
            speech: self.speech,
            media: self.media,
            browser: self.browser,
            encyclopedia: self.encyclopedia,
            headless: self.headless,
        });
        (interpreter, probes)
    }
}

// ── MockTranscriber ──────────────────────────────────────────────────────────

pub enum TranscriberReply {
    Text(&'static str),
    Silence,
    Fail(&'static str),
}

pub struct MockTranscriber {
    pub reply: TranscriberReply,
    pub seen: Arc<Mutex<Vec<(usize, String, String)>>>,
}

impl MockTranscriber {
    pub fn new(reply: TranscriberReply) -> Self {
        Self {
            reply,
            seen: Arc::new(Mutex::new(vec![])),
        }
    }
}

impl Transcriber for MockTranscriber {
    async fn transcribe(
        &self,
        audio: Bytes,
        content_type: &str,
        language: &str,
    ) -> Result<String, TranscriptionError> {
        self.seen
            .lock()
            .unwrap()
            .push((audio.len(), content_type.to_owned(), language.to_owned()));
        match self.reply {
            TranscriberReply::Text(text) => Ok(text.to_owned()),
            TranscriberReply::Silence => Err(TranscriptionError::NoSpeechDetected),
            TranscriberReply::Fail(reason) => Err(TranscriptionError::Failed(reason.to_owned())),
        }
    }
}
