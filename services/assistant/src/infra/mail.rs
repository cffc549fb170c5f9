use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::collaborators::{CollaboratorError, Mailer, OutgoingEmail};

const IMPLICIT_TLS_PORT: u16 = 465;
const STARTTLS_PORT: u16 = 587;

/// SMTP delivery with account credentials from the environment.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    pub host: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_name: String,
}

impl SmtpMailer {
    fn message(&self, sender: &str, email: &OutgoingEmail) -> Result<Message, CollaboratorError> {
        let from = Mailbox::new(
            Some(self.from_name.clone()),
            sender.parse().map_err(CollaboratorError::failed)?,
        );
        let to: Mailbox = email.to.parse().map_err(CollaboratorError::failed)?;
        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text_body.clone(),
                email.html_body.clone(),
            ))
            .map_err(CollaboratorError::failed)
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), CollaboratorError> {
        let (Some(username), Some(password)) = (&self.username, &self.password) else {
            return Err(CollaboratorError::Unavailable("smtp credentials"));
        };
        let message = self.message(username, email)?;
        let credentials = Credentials::new(username.clone(), password.clone());

        let implicit_tls = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .map_err(CollaboratorError::failed)?
            .port(IMPLICIT_TLS_PORT)
            .credentials(credentials.clone())
            .build();
        let first_error = match implicit_tls.send(message.clone()).await {
            Ok(_) => return Ok(()),
            Err(e) => e,
        };
        tracing::warn!(host = %self.host, error = %first_error, "implicit TLS delivery failed, retrying with STARTTLS");

        let starttls = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(CollaboratorError::failed)?
            .port(STARTTLS_PORT)
            .credentials(credentials)
            .build();
        starttls
            .send(message)
            .await
            .map(|_| ())
            .map_err(CollaboratorError::failed)
    }
}
