//! SMTP delivery of rendered reports.

use ledger::LedgerError;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::{ServerError, pdf};

/// STARTTLS relay plus the fixed sender address. Cheap to clone; the
/// transport shares its connection pool.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(
        host: &str,
        port: u16,
        username: String,
        password: String,
        from: &str,
    ) -> Result<Mailer, ServerError> {
        let from = from
            .parse::<Mailbox>()
            .map_err(|err| ServerError::Mail(format!("invalid sender address: {err}")))?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|err| ServerError::Mail(err.to_string()))?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Mailer { transport, from })
    }

    /// Mails the rendered report as a PDF attachment.
    pub async fn send_report(
        &self,
        recipient: &str,
        user_name: &str,
        pdf_bytes: Vec<u8>,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<(), ServerError> {
        let recipient = recipient.parse::<Mailbox>().map_err(|err| {
            ServerError::Ledger(LedgerError::Validation(format!(
                "invalid recipient address: {err}"
            )))
        })?;

        let (subject, period) = match (month, year) {
            (Some(month), Some(year)) => (
                format!("Financial Report - {month:02}/{year}"),
                format!(" for {month:02}/{year}"),
            ),
            (None, Some(year)) => (
                format!("Financial Report - {year}"),
                format!(" for {year}"),
            ),
            _ => ("Financial Report".to_string(), String::new()),
        };
        let body = format!(
            "Hello {user_name},\n\nAttached is your financial report{period}.\n\nRegards,\nCentavo"
        );

        let content_type = ContentType::parse("application/pdf")
            .map_err(|err| ServerError::Mail(err.to_string()))?;
        let attachment =
            Attachment::new(pdf::report_filename(month, year)).body(pdf_bytes, content_type);

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body),
                    )
                    .singlepart(attachment),
            )
            .map_err(|err| ServerError::Mail(err.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|err| ServerError::Mail(err.to_string()))?;

        Ok(())
    }
}
