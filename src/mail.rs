use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::Utc;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport as _};
use tracing::info;

use crate::config::MailConfig;

fn content_id(chart: &Path) -> String {
    chart.file_stem().unwrap_or_default().to_string_lossy().into_owned()
}

/// Builds the digest message: an HTML body linking the dashboard, with the
/// given chart files embedded as inline images. Construction is separate
/// from sending so it can be exercised without an SMTP session.
pub fn build_digest(config: &MailConfig, charts: &[PathBuf]) -> anyhow::Result<Message> {
    let today = Utc::now();
    let subject =
        format!("friDay shopping app events' summary: {}", today.format("%Y/%-m/%-d"));

    let mut images_html = String::new();
    for chart in charts {
        images_html +=
            &format!("<img src=\"cid:{}\" width=\"800\"><br>\n", content_id(chart));
    }
    let html = format!(
        "<html>\n<body>\n\
         <p>Hi All</p>\n\
         <p>friDay shopping app's purchase event summary as below</p>\n\
         <p>For more events' summary, click <a href='{}'>here</a></p>\n\
         <br>\n{}\
         </body>\n</html>",
        config.dashboard_url, images_html,
    );

    let mut body = MultiPart::related()
        .singlepart(SinglePart::builder().header(ContentType::TEXT_HTML).body(html));
    for chart in charts {
        let image = std::fs::read(chart)
            .with_context(|| format!("error reading chart file {}", chart.display()))?;
        body = body.singlepart(
            Attachment::new_inline(content_id(chart))
                .body(image, ContentType::parse("image/png")?),
        );
    }

    let mut message = Message::builder()
        .from(config.sender.parse().context("invalid sender address")?)
        .subject(subject);
    for recipient in &config.recipients {
        message = message
            .to(recipient.parse().with_context(|| format!("invalid recipient {recipient}"))?);
    }
    Ok(message.multipart(body)?)
}

/// Sends the digest over an implicit-TLS SMTP session.
pub fn send_digest(config: &MailConfig, password: &str, message: &Message) -> anyhow::Result<()> {
    let mailer = SmtpTransport::relay(&config.smtp_host)?
        .port(config.smtp_port)
        .credentials(Credentials::new(config.sender.clone(), password.to_owned()))
        .build();
    mailer.send(message).context("error sending digest")?;
    info!("digest sent to {} recipient(s)", config.recipients.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn digest_embeds_each_chart_inline() {
        let dir = tempfile::tempdir().unwrap();
        let chart_path = dir.path().join("daily_purchase_chart.png");
        std::fs::File::create(&chart_path).unwrap().write_all(b"not really a png").unwrap();

        let config = MailConfig::default();
        let message = build_digest(&config, &[chart_path]).unwrap();
        let formatted = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(formatted.contains("cid:daily_purchase_chart"));
        assert!(formatted.contains("daily_purchase_chart"));
        assert!(formatted.contains("friDay shopping app"));
    }

    #[test]
    fn every_configured_recipient_is_addressed() {
        let config = MailConfig {
            recipients: vec!["a@example.com".to_owned(), "b@example.com".to_owned()],
            ..MailConfig::default()
        };
        let message = build_digest(&config, &[]).unwrap();
        let formatted = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(formatted.contains("a@example.com"));
        assert!(formatted.contains("b@example.com"));
    }

    #[test]
    fn missing_chart_file_is_an_error() {
        let config = MailConfig::default();
        let result = build_digest(&config, &[PathBuf::from("/nonexistent/chart.png")]);
        assert!(result.is_err());
    }
}
