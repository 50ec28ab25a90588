use lettre::{
    message::{header::ContentType, SinglePart},
    transport::smtp::{authentication::Credentials, PoolConfig},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::Config;

/// 周报邮件投递器，SMTP STARTTLS
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
    receivers: Vec<String>,
}

impl Mailer {
    /// 调用方必须先通过 Config::validate_mail
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let sender = config.email_sender.clone().unwrap_or_default();
        let password = config.email_password.clone().unwrap_or_default();

        let credentials = Credentials::new(sender.clone(), password);
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)?
            .port(config.smtp_port)
            .credentials(credentials)
            .pool_config(PoolConfig::new().max_size(4))
            .build();

        Ok(Self {
            transport,
            sender,
            receivers: config.email_receivers.clone(),
        })
    }

    /// 发送 HTML 周报，一封邮件带全部收件人
    pub async fn send_report(&self, subject: &str, html_body: &str) -> anyhow::Result<()> {
        let mut builder = Message::builder()
            .from(self.sender.parse()?)
            .subject(subject);

        for receiver in &self.receivers {
            builder = builder.to(receiver.parse()?);
        }

        let message = builder.singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html_body.to_string()),
        )?;

        self.transport.send(message).await?;
        tracing::info!("周报已发送至 {} 个收件人", self.receivers.len());
        Ok(())
    }
}

/// 周报邮件标题，带当天日期
pub fn report_subject(date: chrono::NaiveDate) -> String {
    format!("【评论雷达】电信运营商评论周报 {}", date.format("%Y-%m-%d"))
}
