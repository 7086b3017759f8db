use appointment_notify::{build_http_client, channels::AzureSmsChannel, config::load_config};
use clap::Parser;

#[derive(Parser)]
#[command(name = "sms-demo")]
#[command(about = "Send one SMS through Azure Communication Services")]
struct Cli {
    /// Recipient phone number
    #[arg(long)]
    to: String,
    /// Message text
    #[arg(long, default_value = "Hola, mundo 👋🏻 a través de SMS")]
    message: String,
    /// ACS connection string override
    #[arg(long, env = "NOTIFY_SMS_CONNECTION_STRING", hide_env_values = true)]
    connection_string: Option<String>,
    /// Sender phone number override
    #[arg(long, env = "NOTIFY_SMS_SENDER")]
    from: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = load_config();
    if cli.connection_string.is_some() {
        config.sms.connection_string = cli.connection_string;
    }
    if cli.from.is_some() {
        config.sms.sender_phone_number = cli.from;
    }

    let channel = AzureSmsChannel::from_config(build_http_client(&config)?, &config.sms)?;
    let result = channel.send_detailed(&cli.to, &cli.message).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
