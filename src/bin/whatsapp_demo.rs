use appointment_notify::{
    build_http_client,
    channels::UltramsgChannel,
    config::load_config,
};
use clap::Parser;

#[derive(Parser)]
#[command(name = "whatsapp-demo")]
#[command(about = "Send one WhatsApp message through the Ultramsg gateway")]
struct Cli {
    /// Recipient phone number
    #[arg(long)]
    to: String,
    /// Message text
    #[arg(long, default_value = "Hola, mundo 👋🏻 a través de WhatsApp")]
    message: String,
    /// Ultramsg instance id override
    #[arg(long, env = "NOTIFY_WHATSAPP_INSTANCE_ID")]
    instance_id: Option<String>,
    /// Ultramsg instance token override
    #[arg(long, env = "NOTIFY_WHATSAPP_TOKEN")]
    token: Option<String>,
    /// Gateway base URL override
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = load_config();
    if cli.instance_id.is_some() {
        config.whatsapp.instance_id = cli.instance_id;
    }
    if cli.token.is_some() {
        config.whatsapp.token = cli.token;
    }
    if let Some(base_url) = cli.base_url {
        config.whatsapp.base_url = base_url;
    }

    let channel = UltramsgChannel::from_config(build_http_client(&config)?, &config.whatsapp)?;
    let response = channel.send_raw(&cli.to, &cli.message).await?;

    println!("{}", response.body);
    if !response.is_delivered() {
        eprintln!("gateway answered with status {}", response.status);
    }
    Ok(())
}
