use anyhow::{bail, Context, Result};
use deskpilot_app::{build_session, repl, Config};
use deskpilot_interfaces::TerminalInterface;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        [] => {}
        ["config", "init", rest @ ..] => return config_init(rest.contains(&"--force")),
        ["config", "show"] => return config_show(),
        _ => bail!("Usage: deskpilot [config init [--force] | config show]"),
    }

    let config = Config::load()?;
    init_tracing(&config.log_level);
    if let Err(e) = config.validate() {
        eprintln!("❌ Invalid configuration: {}", e);
        eprintln!("💡 Tip: Run 'deskpilot config init --force' to start from defaults");
        return Err(e);
    }

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                       Deskpilot                                  ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!("Model: {} at {}", config.provider.model, config.provider.base_url);
    println!();

    let mut session = build_session(&config);
    let ui = TerminalInterface::new();
    repl::run(&mut session, &ui).await
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn config_init(force: bool) -> Result<()> {
    let path = Config::path();
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Config::default()
        .save_to(&path)
        .context("Failed to write default config")?;
    println!("✅ Wrote {}", path.display());
    Ok(())
}

fn config_show() -> Result<()> {
    let config = Config::load()?;
    print!("{}", config.to_yaml()?);
    if let Err(e) = config.validate() {
        eprintln!("⚠️  {}", e);
    }
    Ok(())
}
