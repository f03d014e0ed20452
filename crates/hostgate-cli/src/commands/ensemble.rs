use std::path::Path;

use hostgate_ensemble::EnsembleConfig;
use tracing::info;

pub fn format_config(config: &EnsembleConfig) -> String {
    let auth = match config.credentials() {
        Some(creds) => format!("{} ({})", creds.user(), creds.scheme()),
        None => "none".to_string(),
    };

    let mut out = String::from("✓ Valid ensemble config\n");
    out.push_str(&format!("  Connect:    {}\n", config.connect_string()));
    out.push_str(&format!("  Timeout:    {:?}\n", config.session_timeout()));
    out.push_str(&format!("  In-process: {}\n", config.in_process()));
    out.push_str(&format!("  Auth:       {auth}\n"));
    out
}

pub fn ensemble(path: &str) -> anyhow::Result<()> {
    let config = EnsembleConfig::from_file(Path::new(path))?;
    info!(
        config = path,
        servers = config.servers().len(),
        "validated ensemble config"
    );

    print!("{}", format_config(&config));
    Ok(())
}
