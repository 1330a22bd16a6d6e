//! Web server command.

use console::style;

use crate::config::Settings;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind)?;

    println!(
        "{} Starting chatlens server at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!(
        "  strategy: {} | model: {} | ocr: {}",
        settings.strategy.tag(),
        settings.completion.model,
        settings.ocr.base_url
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "4005" -> 127.0.0.1:4005
/// - Just a host: "0.0.0.0" -> 0.0.0.0:4005
/// - Host and port: "0.0.0.0:4005" -> 0.0.0.0:4005
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    // Try parsing as just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    // Try parsing as host:port
    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }

    // Must be just a host, use default port
    Ok((bind.to_string(), 4005))
}
