use anyhow::Context;
use slotdesk_core::config::Config;
use std::path::Path;

pub fn run(root: &Path, port: Option<u16>, no_open: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    for warning in config.validate() {
        tracing::warn!("{}", warning.message);
    }
    let port = port.unwrap_or(config.server.port);
    let open_browser = config.server.open_browser && !no_open;

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("failed to bind port {port}"))?;
        slotdesk_server::serve_on(root_buf, listener, open_browser).await
    })
}
