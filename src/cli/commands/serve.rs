//! Serve command - run the distribution server

use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::error::DistResult;
use crate::server;
use tracing::debug;

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> DistResult<()> {
    apply_overrides(&args, &mut config);
    debug!(
        install_script = %config.upstream.install_script_url,
        version = %config.upstream.version_url,
        releases = %config.upstream.release_base_url,
        "upstream sources"
    );
    server::serve(config).await
}

fn apply_overrides(args: &ServeArgs, config: &mut Config) {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
}
