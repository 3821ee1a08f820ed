//! Host-side preview helper: builds the wasm bundle into `static/pkg`, serves
//! the site over HTTP and, on request, exposes it through an ngrok tunnel.

#[cfg(not(target_arch = "wasm32"))]
mod preview {
    use std::path::PathBuf;
    use std::process::{Child, Command, Stdio};
    use std::{thread, time::Duration};

    use anyhow::{bail, Context, Result};
    use clap::Parser;

    #[derive(Parser)]
    #[command(name = "preview", about = "Build and serve the landing page locally")]
    struct Args {
        /// Port for the local HTTP server.
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        /// Directory to serve.
        #[arg(long, default_value = "static")]
        dir: PathBuf,

        /// Serve whatever is already built.
        #[arg(long)]
        skip_build: bool,

        /// Expose the server through ngrok.
        #[arg(long)]
        tunnel: bool,
    }

    pub fn run() -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "preview=info".into()),
            )
            .init();

        let args = Args::parse();
        if !args.dir.is_dir() {
            bail!("{} is not a directory", args.dir.display());
        }

        if args.skip_build {
            tracing::info!("skipping wasm build");
        } else {
            build_bundle()?;
        }

        let mut server = serve(&args)?;
        tracing::info!(port = args.port, dir = %args.dir.display(), "serving at http://127.0.0.1:{}", args.port);

        let _tunnel = if args.tunnel { open_tunnel(args.port) } else { None };

        loop {
            if let Some(status) = server.try_wait().context("polling http server")? {
                bail!("http server exited with {status}");
            }
            thread::sleep(Duration::from_secs(1));
        }
    }

    fn build_bundle() -> Result<()> {
        tracing::info!("building wasm bundle");
        let status = Command::new("wasm-pack")
            .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
            .status()
            .context("running wasm-pack (install from https://rustwasm.github.io/wasm-pack/)")?;
        if !status.success() {
            bail!("wasm-pack failed with {status}");
        }
        Ok(())
    }

    fn serve(args: &Args) -> Result<Child> {
        Command::new("python3")
            .arg("-m")
            .arg("http.server")
            .arg(args.port.to_string())
            .arg("--directory")
            .arg(&args.dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("starting python3 http.server")
    }

    fn open_tunnel(port: u16) -> Option<Child> {
        match Command::new("ngrok")
            .args(["http", &port.to_string()])
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
        {
            Ok(child) => {
                tracing::info!("ngrok tunnel starting");
                Some(child)
            }
            Err(err) => {
                tracing::warn!(error = %err, "ngrok not available; serving locally only");
                None
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    preview::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
