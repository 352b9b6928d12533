use anyhow::Result;
use clap::{Parser, Subcommand};
use futures::future::join_all;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::auth::Token;
use crate::config::Config;
use crate::controller::{Controller, LoggingJobsPuller};
use crate::output::{self, PullProgress};
use crate::providers::GitLabClient;
use crate::store::{MemoryStore, Store};

#[derive(Parser)]
#[command(name = "pipelines-exporter")]
#[command(author, version, about = "GitLab CI pipeline metrics exporter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every configured ref once and dump the resulting metrics
    Pull {
        #[arg(short, long, env = "GITLAB_TOKEN")]
        token: Option<String>,

        /// Overrides `gitlab.url` from the configuration file
        #[arg(short, long)]
        url: Option<String>,
    },
}

impl Cli {
    async fn execute_pull(&self, token: Option<&str>, url: Option<&str>) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        let url = url.map_or_else(|| config.gitlab.url.clone(), ToString::to_string);
        let token = token
            .map(Token::from)
            .or_else(|| config.gitlab.token.as_deref().map(Token::from));

        let refs = config.refs();
        if refs.is_empty() {
            warn!("No refs configured, nothing to pull");
        }
        info!("Pulling metrics for {} refs from {url}", refs.len());

        let store = Arc::new(MemoryStore::new());
        for ref_ in &refs {
            store.set_ref(ref_.clone()).await?;
        }

        let controller = Controller::new(
            store.clone(),
            Arc::new(GitLabClient::new(&url, token)?),
            Arc::new(LoggingJobsPuller),
        );

        let cancel = CancellationToken::new();
        let signal = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling in-flight pulls");
                    cancel.cancel();
                }
            }
        });

        let progress = PullProgress::start(refs.len());
        let results = join_all(refs.iter().map(|ref_| {
            let controller = &controller;
            let cancel = &cancel;
            let progress = &progress;
            async move {
                let result = controller.pull_ref_metrics(cancel, ref_.clone()).await;
                progress.ref_done();
                (ref_, result)
            }
        }))
        .await;
        progress.finish();
        signal.abort();

        let mut failures = 0;
        for (ref_, result) in results {
            if let Err(err) = result {
                failures += 1;
                error!(
                    "Pulling ref metrics failed (project={}, ref={}, ref-kind={}): {err}",
                    ref_.project.name, ref_.name, ref_.kind
                );
            }
        }

        let metrics = store.metrics().await?;
        let mut reconciled = Vec::with_capacity(refs.len());
        for ref_ in &refs {
            reconciled.push(store.get_ref(&ref_.key()).await?.unwrap_or_else(|| ref_.clone()));
        }
        output::print_summary(&reconciled, &metrics)?;

        let json_output = if self.pretty {
            serde_json::to_string_pretty(&metrics)?
        } else {
            serde_json::to_string(&metrics)?
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, json_output)?;
            info!("Metrics written to: {}", output_path.display());
        } else {
            println!("{json_output}");
        }

        if failures > 0 {
            anyhow::bail!("{failures} of {} refs failed to pull", refs.len());
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Pull { token, url } => {
                self.execute_pull(token.as_deref(), url.as_deref()).await
            }
        }
    }
}
