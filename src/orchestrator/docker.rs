//! Docker CLI operations used by a measurement.

use std::path::Path;

use crate::config::{
    DOCKER_BIN, FIREFOX_HAR_IMAGE, LETSDANE_CERT_PATH, LETSDANE_IMAGE, LETSDANE_KEY_PATH,
    UNBOUND_WITHOUT_CACHE_IMAGE, UNBOUND_WITH_CACHE_IMAGE,
};
use crate::error_handling::CommandError;

use super::names::MeasurementNames;
use super::runner::{CommandRunner, Invocation};

/// Go template printing a container's address on every attached network.
const INSPECT_IP_FORMAT: &str = "{{range.NetworkSettings.Networks}}{{.IPAddress}}{{end}}";

/// Which browser-harness pass to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserPass {
    /// Warm the resolver cache; the container is removed on exit.
    FillCache,
    /// The measured visit; stdout carries the HAR log.
    Measure,
}

pub fn resolver_image(cache: bool) -> &'static str {
    if cache {
        UNBOUND_WITH_CACHE_IMAGE
    } else {
        UNBOUND_WITHOUT_CACHE_IMAGE
    }
}

/// Issues `docker` commands through a [`CommandRunner`].
pub struct DockerCli<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> DockerCli<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        DockerCli { runner }
    }

    fn invocation<I, S>(args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new(DOCKER_BIN, args)
    }

    async fn run(&self, args: Vec<String>) -> Result<Vec<u8>, CommandError> {
        self.runner.output(&Self::invocation(args)).await
    }

    pub async fn create_network(&self, network: &str) -> Result<(), CommandError> {
        self.run(vec!["network".into(), "create".into(), network.into()])
            .await
            .map(drop)
    }

    pub async fn remove_network(&self, network: &str) -> Result<(), CommandError> {
        self.run(vec!["network".into(), "rm".into(), network.into()])
            .await
            .map(drop)
    }

    /// Starts the DNS resolver in the background, removed when stopped.
    pub async fn run_resolver(
        &self,
        names: &MeasurementNames,
        cache: bool,
    ) -> Result<(), CommandError> {
        let args: [&str; 12] = [
            "run",
            "--rm",
            "--network",
            &names.network,
            "--name",
            &names.resolver,
            "-d",
            "-p",
            ":53/udp",
            "-p",
            ":53/tcp",
            resolver_image(cache),
        ];
        self.run(args.iter().map(|s| s.to_string()).collect())
            .await
            .map(drop)
    }

    /// Address of `container` on its network.
    pub async fn container_ip(&self, container: &str) -> Result<String, CommandError> {
        let stdout = self
            .run(vec![
                "inspect".into(),
                "-f".into(),
                INSPECT_IP_FORMAT.into(),
                container.into(),
            ])
            .await?;
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }

    /// Starts a DANE validating proxy named `container` that resolves via `resolver_ip`.
    pub async fn run_proxy(
        &self,
        network: &str,
        container: &str,
        resolver_ip: &str,
    ) -> Result<(), CommandError> {
        let args: [&str; 14] = [
            "run",
            "--network",
            network,
            "--name",
            container,
            "-d",
            LETSDANE_IMAGE,
            "-verbose",
            "-r",
            resolver_ip,
            "-cert",
            LETSDANE_CERT_PATH,
            "-key",
            LETSDANE_KEY_PATH,
        ];
        self.run(args.iter().map(|s| s.to_string()).collect())
            .await
            .map(drop)
    }

    /// Runs the browser harness against the measured site and returns its stdout.
    pub async fn run_browser(
        &self,
        names: &MeasurementNames,
        resolver_ip: &str,
        pass: BrowserPass,
    ) -> Result<Vec<u8>, CommandError> {
        let mut args: Vec<String> = vec!["run".into()];
        let (container, proxy) = match pass {
            BrowserPass::FillCache => {
                args.push("--rm".into());
                (names.fill_cache_browser(), names.fill_cache_proxy())
            }
            BrowserPass::Measure => (names.browser.clone(), names.proxy.clone()),
        };
        args.extend([
            "--network".into(),
            names.network.clone(),
            "--name".into(),
            container,
            FIREFOX_HAR_IMAGE.into(),
            names.website(),
        ]);
        if names.variant.dane() {
            args.extend(["-ph".into(), proxy, "--dane".into()]);
        } else {
            args.extend(["-ri".into(), resolver_ip.to_string()]);
        }
        if pass == BrowserPass::FillCache {
            args.push("--fill_cache_only".into());
        }
        self.run(args).await
    }

    /// Starts `tcpdump` inside `container`, writing to `capture_path`.
    pub async fn start_capture(
        &self,
        container: &str,
        capture_path: &str,
    ) -> Result<(), CommandError> {
        let invocation = Self::invocation([
            "exec",
            "-d",
            container,
            "tcpdump",
            "-i",
            "any",
            "-w",
            capture_path,
        ]);
        self.runner.spawn_detached(&invocation).await
    }

    pub async fn stop_container(&self, container: &str) -> Result<(), CommandError> {
        self.run(vec!["stop".into(), container.into()])
            .await
            .map(drop)
    }

    pub async fn remove_container(&self, container: &str) -> Result<(), CommandError> {
        self.run(vec!["rm".into(), container.into()]).await.map(drop)
    }

    /// Copies `source` out of `container` to `destination` on the host.
    pub async fn copy_from(
        &self,
        container: &str,
        source: &str,
        destination: &Path,
    ) -> Result<(), CommandError> {
        self.run(vec![
            "cp".into(),
            format!("{container}:{source}"),
            destination.display().to_string(),
        ])
        .await
        .map(drop)
    }
}
