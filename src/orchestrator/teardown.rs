//! Release of measurement resources in reverse acquisition order.

use std::path::PathBuf;

use log::{info, warn};

use crate::error_handling::{CommandError, ProcessingStats, WarningType};

use super::docker::DockerCli;

/// One release step, registered right after its resource was acquired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Release {
    RemoveNetwork(String),
    StopContainer(String),
    StopAndRemoveContainer(String),
    RemoveContainer(String),
    /// Copy a packet capture out of a container before it goes away.
    CopyCapture {
        container: String,
        source: String,
        destination: PathBuf,
    },
}

/// Stack of pending release steps.
#[derive(Debug, Default)]
pub struct Teardown {
    steps: Vec<Release>,
}

impl Teardown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: Release) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every registered step once, newest first.
    ///
    /// Failures are logged and counted; they never stop later steps.
    /// Returns the number of failed commands.
    pub async fn release_all(&mut self, docker: &DockerCli<'_>, stats: &ProcessingStats) -> usize {
        let mut failures = 0;
        while let Some(step) = self.steps.pop() {
            for result in run_step(docker, &step).await {
                if let Err(e) = result {
                    warn!("Teardown step {:?} failed: {}", step, e);
                    stats.increment_warning(WarningType::TeardownStepFailed);
                    failures += 1;
                }
            }
        }
        failures
    }
}

async fn run_step(docker: &DockerCli<'_>, step: &Release) -> Vec<Result<(), CommandError>> {
    match step {
        Release::RemoveNetwork(network) => {
            info!("remove network: {network}");
            vec![docker.remove_network(network).await]
        }
        Release::StopContainer(container) => {
            info!("stop container: {container}");
            vec![docker.stop_container(container).await]
        }
        Release::StopAndRemoveContainer(container) => {
            info!("stop and remove container: {container}");
            let stopped = docker.stop_container(container).await;
            let removed = docker.remove_container(container).await;
            vec![stopped, removed]
        }
        Release::RemoveContainer(container) => {
            info!("remove container: {container}");
            vec![docker.remove_container(container).await]
        }
        Release::CopyCapture {
            container,
            source,
            destination,
        } => {
            info!("copy capture: {}", destination.display());
            vec![docker.copy_from(container, source, destination).await]
        }
    }
}
