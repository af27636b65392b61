//! Shelf controller
//!
//! `Shelf` is the single owner of every package's mutable state. It probes
//! install status at load, validates and dispatches actions to the worker
//! pool, applies completions, and emits notifications on the injected
//! channel. The presentation layer only ever reads from it.
//!
//! # Ordering Rule
//!
//! The busy flag is set in `request`, strictly before the command is handed
//! to the executor, and cleared only in `apply` once the completion has been
//! observed. A second click during the in-flight window is therefore
//! rejected up front instead of racing the running command.

use crate::catalog::PackageDescriptor;
use crate::error::{Result, ShelfError};
use crate::executor::{self, ActionRequest, ActionResponse, RequestId};
use crate::notify::{Notification, NotificationSender};
use crate::shell::CommandRunner;
use crate::state::{InstallState, PackageAction, PackageState};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// One catalog entry plus its live state.
#[derive(Debug)]
pub struct ShelfEntry {
    descriptor: PackageDescriptor,
    state: PackageState,
}

impl ShelfEntry {
    fn probed(descriptor: PackageDescriptor, runner: &dyn CommandRunner) -> Self {
        let state = probe_descriptor(&descriptor, runner);
        Self {
            descriptor,
            state: PackageState::new(state),
        }
    }

    pub fn descriptor(&self) -> &PackageDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn state(&self) -> &PackageState {
        &self.state
    }

    /// Whether the descriptor carries a command for `action` at all.
    /// Distinct from being enabled: a package without an update command
    /// never offers update, regardless of state.
    pub fn supports(&self, action: PackageAction) -> bool {
        self.command_for(action).is_some()
    }

    fn command_for(&self, action: PackageAction) -> Option<&str> {
        match action {
            PackageAction::Install => Some(&self.descriptor.install_command),
            PackageAction::Remove => Some(&self.descriptor.remove_command),
            PackageAction::Update => self.descriptor.update_command.as_deref(),
        }
    }
}

/// The applied result of one finished action.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub id: RequestId,
    pub package: String,
    pub action: PackageAction,
    pub success: bool,
    pub exit_code: Option<i32>,
    /// Install state after the completion was applied.
    pub state: InstallState,
}

/// Probe one descriptor's install status.
///
/// A probe that cannot run at all is treated exactly like one that reported
/// "not installed"; only the log line tells the two causes apart.
fn probe_descriptor(descriptor: &PackageDescriptor, runner: &dyn CommandRunner) -> InstallState {
    match runner.run(&descriptor.check_command) {
        Ok(output) => {
            let state = InstallState::from_probe(&output);
            debug!(package = %descriptor.name, %state, "probe completed");
            state
        }
        Err(err) => {
            debug!(
                package = %descriptor.name,
                error = %err,
                "probe failed to run, treating as not installed"
            );
            InstallState::NotInstalled
        }
    }
}

/// Controller for the whole catalog.
pub struct Shelf {
    entries: Vec<ShelfEntry>,
    runner: Arc<dyn CommandRunner>,
    request_tx: Sender<ActionRequest>,
    response_rx: Receiver<ActionResponse>,
    notify_tx: NotificationSender,
    next_request: RequestId,
    workers: Vec<JoinHandle<()>>,
}

impl Shelf {
    /// Build a shelf from a loaded catalog: probe every package, then spawn
    /// the worker pool that will run its actions.
    pub fn new(
        catalog: Vec<PackageDescriptor>,
        runner: Arc<dyn CommandRunner>,
        notify_tx: NotificationSender,
        worker_count: usize,
    ) -> Self {
        let (request_tx, request_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();
        let workers =
            executor::spawn_workers(worker_count, Arc::clone(&runner), request_rx, response_tx);

        let entries: Vec<ShelfEntry> = catalog
            .into_iter()
            .map(|descriptor| ShelfEntry::probed(descriptor, runner.as_ref()))
            .collect();

        info!(
            packages = entries.len(),
            workers = workers.len(),
            "shelf ready"
        );

        Self {
            entries,
            runner,
            request_tx,
            response_rx,
            notify_tx,
            next_request: 1,
            workers,
        }
    }

    pub fn entries(&self) -> &[ShelfEntry] {
        &self.entries
    }

    /// First entry with the given name. Names are a de-facto key: the
    /// source enforces no uniqueness, so duplicates resolve to the first.
    pub fn entry(&self, name: &str) -> Option<&ShelfEntry> {
        self.entries.iter().find(|entry| entry.name() == name)
    }

    /// Entries matching a search query, order preserved; empty query
    /// returns everything.
    pub fn filter(&self, query: &str) -> Vec<&ShelfEntry> {
        if query.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|entry| entry.descriptor.matches(query))
            .collect()
    }

    /// Re-run the check command for one package. Read-only: the cached
    /// state is updated by completed actions and reloads, never by probes.
    pub fn probe(&self, name: &str) -> Result<InstallState> {
        let entry = self
            .entry(name)
            .ok_or_else(|| ShelfError::UnknownPackage(name.to_string()))?;
        Ok(probe_descriptor(&entry.descriptor, self.runner.as_ref()))
    }

    /// True when no action is in flight on any package.
    pub fn is_idle(&self) -> bool {
        self.entries.iter().all(|entry| !entry.state.is_busy())
    }

    /// Validate and dispatch an action.
    ///
    /// On success the package is busy until the matching completion is
    /// applied via [`drain_completions`](Self::drain_completions) or
    /// [`wait_for`](Self::wait_for).
    ///
    /// # Errors
    ///
    /// - `UnknownPackage` if `name` is not on the shelf
    /// - `ActionUnavailable` if the descriptor has no command for `action`
    /// - `Action` if the state machine refuses (wrong state, or busy)
    /// - `Executor` if the worker pool is gone
    pub fn request(&mut self, name: &str, action: PackageAction) -> Result<RequestId> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.name() == name)
            .ok_or_else(|| ShelfError::UnknownPackage(name.to_string()))?;

        let command = self.entries[index]
            .command_for(action)
            .ok_or_else(|| ShelfError::unavailable(action.to_string(), name))?
            .to_string();

        // Busy goes up before the command leaves this thread
        self.entries[index].state.begin(action)?;

        let id = self.next_request;
        self.next_request += 1;

        let request = ActionRequest {
            id,
            package: name.to_string(),
            action,
            command,
        };
        if self.request_tx.send(request).is_err() {
            // Nothing was dispatched; clear the busy flag again
            self.entries[index].state.finish(action, false);
            return Err(ShelfError::executor("worker pool is gone"));
        }

        debug!(id, package = name, action = %action, "action dispatched");
        Ok(id)
    }

    /// Apply every completion that has already arrived, without blocking.
    pub fn drain_completions(&mut self) -> Vec<ActionOutcome> {
        let mut outcomes = Vec::new();
        loop {
            match self.response_rx.try_recv() {
                Ok(response) => outcomes.push(self.apply(response)),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        outcomes
    }

    /// Block until the given request (obtained from [`request`](Self::request))
    /// has completed, applying every completion observed on the way.
    pub fn wait_for(&mut self, id: RequestId) -> Result<ActionOutcome> {
        loop {
            let response = self
                .response_rx
                .recv()
                .map_err(|_| ShelfError::executor("worker pool disconnected"))?;
            let outcome = self.apply(response);
            if outcome.id == id {
                return Ok(outcome);
            }
        }
    }

    /// Explicit refresh: replace the catalog and re-probe everything.
    ///
    /// # Errors
    ///
    /// `ReloadBusy` while any action is in flight: a completion for a
    /// package that left the shelf would have nowhere to land.
    pub fn reload(&mut self, catalog: Vec<PackageDescriptor>) -> Result<()> {
        if !self.is_idle() {
            return Err(ShelfError::ReloadBusy);
        }
        self.entries = catalog
            .into_iter()
            .map(|descriptor| ShelfEntry::probed(descriptor, self.runner.as_ref()))
            .collect();
        info!(packages = self.entries.len(), "catalog reloaded");
        Ok(())
    }

    /// Stop accepting work and join the worker pool.
    pub fn shutdown(self) {
        let Self {
            request_tx, workers, ..
        } = self;
        drop(request_tx);
        for handle in workers {
            let _ = handle.join();
        }
    }

    fn apply(&mut self, response: ActionResponse) -> ActionOutcome {
        let success = response.succeeded();
        let exit_code = response.result.as_ref().ok().and_then(|o| o.exit_code);

        if let Err(err) = &response.result {
            warn!(
                package = %response.package,
                action = %response.action,
                error = %err,
                "action command failed to start"
            );
        }

        let state = match self
            .entries
            .iter_mut()
            .find(|entry| entry.descriptor.name == response.package)
        {
            Some(entry) => entry.state.finish(response.action, success),
            None => {
                // reload() refuses while busy, so this cannot happen through
                // the public API; tolerate it rather than poison the loop
                warn!(package = %response.package, "completion for a package not on the shelf");
                InstallState::NotInstalled
            }
        };

        if success {
            info!(package = %response.package, action = %response.action, "action succeeded");
        } else {
            warn!(
                package = %response.package,
                action = %response.action,
                exit_code = ?exit_code,
                "action failed, state unchanged"
            );
        }

        let notification = if success {
            Notification::success(&response.package, response.action)
        } else {
            Notification::failure(&response.package, response.action)
        };
        // A dropped receiver means the presentation layer is gone; the
        // outcome has already been applied, so that is not an error here
        let _ = self.notify_tx.send(notification);

        ActionOutcome {
            id: response.id,
            package: response.package,
            action: response.action,
            success,
            exit_code,
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::CommandOutput;
    use anyhow::anyhow;

    /// Runner that refuses to run anything, as if the shell were missing.
    struct BrokenRunner;

    impl CommandRunner for BrokenRunner {
        fn run(&self, _command: &str) -> anyhow::Result<CommandOutput> {
            Err(anyhow!("no shell available"))
        }
    }

    fn descriptor(name: &str) -> PackageDescriptor {
        PackageDescriptor {
            name: name.to_string(),
            description: String::new(),
            icon: String::new(),
            install_command: "install".to_string(),
            remove_command: "remove".to_string(),
            update_command: None,
            check_command: "check".to_string(),
        }
    }

    fn shelf_with_broken_runner() -> Shelf {
        let (notify_tx, _notify_rx) = mpsc::channel();
        Shelf::new(
            vec![descriptor("GIMP")],
            Arc::new(BrokenRunner),
            notify_tx,
            1,
        )
    }

    #[test]
    fn test_probe_failure_reads_as_not_installed() {
        let shelf = shelf_with_broken_runner();
        let entry = shelf.entry("GIMP").unwrap();
        assert_eq!(entry.state().install_state(), InstallState::NotInstalled);
        assert_eq!(shelf.probe("GIMP").unwrap(), InstallState::NotInstalled);
    }

    #[test]
    fn test_unknown_package_is_rejected() {
        let mut shelf = shelf_with_broken_runner();
        let err = shelf.request("Inkscape", PackageAction::Install).unwrap_err();
        assert!(matches!(err, ShelfError::UnknownPackage(_)));
        assert!(shelf.probe("Inkscape").is_err());
    }

    #[test]
    fn test_update_without_command_is_unavailable() {
        let mut shelf = shelf_with_broken_runner();
        // No update_command on the descriptor; state checks must not even run
        let err = shelf.request("GIMP", PackageAction::Update).unwrap_err();
        assert!(matches!(err, ShelfError::ActionUnavailable { .. }));
        assert!(shelf.is_idle());
    }

    #[test]
    fn test_reload_refused_while_busy() {
        let (notify_tx, _notify_rx) = mpsc::channel();
        let mut shelf = Shelf::new(
            vec![descriptor("GIMP")],
            Arc::new(BlockedProbeRunner),
            notify_tx,
            1,
        );
        shelf.request("GIMP", PackageAction::Install).unwrap();
        let err = shelf.reload(vec![descriptor("VLC")]).unwrap_err();
        assert!(matches!(err, ShelfError::ReloadBusy));
    }

    /// Probe says not installed; actions hang forever (never polled here).
    struct BlockedProbeRunner;

    impl CommandRunner for BlockedProbeRunner {
        fn run(&self, command: &str) -> anyhow::Result<CommandOutput> {
            if command != "check" {
                loop {
                    std::thread::park();
                }
            }
            Ok(CommandOutput {
                stdout: String::new(),
                stderr: String::new(),
                exit_code: Some(1),
                success: false,
            })
        }
    }
}
