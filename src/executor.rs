//! executor.rs - Runs blocking package-manager commands on background worker threads.
//!
//! This module provides the types and a function to spawn a pool of threads
//! that listen for `ActionRequest`s, execute the requested shell command
//! (which is blocking), and send the `ActionResponse` back to the controlling
//! thread. The controlling thread never blocks on a command itself; it only
//! reads completed results. Workers share a single request receiver, so
//! requests for different packages can run concurrently while the per-package
//! busy flag (enforced upstream) keeps one package's actions serialized.

use crate::shell::{CommandOutput, CommandRunner};
use crate::state::PackageAction;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tracing::{debug, error};

/// Unique identifier for each action request/response pair.
pub type RequestId = u64;

/// A request to execute one package action's shell command.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub id: RequestId,
    pub package: String,
    pub action: PackageAction,
    pub command: String,
}

/// The completion of one package action.
///
/// `result` is `Err` only when the command failed to start; a command that
/// ran and exited non-zero is `Ok` with `success: false`. Both count as an
/// action failure upstream.
#[derive(Debug)]
pub struct ActionResponse {
    pub id: RequestId,
    pub package: String,
    pub action: PackageAction,
    pub result: Result<CommandOutput, String>,
}

impl ActionResponse {
    /// True iff the command ran to completion and exited 0.
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(output) if output.success)
    }
}

/// Spawn `count` worker threads (at least one) that execute action requests.
///
/// Workers run until the request sender is dropped or the response receiver
/// goes away. Returned handles are held by the owner so the pool lives as
/// long as the controller does.
pub fn spawn_workers(
    count: usize,
    runner: Arc<dyn CommandRunner>,
    request_rx: Receiver<ActionRequest>,
    response_tx: Sender<ActionResponse>,
) -> Vec<JoinHandle<()>> {
    let request_rx = Arc::new(Mutex::new(request_rx));

    (0..count.max(1))
        .map(|worker| {
            let request_rx = Arc::clone(&request_rx);
            let response_tx = response_tx.clone();
            let runner = Arc::clone(&runner);

            std::thread::spawn(move || {
                debug!(worker, "action worker started");
                loop {
                    // Hold the lock only while receiving, never while running
                    let request = {
                        let rx = request_rx.lock().expect("request receiver mutex poisoned");
                        rx.recv()
                    };
                    let Ok(request) = request else {
                        break;
                    };

                    debug!(
                        worker,
                        id = request.id,
                        package = %request.package,
                        action = %request.action,
                        "executing action request"
                    );

                    let result = runner
                        .run(&request.command)
                        .map_err(|err| err.to_string());

                    let response = ActionResponse {
                        id: request.id,
                        package: request.package,
                        action: request.action,
                        result,
                    };
                    if response_tx.send(response).is_err() {
                        error!(worker, "failed to send action response, receiver dropped");
                        break;
                    }
                }
                debug!(worker, "action worker shut down");
            })
        })
        .collect()
}
