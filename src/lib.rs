//! softshelf library
//!
//! Core logic for a software-catalog manager: load an ordered catalog of
//! package descriptors, reconcile each package's install state through
//! shell probes, and run install/remove/update actions on a background
//! worker pool with outcomes delivered over channels. Presentation layers
//! subscribe to the notification channel and render from the shelf's
//! read-only views; nothing in here draws anything.

pub mod catalog;
pub mod cli;
pub mod controller;
pub mod error;
pub mod executor;
pub mod notify;
pub mod shell;
pub mod state;

// Re-export main types for convenience
pub use catalog::{PackageDescriptor, default_catalog, filter, load_catalog, read_catalog};
pub use controller::{ActionOutcome, Shelf, ShelfEntry};
pub use error::{Result, ShelfError};
pub use executor::{ActionRequest, ActionResponse, RequestId};
pub use notify::{Notification, NotificationSender, Severity};
pub use shell::{CommandOutput, CommandRunner, ShellRunner};
pub use state::{ActionError, InstallState, PackageAction, PackageState};
