//! Package State Machine
//!
//! The authoritative, per-package source of truth for install status.
//! It enforces valid action transitions and derives the enabled/disabled
//! flags the presentation layer renders from.
//!
//! # Design Principles
//!
//! - **Single Source of Truth**: each `PackageState` is owned by the shelf
//!   controller for the descriptor's lifetime
//! - **Validated Transitions**: `begin` refuses actions the current state
//!   does not allow; install status changes only in `finish`, on exit 0
//! - **Derived Flags**: enabled flags are computed from state + busy, never
//!   stored, so a failed action cannot leave them out of sync
//! - **Busy Is the Lock**: the busy flag is view-transient but also the
//!   per-package mutual exclusion for in-flight actions
//!
//! # State Flow
//!
//! ```text
//! NotInstalled --install(exit 0)--> Installed
//! Installed    --remove(exit 0)---> NotInstalled
//! Installed    --update(any)-----> Installed      (self-loop)
//!
//! (Any failed action leaves the state unchanged and clears busy)
//! ```

use crate::shell::CommandOutput;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

/// Install status of one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
pub enum InstallState {
    #[default]
    #[strum(serialize = "not installed")]
    NotInstalled,
    #[strum(serialize = "installed")]
    Installed,
}

impl InstallState {
    /// Interpret a probe result.
    ///
    /// Installed iff the check command exited 0 AND printed something.
    /// Everything else (non-zero exit, empty stdout, and, at the caller, a
    /// command that failed to start) reads as NotInstalled: the absence of
    /// a usable probe result is indistinguishable from "not installed".
    pub fn from_probe(output: &CommandOutput) -> Self {
        if output.has_output() {
            Self::Installed
        } else {
            Self::NotInstalled
        }
    }

    #[inline]
    pub const fn is_installed(self) -> bool {
        matches!(self, Self::Installed)
    }
}

/// The three mutually exclusive actions a package exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PackageAction {
    Install,
    Remove,
    Update,
}

impl PackageAction {
    /// Past-tense verb for success notifications ("VLC installed successfully").
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Install => "installed",
            Self::Remove => "removed",
            Self::Update => "updated",
        }
    }

    /// Noun for failure notifications ("Error during installation").
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Install => "installation",
            Self::Remove => "removal",
            Self::Update => "update",
        }
    }

    /// The install state this action requires before it may start.
    pub const fn required_state(self) -> InstallState {
        match self {
            Self::Install => InstallState::NotInstalled,
            Self::Remove | Self::Update => InstallState::Installed,
        }
    }
}

/// Errors that can occur when starting an action
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The action does not apply to the current install state
    #[error("Cannot {action} a package that is {state}")]
    NotEnabled {
        action: PackageAction,
        state: InstallState,
    },

    /// Another action on the same package has not completed yet
    #[error("A {in_flight} is already in flight for this package")]
    Busy { in_flight: PackageAction },
}

impl From<ActionError> for crate::error::ShelfError {
    fn from(err: ActionError) -> Self {
        crate::error::ShelfError::Action(err.to_string())
    }
}

/// Mutable per-package state: install status plus the transient busy flag.
///
/// Created at catalog load from a probe. Install status changes only on a
/// confirmed (exit 0) install or remove completion; update is a self-loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageState {
    state: InstallState,
    busy: Option<PackageAction>,
}

impl PackageState {
    pub const fn new(state: InstallState) -> Self {
        Self { state, busy: None }
    }

    #[inline]
    pub const fn install_state(&self) -> InstallState {
        self.state
    }

    /// The action currently in flight, if any.
    #[inline]
    pub const fn busy(&self) -> Option<PackageAction> {
        self.busy
    }

    #[inline]
    pub const fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    /// Whether `action` may start right now (correct state, nothing in flight).
    pub fn is_enabled(&self, action: PackageAction) -> bool {
        self.busy.is_none() && self.state == action.required_state()
    }

    pub fn install_enabled(&self) -> bool {
        self.is_enabled(PackageAction::Install)
    }

    pub fn remove_enabled(&self) -> bool {
        self.is_enabled(PackageAction::Remove)
    }

    pub fn update_enabled(&self) -> bool {
        self.is_enabled(PackageAction::Update)
    }

    /// Mark `action` as in flight.
    ///
    /// Must be called strictly before the command is dispatched: the busy
    /// flag is what rejects re-entrant requests while the command runs.
    ///
    /// # Errors
    ///
    /// - `Busy` if another action on this package has not completed
    /// - `NotEnabled` if the current install state does not allow the action
    pub fn begin(&mut self, action: PackageAction) -> Result<(), ActionError> {
        if let Some(in_flight) = self.busy {
            return Err(ActionError::Busy { in_flight });
        }
        if self.state != action.required_state() {
            return Err(ActionError::NotEnabled {
                action,
                state: self.state,
            });
        }
        self.busy = Some(action);
        Ok(())
    }

    /// Record the completion of the in-flight action.
    ///
    /// Clears busy; on success, applies the state transition (update never
    /// changes install status). On failure the state is left untouched, so
    /// the enabled flags revert to their pre-action values.
    pub fn finish(&mut self, action: PackageAction, success: bool) -> InstallState {
        debug_assert_eq!(
            self.busy,
            Some(action),
            "completion for an action that was never begun"
        );
        self.busy = None;
        if success {
            match action {
                PackageAction::Install => self.state = InstallState::Installed,
                PackageAction::Remove => self.state = InstallState::NotInstalled,
                PackageAction::Update => {}
            }
        }
        self.state
    }
}
