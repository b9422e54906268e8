//! Inkboard Application
//!
//! Session runtime driving a whiteboard from pointer commands and the
//! reconciliation timer, plus the `inkboard` command-line shell.

pub mod cli;
mod error;
mod script;
mod session;
mod svg;

pub use cli::{Cli, Command};
pub use error::{AppError, AppResult};
pub use script::{ScriptStep, parse_script};
pub use session::{ReconcileTimer, SessionCommand, SessionHandle, drive, run_session};
pub use svg::SvgSink;
