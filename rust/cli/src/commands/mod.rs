//! One module per subcommand.
//!
//! Each exposes `handle_<name>_command`, takes its output streams as
//! `&mut dyn Write` and reports failures as [`crate::CliError`].

pub mod cfg;
pub mod deal;
pub mod rules;
pub mod sim;
pub mod verify;

pub use deal::handle_deal_command;
pub use rules::handle_rules_command;
pub use sim::{handle_sim_command, SimOptions};
pub use verify::handle_verify_command;
