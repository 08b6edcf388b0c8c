//! One module per subcommand, each exposing `execute`.

pub mod add;
pub mod completions;
pub mod edit;
pub mod list;
pub mod new;
pub mod remove;
pub mod show;
pub mod totp;
