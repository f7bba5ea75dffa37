//! Integration suite: the full update pipeline against a stubbed forge.

mod common;
mod install_flow;
mod update_cycle;
