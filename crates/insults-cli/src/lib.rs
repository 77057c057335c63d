//! Command line front end for the insults experiment: argument parsing,
//! JSON configuration loading and logging setup.
pub mod cli;
pub mod config;
pub mod logging;
pub mod util;
