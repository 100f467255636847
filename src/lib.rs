pub mod artifact;
pub mod cli;
pub mod config;
pub mod generator;
pub mod orchestrator;
pub mod output;
pub mod run;
pub mod scenario;
pub mod seed;
pub mod volume;
pub mod web;
