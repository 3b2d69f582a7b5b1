pub mod bluetooth;
pub mod cli;
pub mod config;
pub mod controller;
pub mod drivers;
pub mod ipc;
pub mod service;
