pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod interactive;
pub mod logger;
pub mod pipeline;
pub mod raster;
pub mod runner;
pub mod scanner;
