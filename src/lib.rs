pub mod carousel;
pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod page;
pub mod scan;
pub mod scheduler;
pub mod tasks {
    pub mod probe;
    pub mod runner;
}
