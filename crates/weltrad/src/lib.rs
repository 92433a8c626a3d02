pub mod app;
pub mod catalog;
pub mod command;
pub mod config;
pub mod events;

pub mod sys {
    pub mod runtime;
    pub mod server;
}
