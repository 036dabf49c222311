//! Terminal front end for longhand arithmetic practice.
#![allow(missing_docs, clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod action;
pub mod action_handler;
pub mod app;
pub mod command;

pub use self::app::PracticeApp;
