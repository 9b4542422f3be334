pub mod api;
pub mod audit;
pub mod cli;
pub mod core;
pub mod directory;
pub mod jobs;
pub mod mailer;
pub mod notify;
