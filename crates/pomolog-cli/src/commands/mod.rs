pub mod advise;
pub mod config;
pub mod export;
pub mod logs;
pub mod run;
