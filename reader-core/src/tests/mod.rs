mod config;
mod launcher;
mod support;
