//! Core types used throughout the unillm library

pub mod chunk;
pub mod content;
pub mod history;
pub mod message;
pub mod provider;
pub mod request;
pub mod tool;
