mod client;
mod types;

pub use client::{GitLabApi, GitLabClient};
