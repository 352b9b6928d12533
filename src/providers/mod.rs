pub mod gitlab;

pub use gitlab::{GitLabApi, GitLabClient};
