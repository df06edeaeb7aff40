//! Media processing error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Required tool not found: {tool}. Install FFmpeg and make sure it is on your PATH.")]
    ToolNotFound { tool: String },

    #[error("FFmpeg failed (exit code {code}) running `{command}`: {stderr}")]
    FfmpegError {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MediaResult<T> = Result<T, MediaError>;
