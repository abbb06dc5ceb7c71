// Adapters - External system implementations

pub mod env_tools;
pub mod exec_ffmpeg;
pub mod fs_local;
pub mod json_state;
pub mod probe_ffprobe;
pub mod toml_config;

// Re-export adapters
pub use env_tools::ToolPaths;
pub use exec_ffmpeg::FFmpegAdapter;
pub use fs_local::FsLocalAdapter;
pub use json_state::JsonStateAdapter;
pub use probe_ffprobe::FFprobeAdapter;
pub use toml_config::TomlConfigAdapter;
