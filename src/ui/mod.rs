//! Screen output.
//!
//! - **frame**: Append buffer holding one frame until it is flushed
//! - **renderer**: Draws the rows, banner and cursor into a frame

pub mod frame;
pub mod renderer;

pub use renderer::Renderer;
