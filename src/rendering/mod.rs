//! Rendering: the in-memory frame and the code that puts it on screen.
//!
//! *   [`framebuffer`](crate::rendering::framebuffer): [`Framebuffer`], a fixed-capacity
//!     grid of ASCII cells, plus the [`Canvas`] handle that `update` draws through.
//! *   [`renderer`](crate::rendering::renderer): [`Renderer`], which turns a framebuffer
//!     into one escape-sequence payload and writes it atomically.
//!
//! [`Framebuffer`]: crate::rendering::framebuffer::Framebuffer
//! [`Canvas`]: crate::rendering::framebuffer::Canvas
//! [`Renderer`]: crate::rendering::renderer::Renderer

pub mod framebuffer;
pub mod renderer;
