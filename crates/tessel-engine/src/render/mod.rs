//! GPU rendering.
//!
//! Convention:
//! - quad geometry is in normalized device coordinates (+Y up, CCW front faces)
//! - each draw carries its own 2x2 transform uniform and texture binding
//! - GPU data for vertices/textures is uploaded by the caller through [`crate::upload`]

mod ctx;
mod quad;
mod texture;
mod vertex;

pub use ctx::{RenderCtx, RenderTarget};
pub use quad::{QuadBinding, QuadRenderer};
pub use texture::{texture_for_image, IMAGE_TEXTURE_FORMAT};
pub use vertex::{QuadVertex, Transform2, QUAD_VERTICES};
