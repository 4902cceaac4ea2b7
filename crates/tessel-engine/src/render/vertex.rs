use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2, // uv
        2 => Float32x4  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const fn v(pos: [f32; 2], uv: [f32; 2], color: [f32; 4]) -> QuadVertex {
    QuadVertex { pos, uv, color }
}

/// Full-viewport quad as two CCW triangles, one colour per corner.
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    v([-1.0, -1.0], [0.0, 1.0], [1.0, 0.0, 0.0, 1.0]),
    v([1.0, -1.0], [1.0, 1.0], [0.0, 0.0, 1.0, 1.0]),
    v([-1.0, 1.0], [0.0, 0.0], [0.0, 1.0, 0.0, 1.0]),
    v([1.0, -1.0], [1.0, 1.0], [0.0, 0.0, 1.0, 1.0]),
    v([1.0, 1.0], [1.0, 0.0], [1.0, 0.0, 1.0, 1.0]),
    v([-1.0, 1.0], [0.0, 0.0], [0.0, 1.0, 0.0, 1.0]),
];

/// 2x2 linear transform stored as two `vec4` columns (uniform layout).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Transform2 {
    pub cols: [[f32; 4]; 2],
}

impl Transform2 {
    pub const IDENTITY: Self = Self {
        cols: [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0]],
    };

    /// Counter-clockwise rotation by `angle` radians followed by uniform `scale`.
    pub fn rotation_scale(angle: f32, scale: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            cols: [[c * scale, s * scale, 0.0, 0.0], [-s * scale, c * scale, 0.0, 0.0]],
        }
    }

    /// Applies the transform to a 2D point.
    pub fn apply(&self, p: [f32; 2]) -> [f32; 2] {
        let [c0, c1] = self.cols;
        [c0[0] * p[0] + c1[0] * p[1], c0[1] * p[0] + c1[1] * p[1]]
    }

    /// Squeezes the output horizontally so shapes keep their proportions on a
    /// surface with the given width/height ratio.
    pub fn fit_aspect(mut self, aspect: f32) -> Self {
        if aspect > 0.0 {
            self.cols[0][0] /= aspect;
            self.cols[1][0] /= aspect;
        }
        self
    }
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}
