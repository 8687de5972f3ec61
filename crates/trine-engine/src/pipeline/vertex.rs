use bytemuck::{Pod, Zeroable};

/// Per-vertex record: 3×f32 position followed by 4×f32 color, tightly packed.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

    /// `POSITION` at offset 0, `COLOR` at offset 12.
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 28);
        assert_eq!(std::mem::align_of::<Vertex>(), 4);
    }

    #[test]
    fn attribute_offsets_match_input_layout() {
        let [position, color] = Vertex::ATTRIBUTES;
        assert_eq!((position.shader_location, position.offset), (0, 0));
        assert_eq!(position.format, wgpu::VertexFormat::Float32x3);
        assert_eq!((color.shader_location, color.offset), (1, 12));
        assert_eq!(color.format, wgpu::VertexFormat::Float32x4);
    }
}
