//! NV12 to RGB shader and its CPU reference

/// Full-screen quad as a triangle strip: position.xy, tex_coord.xy
///
/// Texture coordinates are flipped vertically so plane row 0 lands at the top.
#[rustfmt::skip]
pub const QUAD_VERTICES: [f32; 16] = [
    // Position     Texture coords
    -1.0, -1.0,     0.0, 1.0, // Bottom left
     1.0, -1.0,     1.0, 1.0, // Bottom right
    -1.0,  1.0,     0.0, 0.0, // Top left
     1.0,  1.0,     1.0, 0.0, // Top right
];

pub const QUAD_VERTEX_COUNT: u32 = 4;

/// Bytes between consecutive quad vertices
pub const QUAD_VERTEX_STRIDE: u64 = 4 * 4;

pub const LUMA_BINDING: u32 = 0;
pub const CHROMA_BINDING: u32 = 1;
pub const SAMPLER_BINDING: u32 = 2;

/// Samples luma at binding 0 and interleaved (u, v) at binding 1
pub const NV12_SHADER: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) tex_coord: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) tex_coord: vec2<f32>,
};

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.position = vec4<f32>(input.position, 0.0, 1.0);
    output.tex_coord = input.tex_coord;
    return output;
}

@group(0) @binding(0) var y_texture: texture_2d<f32>;
@group(0) @binding(1) var uv_texture: texture_2d<f32>;
@group(0) @binding(2) var plane_sampler: sampler;

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let y = textureSample(y_texture, plane_sampler, input.tex_coord).r;
    // Chroma is stored offset-binary
    let uv = textureSample(uv_texture, plane_sampler, input.tex_coord).rg - vec2<f32>(0.5, 0.5);
    let u = uv.x;
    let v = uv.y;

    let r = y + 1.13983 * v;
    let g = y - 0.39465 * u - 0.58060 * v;
    let b = y + 2.03211 * u;

    return vec4<f32>(r, g, b, 1.0);
}
"#;

/// BT.601-family matrix applied by [`NV12_SHADER`]
pub struct ColorMatrix;

impl ColorMatrix {
    pub const R_V: f32 = 1.13983;
    pub const G_U: f32 = 0.39465;
    pub const G_V: f32 = 0.58060;
    pub const B_U: f32 = 2.03211;

    /// Convert normalized luma and re-centered chroma to unclamped RGB
    pub fn to_rgb(y: f32, u: f32, v: f32) -> [f32; 3] {
        [
            y + Self::R_V * v,
            y - Self::G_U * u - Self::G_V * v,
            y + Self::B_U * u,
        ]
    }

    /// Convert stored 8-bit samples the way the fragment shader sees them
    pub fn sample_to_rgb(y: u8, u: u8, v: u8) -> [f32; 3] {
        let norm = |s: u8| s as f32 / 255.0;
        Self::to_rgb(norm(y), norm(u) - 0.5, norm(v) - 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn mid_gray_stays_gray() {
        let [r, g, b] = ColorMatrix::to_rgb(0.5, 0.0, 0.0);
        assert!(close(r, 0.5) && close(g, 0.5) && close(b, 0.5));
    }

    #[test]
    fn red_difference_moves_red_and_green_only() {
        let [r, g, b] = ColorMatrix::to_rgb(0.5, 0.0, 0.5);
        assert!(close(r, 0.5 + 0.5 * 1.13983));
        assert!(close(g, 0.5 - 0.5 * 0.58060));
        assert!(close(b, 0.5));
    }

    #[test]
    fn blue_difference_moves_green_and_blue_only() {
        let [r, g, b] = ColorMatrix::to_rgb(0.5, 0.25, 0.0);
        assert!(close(r, 0.5));
        assert!(close(g, 0.5 - 0.25 * 0.39465));
        assert!(close(b, 0.5 + 0.25 * 2.03211));
    }

    #[test]
    fn neutral_chroma_byte_is_near_gray() {
        // 128 is the closest byte to the 0.5 chroma midpoint.
        let [r, g, b] = ColorMatrix::sample_to_rgb(128, 128, 128);
        let y = 128.0 / 255.0;
        assert!((r - y).abs() < 0.01);
        assert!((g - y).abs() < 0.01);
        assert!((b - y).abs() < 0.01);
    }

    #[test]
    fn shader_uses_reference_coefficients() {
        for (coefficient, term) in [
            (ColorMatrix::R_V, "v"),
            (ColorMatrix::G_U, "u"),
            (ColorMatrix::G_V, "v"),
            (ColorMatrix::B_U, "u"),
        ] {
            let text = format!("{coefficient:.5} * {term}");
            assert!(NV12_SHADER.contains(&text), "shader is missing `{text}`");
        }
        assert!(NV12_SHADER.contains("- vec2<f32>(0.5, 0.5)"));
    }

    #[test]
    fn shader_bindings_match_layout() {
        for (binding, name) in [
            (LUMA_BINDING, "y_texture"),
            (CHROMA_BINDING, "uv_texture"),
            (SAMPLER_BINDING, "plane_sampler"),
        ] {
            assert!(NV12_SHADER.contains(&format!("@binding({binding}) var {name}")));
        }
    }

    #[test]
    fn quad_flips_rows() {
        let vertices: Vec<&[f32]> = QUAD_VERTICES.chunks(4).collect();
        assert_eq!(vertices.len() as u32, QUAD_VERTEX_COUNT);
        for v in vertices {
            let (y, t) = (v[1], v[3]);
            // Top of clip space samples the first plane row.
            assert_eq!(t, (1.0 - y) / 2.0);
        }
    }
}
