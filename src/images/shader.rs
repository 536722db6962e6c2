//! The shader program the UI pipeline is built from.

/// Default program.  Group 0 holds the projection uniform and the sampler, group 1 the texture.
pub const DEFAULT_WGSL: &str = r#"
struct Uniforms {
    mvp: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(0) @binding(1) var u_sampler: sampler;
@group(1) @binding(0) var u_texture: texture_2d<f32>;

struct VertexInput {
    @location(0) pos: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = uniforms.mvp * vec4<f32>(in.pos, 0.0, 1.0);
    out.color = in.color;
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color * textureSample(u_texture, u_sampler, in.uv);
}
"#;

#[derive(Debug, Clone, PartialEq)]
pub struct ShaderSource {
    //may need additional type design for future backends
    pub(crate) wgsl_code: String,
    pub(crate) vertex_entry: String,
    pub(crate) fragment_entry: String,
}

impl ShaderSource {
    /// A custom program.  It must keep the default program's bindings and vertex inputs.
    pub fn new(wgsl_code: String, vertex_entry: &str, fragment_entry: &str) -> Self {
        Self {
            wgsl_code,
            vertex_entry: vertex_entry.to_string(),
            fragment_entry: fragment_entry.to_string(),
        }
    }

    pub fn wgsl_code(&self) -> &str {
        &self.wgsl_code
    }
}

impl Default for ShaderSource {
    fn default() -> Self {
        Self::new(DEFAULT_WGSL.to_string(), "vs_main", "fs_main")
    }
}
