/// WGSL shader for lit instanced meshes plus the shadow depth pass.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    sun_dir: vec4<f32>,       // xyz: toward the light, w: enabled
    sun_color: vec4<f32>,
    spot_pos: vec4<f32>,      // w: enabled
    spot_dir: vec4<f32>,      // xyz: light to target, w: cos outer
    spot_color: vec4<f32>,    // w: cos inner
    fog_color: vec4<f32>,     // rgb, w: exp2 density
    fog_params: vec4<f32>,    // near, far, mode, shadows enabled
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var shadow_tex: texture_depth_2d;
@group(1) @binding(1)
var shadow_sampler: sampler_comparison;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) params: vec4<f32>,   // x: lit, y: receives shadow
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) params: vec4<f32>,
};

fn instance_model(instance: InstanceInput) -> mat4x4<f32> {
    return mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
}

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = instance_model(instance);
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    out.params = instance.params;
    return out;
}

@vertex
fn vs_shadow(vertex: VertexInput, instance: InstanceInput) -> @builtin(position) vec4<f32> {
    let world_pos = instance_model(instance) * vec4<f32>(vertex.position, 1.0);
    return uniforms.light_view_proj * world_pos;
}

fn shadow_factor(world_pos: vec3<f32>) -> f32 {
    if (uniforms.fog_params.w < 0.5) {
        return 1.0;
    }
    let lp = uniforms.light_view_proj * vec4<f32>(world_pos, 1.0);
    if (lp.w <= 0.0) {
        return 1.0;
    }
    let ndc = lp.xyz / lp.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5);
    if (uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 || ndc.z > 1.0) {
        return 1.0;
    }
    return textureSampleCompareLevel(shadow_tex, shadow_sampler, uv, ndc.z);
}

fn apply_fog(color: vec3<f32>, world_pos: vec3<f32>) -> vec3<f32> {
    let mode = uniforms.fog_params.z;
    if (mode < 0.5) {
        return color;
    }
    let dist = length(world_pos - uniforms.camera_pos.xyz);
    var factor = 1.0;
    if (mode < 1.5) {
        // Linear fog between near and far.
        factor = clamp(
            (uniforms.fog_params.y - dist) / (uniforms.fog_params.y - uniforms.fog_params.x),
            0.0,
            1.0,
        );
    } else {
        // Exponential-squared fog.
        let d = uniforms.fog_color.w * dist;
        factor = exp(-d * d);
    }
    return mix(uniforms.fog_color.rgb, color, factor);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    var color = in.color.rgb;

    if (in.params.x > 0.5) {
        var lighting = uniforms.ambient.rgb;

        if (uniforms.sun_dir.w > 0.5) {
            let l = normalize(uniforms.sun_dir.xyz);
            lighting += uniforms.sun_color.rgb * max(dot(n, l), 0.0);
        }

        if (uniforms.spot_pos.w > 0.5) {
            let to_light = uniforms.spot_pos.xyz - in.world_pos;
            let l = normalize(to_light);
            let cd = dot(normalize(uniforms.spot_dir.xyz), -l);
            let cone = smoothstep(uniforms.spot_dir.w, uniforms.spot_color.w, cd);
            var shadow = 1.0;
            if (in.params.y > 0.5) {
                shadow = shadow_factor(in.world_pos);
            }
            lighting += uniforms.spot_color.rgb * max(dot(n, l), 0.0) * cone * shadow;
        }

        color = color * lighting;
    }

    color = apply_fog(color, in.world_pos);
    return vec4<f32>(color, in.color.a);
}
"#;

/// WGSL shader for line work: world-space helper lines (grid, axes, spot
/// cone) and instanced wireframe edge meshes.
pub const LINE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    sun_dir: vec4<f32>,
    sun_color: vec4<f32>,
    spot_pos: vec4<f32>,
    spot_dir: vec4<f32>,
    spot_color: vec4<f32>,
    fog_color: vec4<f32>,
    fog_params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

fn apply_fog(color: vec3<f32>, world_pos: vec3<f32>) -> vec3<f32> {
    let mode = uniforms.fog_params.z;
    if (mode < 0.5) {
        return color;
    }
    let dist = length(world_pos - uniforms.camera_pos.xyz);
    var factor = 1.0;
    if (mode < 1.5) {
        factor = clamp(
            (uniforms.fog_params.y - dist) / (uniforms.fog_params.y - uniforms.fog_params.x),
            0.0,
            1.0,
        );
    } else {
        let d = uniforms.fog_color.w * dist;
        factor = exp(-d * d);
    }
    return mix(uniforms.fog_color.rgb, color, factor);
}

struct LineVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_line(vertex: LineVertex) -> LineOutput {
    var out: LineOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.world_pos = vertex.position;
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(apply_fog(in.color.rgb, in.world_pos), in.color.a);
}

struct WireVertexInput {
    @location(0) position: vec3<f32>,
};

struct WireInstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) params: vec4<f32>,
};

@vertex
fn vs_wire(vertex: WireVertexInput, instance: WireInstanceInput) -> LineOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: LineOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.color = instance.color;
    return out;
}
"#;
