use bytemuck::{Pod, Zeroable};

/// Vertex for the triangle pipelines.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Position-only vertex for the instanced wireframe line meshes.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct WireVertex {
    pub position: [f32; 3],
}

pub(crate) struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

pub(crate) const SPHERE_RINGS: u32 = 16;
pub(crate) const SPHERE_SEGMENTS: u32 = 24;

/// Unit cube (edge length 1) centered on the origin.
pub(crate) fn unit_cube() -> MeshData {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    MeshData { vertices, indices }
}

/// Unit UV sphere (radius 1) centered on the origin.
pub(crate) fn unit_sphere(rings: u32, segments: u32) -> MeshData {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let theta = std::f32::consts::PI * ring as f32 / rings as f32;
        let y = theta.cos();
        let r = theta.sin();
        for seg in 0..=segments {
            let phi = std::f32::consts::TAU * seg as f32 / segments as f32;
            let pos = [r * phi.cos(), y, r * phi.sin()];
            vertices.push(Vertex {
                position: pos,
                normal: pos,
            });
        }
    }

    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = (ring * stride + seg) as u16;
            let b = a + stride as u16;
            // Two CCW triangles per quad, viewed from outside.
            indices.extend_from_slice(&[a, a + 1, b]);
            indices.extend_from_slice(&[a + 1, b + 1, b]);
        }
    }

    MeshData { vertices, indices }
}

/// Unit plane (1 x 1) in the XZ plane, normal up.
pub(crate) fn unit_plane() -> MeshData {
    let p = 0.5_f32;
    let n = [0.0, 1.0, 0.0];
    let vertices = vec![
        Vertex { position: [-p, 0.0, -p], normal: n },
        Vertex { position: [ p, 0.0, -p], normal: n },
        Vertex { position: [ p, 0.0,  p], normal: n },
        Vertex { position: [-p, 0.0,  p], normal: n },
    ];
    let indices = vec![0, 3, 2, 0, 2, 1];
    MeshData { vertices, indices }
}

fn line(out: &mut Vec<WireVertex>, a: [f32; 3], b: [f32; 3]) {
    out.push(WireVertex { position: a });
    out.push(WireVertex { position: b });
}

/// Edge lines of the unit cube, as a line list.
pub(crate) fn cube_wire() -> Vec<WireVertex> {
    let p = 0.5_f32;
    let corners = |y: f32| {
        [
            [-p, y, -p],
            [p, y, -p],
            [p, y, p],
            [-p, y, p],
        ]
    };
    let bottom = corners(-p);
    let top = corners(p);
    let mut out = Vec::with_capacity(24);
    for i in 0..4 {
        let j = (i + 1) % 4;
        line(&mut out, bottom[i], bottom[j]);
        line(&mut out, top[i], top[j]);
        line(&mut out, bottom[i], top[i]);
    }
    out
}

/// Latitude/longitude wires of the unit sphere, as a line list.
pub(crate) fn sphere_wire(parallels: u32, meridians: u32, steps: u32) -> Vec<WireVertex> {
    let mut out = Vec::new();
    let point = |theta: f32, phi: f32| {
        let r = theta.sin();
        [r * phi.cos(), theta.cos(), r * phi.sin()]
    };

    // Parallels: rings of constant latitude, skipping the poles.
    for p in 1..parallels {
        let theta = std::f32::consts::PI * p as f32 / parallels as f32;
        for s in 0..steps {
            let phi0 = std::f32::consts::TAU * s as f32 / steps as f32;
            let phi1 = std::f32::consts::TAU * (s + 1) as f32 / steps as f32;
            line(&mut out, point(theta, phi0), point(theta, phi1));
        }
    }

    // Meridians: pole-to-pole arcs.
    for m in 0..meridians {
        let phi = std::f32::consts::TAU * m as f32 / meridians as f32;
        for s in 0..steps {
            let theta0 = std::f32::consts::PI * s as f32 / steps as f32;
            let theta1 = std::f32::consts::PI * (s + 1) as f32 / steps as f32;
            line(&mut out, point(theta0, phi), point(theta1, phi));
        }
    }

    out
}

/// Border of the unit plane, as a line list.
pub(crate) fn plane_wire() -> Vec<WireVertex> {
    let p = 0.5_f32;
    let corners = [
        [-p, 0.0, -p],
        [p, 0.0, -p],
        [p, 0.0, p],
        [-p, 0.0, p],
    ];
    let mut out = Vec::with_capacity(8);
    for i in 0..4 {
        line(&mut out, corners[i], corners[(i + 1) % 4]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_24_vertices_36_indices() {
        let cube = unit_cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        // Edge length 1: every coordinate is +-0.5.
        for v in &cube.vertices {
            for c in v.position {
                assert!((c.abs() - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn sphere_vertices_sit_on_the_unit_sphere() {
        let sphere = unit_sphere(SPHERE_RINGS, SPHERE_SEGMENTS);
        assert_eq!(
            sphere.vertices.len(),
            ((SPHERE_RINGS + 1) * (SPHERE_SEGMENTS + 1)) as usize
        );
        for v in &sphere.vertices {
            let [x, y, z] = v.position;
            let len = (x * x + y * y + z * z).sqrt();
            assert!((len - 1.0).abs() < 1e-4, "len={len}");
        }
    }

    #[test]
    fn sphere_index_count_matches_quads() {
        let sphere = unit_sphere(SPHERE_RINGS, SPHERE_SEGMENTS);
        let quads = SPHERE_RINGS * SPHERE_SEGMENTS;
        assert_eq!(sphere.indices.len(), (quads * 6) as usize);
        let max = *sphere.indices.iter().max().unwrap() as usize;
        assert!(max < sphere.vertices.len());
    }

    #[test]
    fn plane_is_flat_with_up_normals() {
        let plane = unit_plane();
        assert_eq!(plane.indices.len(), 6);
        for v in &plane.vertices {
            assert_eq!(v.position[1], 0.0);
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn wire_meshes_are_line_lists() {
        assert_eq!(cube_wire().len(), 24);
        assert_eq!(plane_wire().len(), 8);
        let wire = sphere_wire(6, 8, 24);
        assert_eq!(wire.len() % 2, 0);
        assert!(!wire.is_empty());
    }
}
