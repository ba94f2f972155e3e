//! Flat-shaded unit meshes for the instanced layers.

use glam::{Vec2, Vec3};
use tree_core::LayerId;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshKind {
    Octahedron,
    Icosahedron,
    Tetrahedron,
    Star,
    Quad,
}

/// Mesh and base radius for each layer; the instance scale multiplies the radius.
pub fn mesh_for(layer: LayerId) -> (MeshKind, f32) {
    match layer {
        LayerId::Deep => (MeshKind::Octahedron, 0.35),
        LayerId::Shine => (MeshKind::Icosahedron, 0.3),
        LayerId::Glow => (MeshKind::Tetrahedron, 0.1),
        LayerId::Ribbon => (MeshKind::Tetrahedron, 0.2),
        LayerId::Gems => (MeshKind::Icosahedron, 0.4),
        LayerId::Topper => (MeshKind::Star, 1.0),
        LayerId::Sparkles | LayerId::Snow | LayerId::Wishes => (MeshKind::Octahedron, 1.0),
        LayerId::Photos => (MeshKind::Quad, 1.0),
    }
}

fn push_triangle(out: &mut Vec<Vertex>, a: Vec3, b: Vec3, c: Vec3) {
    let mut n = (b - a).cross(c - a).normalize_or_zero();
    let (b, c) = if n.dot(a + b + c) < 0.0 {
        // wind every face outward
        n = -n;
        (c, b)
    } else {
        (b, c)
    };
    for p in [a, b, c] {
        out.push(Vertex {
            position: p.to_array(),
            normal: n.to_array(),
            uv: [0.0, 0.0],
        });
    }
}

fn from_faces(points: &[Vec3], faces: &[[usize; 3]], radius: f32) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(faces.len() * 3);
    for f in faces {
        let [a, b, c] = f.map(|i| points[i].normalize() * radius);
        push_triangle(&mut out, a, b, c);
    }
    out
}

fn octahedron(radius: f32) -> Vec<Vertex> {
    let p = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];
    let faces = [
        [0, 2, 4],
        [0, 4, 3],
        [0, 3, 5],
        [0, 5, 2],
        [1, 2, 5],
        [1, 5, 3],
        [1, 3, 4],
        [1, 4, 2],
    ];
    from_faces(&p, &faces, radius)
}

fn tetrahedron(radius: f32) -> Vec<Vertex> {
    let p = [
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
    ];
    let faces = [[2, 1, 0], [0, 3, 2], [1, 3, 0], [2, 3, 1]];
    from_faces(&p, &faces, radius)
}

fn icosahedron(radius: f32) -> Vec<Vertex> {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    let p = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ];
    let faces = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    from_faces(&p, &faces, radius)
}

/// Five-pointed star extruded to a thin prism, facing +Z.
fn star(radius: f32) -> Vec<Vertex> {
    let inner = radius * 0.45;
    let depth = radius * 0.2;
    let rim: Vec<Vec2> = (0..10)
        .map(|k| {
            let r = if k % 2 == 0 { radius } else { inner };
            let a = std::f32::consts::FRAC_PI_2 + k as f32 * std::f32::consts::PI / 5.0;
            Vec2::new(a.cos() * r, a.sin() * r)
        })
        .collect();
    let front = Vec3::new(0.0, 0.0, depth);
    let back = Vec3::new(0.0, 0.0, -depth);
    let mut out = Vec::with_capacity(rim.len() * 6);
    for k in 0..rim.len() {
        let a = rim[k].extend(0.0);
        let b = rim[(k + 1) % rim.len()].extend(0.0);
        push_triangle(&mut out, front, a, b);
        push_triangle(&mut out, back, b, a);
    }
    out
}

/// Unit quad in the XY plane with UVs, (0,0) top-left.
fn quad() -> Vec<Vertex> {
    let v = |x: f32, y: f32| Vertex {
        position: [x - 0.5, 0.5 - y, 0.0],
        normal: [0.0, 0.0, 1.0],
        uv: [x, y],
    };
    vec![v(0.0, 0.0), v(0.0, 1.0), v(1.0, 1.0), v(0.0, 0.0), v(1.0, 1.0), v(1.0, 0.0)]
}

pub fn build(kind: MeshKind, radius: f32) -> Vec<Vertex> {
    match kind {
        MeshKind::Octahedron => octahedron(radius),
        MeshKind::Icosahedron => icosahedron(radius),
        MeshKind::Tetrahedron => tetrahedron(radius),
        MeshKind::Star => star(radius),
        MeshKind::Quad => quad(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solids_have_expected_face_counts() {
        assert_eq!(build(MeshKind::Tetrahedron, 1.0).len(), 4 * 3);
        assert_eq!(build(MeshKind::Octahedron, 1.0).len(), 8 * 3);
        assert_eq!(build(MeshKind::Icosahedron, 1.0).len(), 20 * 3);
        assert_eq!(build(MeshKind::Star, 1.0).len(), 20 * 3);
    }

    #[test]
    fn normals_point_outward() {
        for kind in [MeshKind::Tetrahedron, MeshKind::Octahedron, MeshKind::Icosahedron] {
            for tri in build(kind, 0.5).chunks(3) {
                let centroid = tri
                    .iter()
                    .map(|v| Vec3::from_array(v.position))
                    .sum::<Vec3>()
                    / 3.0;
                let n = Vec3::from_array(tri[0].normal);
                assert!((n.length() - 1.0).abs() < 1e-4);
                assert!(n.dot(centroid) > 0.0, "{kind:?}");
            }
        }
    }

    #[test]
    fn every_layer_has_a_mesh() {
        for id in LayerId::ALL {
            let (kind, r) = mesh_for(id);
            assert!(r > 0.0);
            assert!(!build(kind, r).is_empty());
        }
    }
}
