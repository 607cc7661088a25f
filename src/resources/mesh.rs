//! Procedural primitive meshes.
//!
//! Shapes are built on the CPU as [`MeshData`] and uploaded once. Dimensions
//! are unit sized and meant to be scaled by the entry's transform:
//!
//! - box: cube from -0.5 to 0.5 on every axis
//! - plane: XZ quad from -1 to 1, facing +Y
//! - cylinder, tapered cylinder, cone: radius 1 base at y = 0, height 1
//! - sphere: radius 1; half sphere: its upper half with a flat base
//! - torus, half torus: ring of radius 1 and tube radius 0.2 in the XY plane
//! - prism: triangular cross-section in XY, extruded from z = -0.5 to 0.5
//! - pyramid: square base from -0.5 to 0.5 at y = -0.5, apex at y = 0.5

use std::{collections::HashMap, f32::consts::PI};

use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

use crate::{
    frame::{GpuMesh, MeshGeometry},
    pipelines::scene::MeshVertex,
    render::MeshKind,
};

const SEGMENTS: u32 = 32;
const STACKS: u32 = 16;
const TUBE_SEGMENTS: u32 = 16;
const TORUS_RADIUS: f32 = 1.0;
const TUBE_RADIUS: f32 = 0.2;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn for_kind(kind: MeshKind) -> Self {
        let mut mesh = Self::default();
        match kind {
            MeshKind::Box => mesh.push_box(),
            MeshKind::Plane => mesh.push_quad(
                [
                    [-1.0, 0.0, 1.0],
                    [1.0, 0.0, 1.0],
                    [1.0, 0.0, -1.0],
                    [-1.0, 0.0, -1.0],
                ],
                [0.0, 1.0, 0.0],
            ),
            MeshKind::Cylinder { top, bottom } => {
                mesh.push_frustum(1.0, 1.0);
                if bottom {
                    mesh.push_disc(0.0, 1.0, -1.0);
                }
                if top {
                    mesh.push_disc(1.0, 1.0, 1.0);
                }
            }
            MeshKind::TaperedCylinder => {
                mesh.push_frustum(1.0, 0.5);
                mesh.push_disc(0.0, 1.0, -1.0);
                mesh.push_disc(1.0, 0.5, 1.0);
            }
            MeshKind::Cone => {
                mesh.push_frustum(1.0, 0.0);
                mesh.push_disc(0.0, 1.0, -1.0);
            }
            MeshKind::Sphere => mesh.push_sphere(0.0),
            MeshKind::HalfSphere => {
                mesh.push_sphere(PI / 2.0);
                mesh.push_disc(0.0, 1.0, -1.0);
            }
            MeshKind::Torus => mesh.push_torus(2.0 * PI),
            MeshKind::HalfTorus => mesh.push_torus(PI),
            MeshKind::Prism => mesh.push_prism(),
            MeshKind::Pyramid => mesh.push_pyramid(),
        }
        mesh
    }

    pub fn upload(&self, device: &wgpu::Device, label: &str) -> GpuMesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        GpuMesh {
            vertex_buffer,
            index_buffer,
            num_elements: self.indices.len() as u32,
        }
    }

    fn base(&self) -> u32 {
        self.vertices.len() as u32
    }

    fn vertex(&mut self, position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) {
        self.vertices.push(MeshVertex {
            position,
            normal,
            tex_coords,
        });
    }

    /// Triangles for a `(rows + 1) x (cols + 1)` vertex grid starting at `base`.
    fn push_grid(&mut self, base: u32, rows: u32, cols: u32) {
        for i in 0..rows {
            for j in 0..cols {
                let a = base + i * (cols + 1) + j;
                let b = a + cols + 1;
                self.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
    }

    /// Corners in counter-clockwise order seen from the side `normal` points to.
    fn push_quad(&mut self, corners: [[f32; 3]; 4], normal: [f32; 3]) {
        let base = self.base();
        let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        for (corner, uv) in corners.into_iter().zip(uvs) {
            self.vertex(corner, normal, uv);
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    fn push_triangle(&mut self, corners: [[f32; 3]; 3]) {
        let [a, b, c] = corners.map(Vector3::from);
        let normal: [f32; 3] = (b - a).cross(c - a).normalize().into();
        let base = self.base();
        let uvs = [[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]];
        for (corner, uv) in corners.into_iter().zip(uvs) {
            self.vertex(corner, normal, uv);
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    fn push_box(&mut self) {
        let h = 0.5;
        let faces: [([[f32; 3]; 4], [f32; 3]); 6] = [
            ([[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]], [0.0, 0.0, 1.0]),
            ([[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]], [0.0, 0.0, -1.0]),
            ([[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]], [1.0, 0.0, 0.0]),
            ([[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]], [-1.0, 0.0, 0.0]),
            ([[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]], [0.0, 1.0, 0.0]),
            ([[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]], [0.0, -1.0, 0.0]),
        ];
        for (corners, normal) in faces {
            self.push_quad(corners, normal);
        }
    }

    /// Side wall from `bottom_radius` at y = 0 to `top_radius` at y = 1.
    fn push_frustum(&mut self, bottom_radius: f32, top_radius: f32) {
        let slope = Vector3::new(1.0, bottom_radius - top_radius, 0.0).normalize();
        let base = self.base();
        for (ring, radius) in [bottom_radius, top_radius].into_iter().enumerate() {
            let y = ring as f32;
            for j in 0..=SEGMENTS {
                let u = j as f32 / SEGMENTS as f32;
                let (sin, cos) = (u * 2.0 * PI).sin_cos();
                self.vertex(
                    [radius * cos, y, radius * sin],
                    [slope.x * cos, slope.y, slope.x * sin],
                    [u, y],
                );
            }
        }
        self.push_grid(base, 1, SEGMENTS);
    }

    fn push_disc(&mut self, y: f32, radius: f32, facing: f32) {
        let center = self.base();
        self.vertex([0.0, y, 0.0], [0.0, facing, 0.0], [0.5, 0.5]);
        for j in 0..=SEGMENTS {
            let (sin, cos) = (j as f32 / SEGMENTS as f32 * 2.0 * PI).sin_cos();
            self.vertex(
                [radius * cos, y, radius * sin],
                [0.0, facing, 0.0],
                [0.5 + 0.5 * cos, 0.5 + 0.5 * sin],
            );
        }
        for j in 0..SEGMENTS {
            self.indices
                .extend_from_slice(&[center, center + 1 + j, center + 2 + j]);
        }
    }

    /// Sphere surface from polar angle `start` (0 = south pole) to the north
    /// pole.
    fn push_sphere(&mut self, start: f32) {
        let base = self.base();
        for i in 0..=STACKS {
            let v = i as f32 / STACKS as f32;
            let theta = start + v * (PI - start);
            let (ring, y) = (theta.sin(), -theta.cos());
            for j in 0..=SEGMENTS {
                let u = j as f32 / SEGMENTS as f32;
                let (sin, cos) = (u * 2.0 * PI).sin_cos();
                let p = [ring * cos, y, ring * sin];
                self.vertex(p, p, [u, v]);
            }
        }
        self.push_grid(base, STACKS, SEGMENTS);
    }

    /// Ring around the Z axis, swept over `sweep` radians from +X.
    fn push_torus(&mut self, sweep: f32) {
        let base = self.base();
        for i in 0..=SEGMENTS {
            let u = i as f32 / SEGMENTS as f32;
            let (su, cu) = (u * sweep).sin_cos();
            for j in 0..=TUBE_SEGMENTS {
                let v = j as f32 / TUBE_SEGMENTS as f32;
                let (sv, cv) = (v * 2.0 * PI).sin_cos();
                let normal = [cv * cu, cv * su, sv];
                let position = [
                    TORUS_RADIUS * cu + TUBE_RADIUS * normal[0],
                    TORUS_RADIUS * su + TUBE_RADIUS * normal[1],
                    TUBE_RADIUS * normal[2],
                ];
                self.vertex(position, normal, [u, v]);
            }
        }
        self.push_grid(base, SEGMENTS, TUBE_SEGMENTS);
    }

    fn push_prism(&mut self) {
        let (front, back) = (0.5, -0.5);
        let a = [-0.5, -0.5];
        let b = [0.5, -0.5];
        let c = [0.0, 0.5];
        let at = |p: [f32; 2], z: f32| [p[0], p[1], z];
        self.push_triangle([at(a, front), at(b, front), at(c, front)]);
        self.push_triangle([at(b, back), at(a, back), at(c, back)]);
        for (p, q) in [(a, b), (b, c), (c, a)] {
            let edge = Vector3::new(q[0] - p[0], q[1] - p[1], 0.0);
            let normal: [f32; 3] = edge.cross(Vector3::unit_z()).normalize().into();
            self.push_quad([at(p, back), at(q, back), at(q, front), at(p, front)], normal);
        }
    }

    fn push_pyramid(&mut self) {
        let h = 0.5;
        let apex = [0.0, h, 0.0];
        let corners = [[-h, -h, h], [h, -h, h], [h, -h, -h], [-h, -h, -h]];
        for i in 0..4 {
            self.push_triangle([corners[i], corners[(i + 1) % 4], apex]);
        }
        self.push_quad(
            [corners[3], corners[2], corners[1], corners[0]],
            [0.0, -1.0, 0.0],
        );
    }
}

/// Uploaded geometry for every [`MeshKind`].
pub struct PrimitiveMeshes {
    meshes: HashMap<MeshKind, GpuMesh>,
}

impl PrimitiveMeshes {
    pub const KINDS: [MeshKind; 14] = [
        MeshKind::Box,
        MeshKind::Plane,
        MeshKind::Cylinder {
            top: true,
            bottom: true,
        },
        MeshKind::Cylinder {
            top: true,
            bottom: false,
        },
        MeshKind::Cylinder {
            top: false,
            bottom: true,
        },
        MeshKind::Cylinder {
            top: false,
            bottom: false,
        },
        MeshKind::Cone,
        MeshKind::Sphere,
        MeshKind::HalfSphere,
        MeshKind::Torus,
        MeshKind::HalfTorus,
        MeshKind::Prism,
        MeshKind::Pyramid,
        MeshKind::TaperedCylinder,
    ];

    pub fn new(device: &wgpu::Device) -> Self {
        let meshes = Self::KINDS
            .into_iter()
            .map(|kind| {
                let data = MeshData::for_kind(kind);
                (kind, data.upload(device, &format!("{kind:?}")))
            })
            .collect::<HashMap<_, _>>();
        log::debug!("Uploaded {} primitive meshes", meshes.len());
        Self { meshes }
    }
}

impl MeshGeometry for PrimitiveMeshes {
    fn mesh(&self, kind: MeshKind) -> Option<&GpuMesh> {
        self.meshes.get(&kind)
    }
}
