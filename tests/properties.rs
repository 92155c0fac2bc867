//! End-to-end properties of unwrapping, seam fusion, boundary tracing and
//! packing, exercised through the public API.

use nalgebra::{Point2, Point3};

use unfurl::algo::boundary::{trace_boundaries, BoundaryEdge, TraceOptions};
use unfurl::algo::pack::{pack_islands, pack_meshes, IslandBounds, PackOptions};
use unfurl::algo::parameterize::{lscm, unwrap, LscmOptions, PinOptions};
use unfurl::algo::seam::{fuse_seam, FuseOptions};
use unfurl::geometry::LineSegment;
use unfurl::prelude::*;

/// An n x n grid over a saddle, not developable.
fn saddle(n: usize) -> TriMesh {
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            let (x, y) = (i as f64 / n as f64 - 0.5, j as f64 / n as f64 - 0.5);
            vertices.push(Point3::new(x, y, 0.5 * (x * x - y * y)));
        }
    }
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + n + 1;
            let v11 = v01 + 1;
            triangles.push([v00, v10, v11]);
            triangles.push([v00, v11, v01]);
        }
    }
    TriMesh::new(vertices, triangles).unwrap()
}

fn defaults() -> (PinOptions, LscmOptions) {
    (PinOptions::default(), LscmOptions::default())
}

#[test]
fn unwrap_keeps_pins_and_covers_every_vertex() {
    let (pin_options, options) = defaults();
    for n in [1, 3, 6] {
        let mesh = saddle(n);
        let a = mesh.vertices()[0];
        let b = mesh.vertices()[mesh.num_vertices() - 1];
        let pins = vec![
            Pin::vertex(a, Point2::new(0.2, -0.1)),
            Pin::vertex(b, Point2::new(1.7, 0.9)),
        ];

        let uv = unwrap(&mesh, &pins, &pin_options, &options).unwrap();
        assert_eq!(uv.len(), mesh.num_vertices());
        assert_eq!(uv.get(0), Point2::new(0.2, -0.1));
        assert_eq!(uv.get(mesh.num_vertices() - 1), Point2::new(1.7, 0.9));
        assert!(uv.iter().all(|(_, p)| p.x.is_finite() && p.y.is_finite()));
    }
}

#[test]
fn unwrap_rejects_bad_pins() {
    let (pin_options, options) = defaults();
    let mesh = saddle(2);
    let a = mesh.vertices()[0];
    let b = mesh.vertices()[4];

    let one = vec![Pin::vertex(a, Point2::origin())];
    assert!(matches!(
        unwrap(&mesh, &one, &pin_options, &options),
        Err(UnwrapError::Underconstrained(_))
    ));

    let same = vec![Pin::vertex(a, Point2::new(1.0, 1.0)), Pin::vertex(b, Point2::new(1.0, 1.0))];
    assert!(matches!(
        unwrap(&mesh, &same, &pin_options, &options),
        Err(UnwrapError::Underconstrained(_))
    ));

    let repeated = lscm(
        &mesh,
        &[0, 4, 0],
        &[Point2::origin(), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)],
        &options,
    );
    assert!(matches!(repeated, Err(UnwrapError::Overconstrained { vertex: 0 })));
}

#[test]
fn flat_triangle_is_reproduced() {
    let (pin_options, options) = defaults();
    let mesh = TriMesh::new(
        vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
        vec![[0, 1, 2]],
    )
    .unwrap();
    let pins = vec![
        Pin::vertex(Point3::new(0.0, 0.0, 0.0), Point2::new(0.0, 0.0)),
        Pin::vertex(Point3::new(1.0, 0.0, 0.0), Point2::new(1.0, 0.0)),
    ];
    let uv = unwrap(&mesh, &pins, &pin_options, &options).unwrap();
    assert!((uv.get(2) - Point2::new(0.0, 1.0)).norm() < 1e-8);
}

#[test]
fn fuse_seam_is_idempotent() {
    // A 2 x 1 strip split down the middle, each half emitted on its own. The
    // right half's copy of the middle edge is off by a fraction of the
    // tolerance, as a tessellator rounding each face separately would leave it.
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 0.5, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(1.0, 4e-4, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(2.0, 1.0, 0.0),
        Point3::new(1.0, 1.0 - 4e-4, 0.0),
        Point3::new(1.0, 0.5003, 0.0),
    ];
    let triangles = vec![
        [0, 1, 2],
        [0, 2, 3],
        [0, 3, 4],
        [5, 6, 9],
        [9, 6, 7],
        [9, 7, 8],
    ];
    let seam = LineSegment::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
    let options = FuseOptions::default();

    let once = fuse_seam(&vertices, &triangles, &seam, &options);
    let twice = fuse_seam(&once.0, &once.1, &seam, &options);
    assert_eq!(once.0.len(), 7);
    assert!(once.0.contains(&Point3::new(1.0, 0.5, 0.0)));
    assert_eq!(once, twice);
}

#[test]
fn pack_three_unit_squares() {
    let islands: Vec<IslandBounds> = ["A", "B", "C"]
        .iter()
        .map(|id| IslandBounds::new(*id, Point2::origin(), Point2::new(1.0, 1.0)))
        .collect();
    let packing = pack_islands(&islands, &PackOptions::default().with_resolution(3.0, 1.0)).unwrap();

    assert_eq!(packing.layout.len(), 3);
    assert_eq!(packing.scale, 1.0);
    for (i, a) in packing.rects.iter().enumerate() {
        for b in &packing.rects[i + 1..] {
            let overlap = a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y;
            assert!(!overlap);
        }
    }
    let min_x = packing.rects.iter().map(|r| r.min.x).fold(f64::INFINITY, f64::min);
    let min_y = packing.rects.iter().map(|r| r.min.y).fold(f64::INFINITY, f64::min);
    let max_x = packing.rects.iter().map(|r| r.max.x).fold(f64::NEG_INFINITY, f64::max);
    let max_y = packing.rects.iter().map(|r| r.max.y).fold(f64::NEG_INFINITY, f64::max);
    assert_eq!((min_x, min_y, max_x, max_y), (0.0, 0.0, 3.0, 1.0));
}

#[test]
fn pack_fails_when_area_exceeds_texture() {
    let islands: Vec<IslandBounds> = (0..5)
        .map(|i| IslandBounds::new(format!("I{i}"), Point2::origin(), Point2::new(1.0, 1.0)))
        .collect();
    let options = PackOptions::default().with_resolution(2.0, 2.0).with_max_iter(2);
    assert!(matches!(
        pack_islands(&islands, &options),
        Err(UnwrapError::PackingFailed { iterations: 2 })
    ));
}

#[test]
fn folded_square_shared_edge_is_interior() {
    // Square A in z = 0, square B folded up along x = 1.
    let mesh = TriMesh::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
        ],
        vec![[0, 1, 2], [0, 2, 3], [1, 5, 4], [1, 4, 2]],
    )
    .unwrap();
    let (pin_options, options) = defaults();
    let pins = vec![
        Pin::vertex(Point3::new(0.0, 0.0, 0.0), Point2::new(0.0, 0.0)),
        Pin::vertex(Point3::new(0.0, 1.0, 0.0), Point2::new(0.0, 1.0)),
    ];
    let uv = unwrap(&mesh, &pins, &pin_options, &options).unwrap();

    let shared = LineSegment::new(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0));
    let traced = trace_boundaries(
        &mesh,
        &uv,
        &[BoundaryEdge::new("Edge2", &shared, 2)],
        &TraceOptions::default(),
    );

    assert_eq!(traced.len(), 1);
    assert!(traced[0].interior);
    assert_eq!(traced[0].vertices, vec![1, 2]);
    // The fold flattens onto x = 1 in UV space.
    for p in &traced[0].points {
        assert!((p.x - 1.0).abs() < 1e-6);
    }
}

#[test]
fn packed_texture_coordinates_stay_in_the_unit_square() {
    let (pin_options, options) = defaults();
    let islands: Vec<UVMesh> = (0..4)
        .map(|i| {
            let mesh = saddle(2 + i);
            let pins = vec![
                Pin::vertex(mesh.vertices()[0], Point2::new(0.0, 0.0)),
                Pin::vertex(mesh.vertices()[1], Point2::new(0.1, 0.0)),
            ];
            let uv = unwrap(&mesh, &pins, &pin_options, &options).unwrap();
            UVMesh::with_uv(format!("F{i}"), mesh, uv).unwrap()
        })
        .collect();

    let packing = pack_meshes(&islands, &PackOptions::default().with_buffer(4.0)).unwrap();
    for island in &islands {
        let coords = packing.layout.texture_coordinates(island).unwrap();
        let (min, max) = coords.bounding_box().unwrap();
        assert!(min.x >= -1e-9 && min.y >= -1e-9);
        assert!(max.x <= 1.0 + 1e-9 && max.y <= 1.0 + 1e-9);
    }
}
