use plicut::polygon::{add, cross, distance, dot, norm, scale};
use plicut::{BoundingBox, CellCutter, CellStatus, Plane, Polyhedron};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SAMPLES: usize = 200;

fn octahedron() -> Polyhedron {
    let points = [
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ];
    let mut faces = Vec::new();
    for &sx in &[1.0, -1.0] {
        for &sy in &[1.0, -1.0] {
            for &sz in &[1.0, -1.0] {
                let x = if sx > 0.0 { 0 } else { 1 };
                let y = if sy > 0.0 { 2 } else { 3 };
                let z = if sz > 0.0 { 4 } else { 5 };
                if sx * sy * sz > 0.0 {
                    faces.push(vec![x, y, z]);
                } else {
                    faces.push(vec![x, z, y]);
                }
            }
        }
    }
    Polyhedron::from_faces(&points, &faces).unwrap()
}

fn prism() -> Polyhedron {
    let points = [
        [0.0, 0.0, 0.0],
        [2.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 3.0],
        [2.0, 0.0, 3.0],
        [0.0, 1.0, 3.0],
    ];
    let faces = vec![
        vec![0, 2, 1],
        vec![3, 4, 5],
        vec![0, 1, 4, 3],
        vec![1, 2, 5, 4],
        vec![2, 0, 3, 5],
    ];
    Polyhedron::from_faces(&points, &faces).unwrap()
}

fn l_prism() -> Polyhedron {
    let footprint = [[0.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 2.0], [0.0, 2.0]];
    let mut points = Vec::new();
    for z in [0.0, 1.0] {
        points.extend(footprint.iter().map(|p| [p[0], p[1], z]));
    }
    let mut faces = vec![vec![5, 4, 3, 2, 1, 0], vec![6, 7, 8, 9, 10, 11]];
    for i in 0..6 {
        let j = (i + 1) % 6;
        faces.push(vec![i, j, j + 6, i + 6]);
    }
    Polyhedron::from_faces(&points, &faces).unwrap()
}

fn cells() -> Vec<(&'static str, Polyhedron)> {
    vec![
        ("cube", Polyhedron::unit_cube()),
        (
            "box",
            Polyhedron::from_bounds(BoundingBox::new([-3.0, 1.0, 0.5], [-1.0, 1.5, 4.0])),
        ),
        (
            "tetrahedron",
            Polyhedron::tetrahedron([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0])
                .unwrap(),
        ),
        ("octahedron", octahedron()),
        ("prism", prism()),
        ("l-prism", l_prism()),
    ]
}

fn random_normal(rng: &mut StdRng) -> [f64; 3] {
    loop {
        let n = [
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        ];
        let len = norm(n);
        if len > 0.1 && len <= 1.0 {
            return scale(n, 1.0 / len);
        }
    }
}

fn random_plane(rng: &mut StdRng, cell: &Polyhedron) -> Plane {
    let normal = random_normal(rng);
    let (lo, hi) = cell.extent(normal);
    let offset = rng.gen_range(lo..hi);
    Plane::new(normal, offset).unwrap()
}

#[test]
fn test_planes_outside_extent_are_trivial() {
    let mut rng = StdRng::seed_from_u64(1);
    let cutter = CellCutter::default();
    for (name, cell) in cells() {
        for _ in 0..SAMPLES {
            let normal = random_normal(&mut rng);
            let (lo, hi) = cell.extent(normal);
            let margin = rng.gen_range(1e-6..1.0);

            let sub_cell = cutter.calc_sub_cell(&cell, &Plane::new(normal, lo - margin).unwrap()).unwrap();
            assert_eq!(sub_cell.status(), CellStatus::FullyAbove, "{name}");
            assert_eq!(sub_cell.sub_cell_volume(), 0.0);

            let sub_cell = cutter.calc_sub_cell(&cell, &Plane::new(normal, hi + margin).unwrap()).unwrap();
            assert_eq!(sub_cell.status(), CellStatus::FullyBelow, "{name}");
            assert!((sub_cell.sub_cell_volume() - cell.volume()).abs() < 1e-12);
        }
    }
}

#[test]
fn test_volume_monotone_in_offset() {
    let mut rng = StdRng::seed_from_u64(2);
    let cutter = CellCutter::default();
    for (name, cell) in cells() {
        let tol = 1e-12 * cell.volume();
        for _ in 0..SAMPLES / 10 {
            let normal = random_normal(&mut rng);
            let (lo, hi) = cell.extent(normal);
            let mut previous = 0.0;
            for k in 0..=40 {
                let offset = lo + (hi - lo) * k as f64 / 40.0;
                let plane = Plane::new(normal, offset).unwrap();
                let volume = cutter.calc_sub_cell(&cell, &plane).unwrap().sub_cell_volume();
                assert!(volume >= previous - tol, "{name}: {volume} < {previous} at offset {offset}");
                previous = volume;
            }
            assert!((previous - cell.volume()).abs() < 1e-12);
        }
    }
}

#[test]
fn test_pyramid_volume_matches_divergence_theorem() {
    let mut rng = StdRng::seed_from_u64(3);
    let cutter = CellCutter::default();
    for (name, cell) in cells() {
        for _ in 0..SAMPLES {
            let plane = random_plane(&mut rng, &cell);
            let sub_cell = cutter.calc_sub_cell(&cell, &plane).unwrap();
            let diff = (sub_cell.sub_cell_volume() - sub_cell.divergence_volume()).abs();
            assert!(diff < 1e-12 * cell.volume().max(1.0), "{name}: difference {diff}");
        }
    }
}

#[test]
fn test_interface_closed_and_planar() {
    let mut rng = StdRng::seed_from_u64(4);
    let cutter = CellCutter::default();
    for (name, cell) in cells() {
        for _ in 0..SAMPLES {
            let plane = random_plane(&mut rng, &cell);
            let sub_cell = cutter.calc_sub_cell(&cell, &plane).unwrap();
            if sub_cell.status() != CellStatus::Cut {
                continue;
            }

            assert!(sub_cell.interface_points().len() >= 3, "{name}");
            for points in sub_cell.interface_loops() {
                assert!(points.len() >= 3, "{name}");
                for p in points {
                    assert!(plane.signed_distance(*p).abs() < 1e-12, "{name}: point off plane");
                }
            }

            // Area vector along the plane normal.
            let area = sub_cell.interface_area();
            assert!(dot(area, plane.normal()) > 0.0, "{name}");
            assert!(norm(cross(area, plane.normal())) < 1e-12, "{name}");

            // The sub-cell boundary is a closed surface: its area vectors cancel.
            let mut total = area;
            for face in sub_cell.cut_faces() {
                total = add(total, plicut::polygon::centre_and_area(&face.points).1);
            }
            assert!(norm(total) < 1e-12, "{name}: open sub-cell, residual {:?}", total);
        }
    }
}

#[test]
fn test_conservation_with_flipped_plane() {
    let mut rng = StdRng::seed_from_u64(5);
    let cutter = CellCutter::default();
    for (name, cell) in cells() {
        let volume = cell.volume();
        let centroid = cell.centroid();
        for _ in 0..SAMPLES {
            let plane = random_plane(&mut rng, &cell);
            let below = cutter.calc_sub_cell(&cell, &plane).unwrap();
            let above = cutter.calc_sub_cell(&cell, &plane.flipped()).unwrap();

            let v1 = below.sub_cell_volume();
            let v2 = above.sub_cell_volume();
            assert!((v1 + v2 - volume).abs() < 1e-12 * volume.max(1.0), "{name}");
            assert!((below.volume_fraction() + above.volume_fraction() - 1.0).abs() < 1e-12);

            let moment = add(scale(below.sub_cell_centre(), v1), scale(above.sub_cell_centre(), v2));
            assert!(distance(scale(moment, 1.0 / volume), centroid) < 1e-10, "{name}");

            // Both sides share the interface with opposite orientation.
            if below.status() == CellStatus::Cut {
                assert_eq!(above.status(), CellStatus::Cut);
                assert!(distance(below.interface_area(), scale(above.interface_area(), -1.0)) < 1e-12);
            }
        }
    }
}

#[test]
fn test_unit_cube_half() {
    let cell = Polyhedron::unit_cube();
    let plane = Plane::new([0.0, 0.0, 1.0], 0.5).unwrap();
    let sub_cell = CellCutter::default().calc_sub_cell(&cell, &plane).unwrap();

    assert_eq!(sub_cell.status(), CellStatus::Cut);
    assert!((sub_cell.sub_cell_volume() - 0.5).abs() < 1e-12);
    assert!((norm(sub_cell.interface_area()) - 1.0).abs() < 1e-12);

    let corners = [[0.0, 0.0, 0.5], [1.0, 0.0, 0.5], [1.0, 1.0, 0.5], [0.0, 1.0, 0.5]];
    let points = sub_cell.interface_points();
    assert_eq!(points.len(), 4);
    for corner in corners {
        assert!(points.iter().any(|p| distance(*p, corner) < 1e-12));
    }
}

#[test]
fn test_unit_cube_below_plane() {
    let cell = Polyhedron::unit_cube();
    let plane = Plane::new([0.0, 0.0, 1.0], -0.1).unwrap();
    let sub_cell = CellCutter::default().calc_sub_cell(&cell, &plane).unwrap();
    assert_eq!(sub_cell.status(), CellStatus::FullyAbove);
    assert_eq!(sub_cell.sub_cell_volume(), 0.0);
    assert!(sub_cell.interface_points().is_empty());
}

#[test]
fn test_plane_through_vertex_only() {
    // Touches the cube at the origin corner only.
    let s = 1.0 / 3.0f64.sqrt();
    let cell = Polyhedron::unit_cube();
    let sub_cell = CellCutter::default()
        .calc_sub_cell(&cell, &Plane::new([s, s, s], 0.0).unwrap())
        .unwrap();
    assert_eq!(sub_cell.status(), CellStatus::FullyAbove);

    let sub_cell = CellCutter::default()
        .calc_sub_cell(&cell, &Plane::new([s, s, s], 3.0 * s).unwrap())
        .unwrap();
    assert_eq!(sub_cell.status(), CellStatus::FullyBelow);
}

#[test]
fn test_hexagonal_section() {
    // x + y + z = 1.5 cuts the unit cube in a regular hexagon, halving it.
    let s = 1.0 / 3.0f64.sqrt();
    let cell = Polyhedron::unit_cube();
    let sub_cell = CellCutter::default()
        .calc_sub_cell(&cell, &Plane::new([s, s, s], 1.5 * s).unwrap())
        .unwrap();
    assert_eq!(sub_cell.interface_points().len(), 6);
    assert!((sub_cell.sub_cell_volume() - 0.5).abs() < 1e-12);
    // Side 1/sqrt(2): area 3 sqrt(3)/2 * 1/2.
    assert!((norm(sub_cell.interface_area()) - 0.75 * 3.0f64.sqrt()).abs() < 1e-12);
    assert!(distance(sub_cell.interface_centre().unwrap(), [0.5, 0.5, 0.5]) < 1e-12);
}

#[test]
fn test_vertex_grazing_planes() {
    // Planes passing just outside the on-plane band at a vertex.
    let mut rng = StdRng::seed_from_u64(6);
    let cutter = CellCutter::default();
    let shapes = [
        Polyhedron::unit_cube(),
        Polyhedron::tetrahedron([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]).unwrap(),
        octahedron(),
        prism(),
    ];
    for cell in &shapes {
        let volume = cell.volume();
        for _ in 0..SAMPLES {
            let normal = random_normal(&mut rng);
            for v in 0..cell.vertex_count() {
                let height = dot(normal, cell.vertex(v));
                for eps in [2e-10, -2e-10, 2.5e-10, -2.5e-10, 5e-10, -5e-10] {
                    let plane = Plane::new(normal, height + eps).unwrap();
                    let below = cutter.calc_sub_cell(cell, &plane).unwrap();
                    let above = cutter.calc_sub_cell(cell, &plane.flipped()).unwrap();
                    let total = below.sub_cell_volume() + above.sub_cell_volume();
                    assert!((total - volume).abs() < 1e-9, "vertex {v} eps {eps}: {total}");
                }
            }
        }
    }
}
