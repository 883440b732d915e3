use approx::assert_relative_eq;
use nalgebra::Point3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::dual_graph::{BoundaryEdge, DualGraph, FanEntry, InteriorEdge};
use super::*;
use crate::{
    error::{is_cancelled, MeshingError},
    mesh::{fixtures::grid_points, Cell, Mesh},
    misc::cross_xy,
    progress::Progress,
    triangulation::{DelaunayTriangulator, Triangulator},
};

fn origins(n: usize) -> Vec<Point3<f64>> {
    vec![Point3::origin(); n]
}

fn points(coords: &[[f64; 2]]) -> Vec<Point3<f64>> {
    coords.iter().map(|c| Point3::new(c[0], c[1], 0.)).collect()
}

fn interior(edges: &[[usize; 6]]) -> Vec<InteriorEdge> {
    edges
        .iter()
        .map(|e| InteriorEdge {
            p0: e[0],
            p1: e[1],
            f_left: e[2],
            f_right: e[3],
            p_left: e[4],
            p_right: e[5],
        })
        .collect()
}

fn boundary(edges: &[[usize; 4]]) -> Vec<BoundaryEdge> {
    edges
        .iter()
        .map(|e| BoundaryEdge {
            p0: e[0],
            p1: e[1],
            cell: e[2],
            p_left: e[3],
        })
        .collect()
}

/// `(first cell, last cell, [point, first.next, first.prior, last.next, last.prior])`
fn splits(graph: &DualGraph<f64>) -> Vec<(usize, usize, [usize; 5])> {
    graph
        .splits
        .iter()
        .map(|s| {
            (
                s.first.cell,
                s.last.cell,
                [s.point, s.first.next, s.first.prior, s.last.next, s.last.prior],
            )
        })
        .collect()
}

fn assert_points(actual: &[Point3<f64>], expected: &[[f64; 2]], epsilon: f64) {
    assert_eq!(actual.len(), expected.len());
    actual.iter().zip(expected).for_each(|(p, e)| {
        assert_relative_eq!(p.x, e[0], epsilon = epsilon);
        assert_relative_eq!(p.y, e[1], epsilon = epsilon);
    });
}

const GRID_3X3: [[usize; 3]; 8] = [
    [4, 3, 0],
    [1, 4, 0],
    [2, 4, 1],
    [5, 4, 2],
    [7, 6, 3],
    [8, 7, 4],
    [5, 8, 4],
    [4, 7, 3],
];

/// 3x3 grid with a hole where (3, 4, 7) was, and (3, 7, 6) split through a point 9
const GRID_3X3_HOLE: [[usize; 3]; 8] = [
    [4, 3, 0],
    [1, 4, 0],
    [2, 4, 1],
    [5, 4, 2],
    [3, 7, 9],
    [8, 7, 4],
    [5, 8, 4],
    [3, 9, 6],
];

#[test]
fn test_point_fans() {
    let fans = dual_graph::point_fans(10, &[[2, 9, 6]]);
    assert_eq!(fans[2], vec![FanEntry { prior: 6, next: 9, cell: 0 }]);
    assert_eq!(fans[9], vec![FanEntry { prior: 2, next: 6, cell: 0 }]);
    assert_eq!(fans[6], vec![FanEntry { prior: 9, next: 2, cell: 0 }]);
    assert!(fans[0].is_empty());
}

/// fan entries link up into chains, a pinch point yields two chains
#[test]
fn test_sort_into_chains() {
    let fan = vec![
        FanEntry { prior: 9, next: 2, cell: 0 },
        FanEntry { prior: 4, next: 9, cell: 1 },
    ];
    let chains = dual_graph::sort_into_chains(fan);
    assert_eq!(
        chains,
        vec![vec![
            FanEntry { prior: 4, next: 9, cell: 1 },
            FanEntry { prior: 9, next: 2, cell: 0 },
        ]]
    );

    let fan = vec![
        FanEntry { prior: 1, next: 2, cell: 0 },
        FanEntry { prior: 5, next: 6, cell: 1 },
        FanEntry { prior: 2, next: 3, cell: 2 },
    ];
    let chains = dual_graph::sort_into_chains(fan);
    assert_eq!(chains.len(), 2);
    assert_eq!(chains[0].iter().map(|e| e.cell).collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(chains[1].iter().map(|e| e.cell).collect::<Vec<_>>(), vec![1]);
}

#[test]
fn test_dual_graph_single_triangle() {
    let graph = DualGraph::try_new(&origins(10), &[[2, 9, 6]], 17, None).unwrap();
    assert!(graph.interior.is_empty());
    assert_eq!(
        graph.boundary,
        boundary(&[[9, 6, 0, 2], [6, 2, 0, 9], [2, 9, 0, 6]])
    );
    assert!(graph.splits.is_empty());
}

#[test]
fn test_dual_graph_two_triangles() {
    let graph = DualGraph::try_new(&origins(10), &[[2, 9, 6], [9, 4, 6]], 17, None).unwrap();
    assert_eq!(graph.interior, interior(&[[6, 9, 1, 0, 4, 2]]));
    assert_eq!(
        graph.boundary,
        boundary(&[[9, 4, 1, 6], [6, 2, 0, 9], [4, 6, 1, 9], [2, 9, 0, 6]])
    );
    assert!(graph.splits.is_empty());
}

/// a boundary point with three triangles in its fan offers a split
#[test]
fn test_dual_graph_three_triangles() {
    let graph = DualGraph::try_new(
        &origins(10),
        &[[2, 9, 6], [9, 4, 6], [9, 3, 4]],
        17,
        None,
    )
    .unwrap();
    assert_eq!(
        graph.interior,
        interior(&[[6, 9, 1, 0, 4, 2], [4, 9, 2, 1, 3, 6]])
    );
    assert_eq!(
        graph.boundary,
        boundary(&[
            [9, 3, 2, 4],
            [6, 2, 0, 9],
            [4, 6, 1, 9],
            [3, 4, 2, 9],
            [2, 9, 0, 6]
        ])
    );
    assert_eq!(splits(&graph), vec![(0, 2, [9, 6, 2, 3, 4])]);
    assert_eq!(graph.splits[0].weight, 17);
}

#[test]
fn test_dual_graph_grid() {
    let graph = DualGraph::try_new(&origins(9), &GRID_3X3, 17, None).unwrap();
    assert_eq!(
        graph.interior,
        interior(&[
            [4, 7, 7, 5, 3, 8],
            [4, 8, 5, 6, 7, 5],
            [4, 5, 6, 3, 8, 2],
            [3, 7, 4, 7, 6, 4],
            [3, 4, 7, 0, 7, 0],
            [2, 4, 2, 3, 1, 5],
            [1, 4, 1, 2, 0, 2],
            [0, 4, 0, 1, 3, 1],
        ])
    );
    assert_eq!(
        graph.boundary,
        boundary(&[
            [8, 7, 5, 4],
            [7, 6, 4, 3],
            [6, 3, 4, 7],
            [5, 8, 6, 4],
            [3, 0, 0, 4],
            [2, 5, 3, 4],
            [1, 2, 2, 4],
            [0, 1, 1, 4],
        ])
    );
    assert_eq!(
        splits(&graph),
        vec![(4, 0, [3, 7, 6, 0, 4]), (5, 4, [7, 4, 8, 6, 3])]
    );
}

/// the point next to the hole has two chains in its fan
#[test]
fn test_dual_graph_grid_with_hole() {
    let graph = DualGraph::try_new(&origins(10), &GRID_3X3_HOLE, 17, None).unwrap();
    assert_eq!(
        graph.interior,
        interior(&[
            [4, 8, 5, 6, 7, 5],
            [4, 5, 6, 3, 8, 2],
            [3, 9, 7, 4, 6, 7],
            [2, 4, 2, 3, 1, 5],
            [1, 4, 1, 2, 0, 2],
            [0, 4, 0, 1, 3, 1],
        ])
    );
    assert_eq!(
        graph.boundary,
        boundary(&[
            [9, 6, 7, 3],
            [8, 7, 5, 4],
            [7, 9, 4, 3],
            [7, 4, 5, 8],
            [6, 3, 7, 9],
            [5, 8, 6, 4],
            [4, 3, 0, 0],
            [3, 0, 0, 4],
            [3, 7, 4, 9],
            [2, 5, 3, 4],
            [1, 2, 2, 4],
            [0, 1, 1, 4],
        ])
    );
    assert_eq!(splits(&graph), vec![(5, 0, [4, 8, 7, 3, 0])]);
}

#[test]
fn test_split_weight_update() {
    let mut graph = DualGraph::try_new(&origins(9), &GRID_3X3, 17, None).unwrap();
    graph.set_split_weight(-3);
    assert!(graph.splits.iter().all(|s| s.weight == -3));
}

#[test]
fn test_eliminate_edges() {
    let mesh = Mesh::try_from_triangles(origins(9), &GRID_3X3).unwrap();
    let mut blossom = QuadBlossom::try_new(&mesh).unwrap();
    let quads = blossom.eliminate(&[1, 3, 5, 7]).unwrap();
    assert_eq!(
        quads.cells(),
        &[
            Cell::Quad([0, 1, 4, 3]),
            Cell::Quad([2, 5, 4, 1]),
            Cell::Quad([3, 4, 7, 6]),
            Cell::Quad([4, 5, 8, 7]),
        ]
    );

    let mesh = Mesh::try_from_triangles(origins(10), &GRID_3X3_HOLE).unwrap();
    let mut blossom = QuadBlossom::try_new(&mesh).unwrap();
    let quads = blossom.eliminate(&[2, 5, 3, 0]).unwrap();
    assert_eq!(
        quads.cells(),
        &[
            Cell::Quad([0, 1, 4, 3]),
            Cell::Quad([2, 5, 4, 1]),
            Cell::Quad([4, 5, 8, 7]),
            Cell::Quad([3, 7, 9, 6]),
        ]
    );
}

fn simple_triangle() -> Mesh<f64> {
    Mesh::try_from_triangles(
        points(&[
            [0., 0.],
            [10., 0.],
            [20., 0.],
            [30., 0.],
            [0., 10.],
            [10., 10.],
            [20., 10.],
            [0., 20.],
            [10., 20.],
            [0., 30.],
        ]),
        &[
            [0, 1, 4],
            [1, 5, 4],
            [1, 2, 5],
            [2, 6, 5],
            [2, 3, 6],
            [4, 5, 7],
            [5, 8, 7],
            [5, 6, 8],
            [7, 8, 9],
        ],
    )
    .unwrap()
}

#[test]
fn test_simple_triangle_without_split() {
    let mesh = simple_triangle();
    let options = QuadOptions::default()
        .with_split_boundary_points(false)
        .with_use_angle_cost(true);
    let quads = QuadBlossom::try_new(&mesh)
        .unwrap()
        .make_quads(&options)
        .unwrap();
    assert_eq!(
        quads.cells(),
        &[
            Cell::Quad([1, 5, 4, 0]),
            Cell::Quad([2, 6, 5, 1]),
            Cell::Triangle([2, 3, 6]),
            Cell::Quad([5, 8, 7, 4]),
            Cell::Triangle([5, 6, 8]),
            Cell::Triangle([7, 8, 9]),
        ]
    );
    assert_eq!(quads.points(), mesh.points());
}

/// one boundary point is split, leaving a single triangle at the apex
#[test]
fn test_simple_triangle_with_split() {
    let mesh = simple_triangle();
    let options = QuadOptions::default().with_use_angle_cost(true);
    let quads = QuadBlossom::try_new(&mesh)
        .unwrap()
        .make_quads(&options)
        .unwrap();
    assert_eq!(quads.num_points(), 11);
    assert_eq!(quads.num_quads(), 5);
    assert_eq!(quads.num_triangles(), 1);
    assert_eq!(&quads.points()[..10], mesh.points());
    let new_point = quads.num_points() - 1;
    assert!(
        quads
            .cells()
            .iter()
            .filter(|c| c.position(new_point).is_some())
            .count()
            >= 2
    );
}

/// twice the signed area of every cell
fn cell_areas(mesh: &Mesh<f64>) -> Vec<f64> {
    let p = mesh.points();
    mesh.cells()
        .iter()
        .map(|c| {
            let v = c.vertices();
            v.windows(2)
                .skip(1)
                .map(|w| cross_xy(&p[v[0]], &p[w[0]], &p[w[1]]))
                .sum()
        })
        .collect()
}

/// a boundary fan of five triangles where the split point would push the
/// second triangle across its outer edge
fn lopsided_fan() -> Mesh<f64> {
    Mesh::try_from_triangles(
        points(&[
            [0., 0.],
            [10., 0.],
            [29.54, 5.21],
            [0.347, 1.97],
            [-5.209, 29.544],
            [-0.766, 0.643],
            [-10., 0.],
        ]),
        &[[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 5], [0, 5, 6]],
    )
    .unwrap()
}

#[test]
fn test_folding_split_is_skipped() {
    let mesh = lopsided_fan();
    let mut blossom = QuadBlossom::try_new(&mesh).unwrap();
    blossom.pre_make_quads().unwrap();
    let graph = blossom.graph().unwrap();
    assert_eq!(graph.interior.len(), 4);
    assert_eq!(graph.splits.len(), 1);
    assert_eq!(graph.splits[0].point, 0);

    let result = blossom.eliminate(&[4]).unwrap();
    assert_eq!(result.points(), mesh.points());
    assert_eq!(result.cells(), mesh.cells());
}

#[test]
fn test_splits_never_fold_cells() {
    let mesh = lopsided_fan();
    let quads = QuadBlossom::try_new(&mesh)
        .unwrap()
        .make_quads(&QuadOptions::default().with_split_weight(1000))
        .unwrap();
    assert!(cell_areas(&quads).iter().all(|a| *a > 0.));
}

#[test]
fn test_irregular_meshes_stay_valid() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let n = rng.random_range(8..40);
        let pts = (0..n)
            .map(|_| {
                Point3::new(
                    rng.random_range(0.0..100.0),
                    rng.random_range(0.0..100.0),
                    0.,
                )
            })
            .collect::<Vec<_>>();
        let mesh = DelaunayTriangulator::default()
            .triangulate(&pts, &[], &[])
            .unwrap();

        for split in [false, true] {
            let options = QuadOptions::default().with_split_boundary_points(split);
            let quads = QuadBlossom::try_new(&mesh)
                .unwrap()
                .make_quads(&options)
                .unwrap();
            let checked = Mesh::try_new(quads.points().to_vec(), quads.cells().to_vec()).unwrap();
            assert!(cell_areas(&checked).iter().all(|a| *a > 0.));

            let cleaned = BadQuadRemover::new(&quads).remove_bad_quads(0.7).unwrap();
            assert!(cleaned.num_cells() <= quads.num_cells());
            Mesh::try_new(cleaned.points().to_vec(), cleaned.cells().to_vec()).unwrap();
        }
    }
}

/// the apex of a triangle fan of three is split and all cells become quads
#[test]
fn test_split_with_distance_cost() {
    let mesh = Mesh::try_from_triangles(
        points(&[
            [-10., 0.],
            [0., 0.],
            [10., 0.],
            [-5., 7.07],
            [5., 7.07],
            [0., 14.14],
        ]),
        &[[0, 1, 3], [1, 2, 4], [1, 4, 3], [3, 4, 5]],
    )
    .unwrap();
    let quads = QuadBlossom::try_new(&mesh)
        .unwrap()
        .make_quads(&QuadOptions::default())
        .unwrap();
    assert_eq!(
        quads.cells(),
        &[
            Cell::Quad([3, 0, 1, 6]),
            Cell::Quad([1, 2, 4, 6]),
            Cell::Quad([3, 6, 4, 5]),
        ]
    );
    assert_points(
        quads.points(),
        &[
            [-10., 0.],
            [0., 0.],
            [10., 0.],
            [-5., 7.07],
            [5., 7.07],
            [0., 14.14],
            [0., 14.14 / 3.],
        ],
        1e-5,
    );
}

fn simple_quad() -> Mesh<f64> {
    Mesh::try_from_triangles(
        grid_points(4, 4, 10.),
        &[
            [0, 1, 4],
            [1, 5, 4],
            [1, 2, 5],
            [2, 6, 5],
            [2, 3, 6],
            [3, 7, 6],
            [4, 9, 8],
            [4, 5, 9],
            [5, 10, 9],
            [5, 6, 10],
            [6, 7, 11],
            [6, 11, 10],
            [8, 9, 12],
            [9, 13, 12],
            [9, 10, 13],
            [10, 14, 13],
            [10, 11, 14],
            [11, 15, 14],
        ],
    )
    .unwrap()
}

#[test]
fn test_simple_quad() {
    let mesh = simple_quad();
    let expected = [
        [1, 5, 4, 0],
        [2, 6, 5, 1],
        [3, 7, 6, 2],
        [4, 5, 9, 8],
        [5, 6, 10, 9],
        [6, 7, 11, 10],
        [9, 13, 12, 8],
        [10, 14, 13, 9],
        [11, 15, 14, 10],
    ]
    .map(Cell::Quad);

    for split in [false, true] {
        let options = QuadOptions::default()
            .with_split_boundary_points(split)
            .with_use_angle_cost(true);
        let quads = QuadBlossom::try_new(&mesh)
            .unwrap()
            .make_quads(&options)
            .unwrap();
        assert_eq!(quads.cells(), &expected);
        assert_eq!(quads.points(), mesh.points());
    }
}

fn complex_quad() -> Mesh<f64> {
    Mesh::try_from_triangles(
        points(&[
            [-10., 0.],
            [0., 0.],
            [10., 0.],
            [-15., 10.],
            [-5., 10.],
            [5., 10.],
            [15., 10.],
            [-20., 20.],
            [-10., 20.],
            [0., 20.],
            [10., 20.],
            [20., 20.],
            [-25., 30.],
            [-15., 30.],
            [-5., 30.],
            [5., 30.],
            [15., 30.],
            [25., 30.],
            [-30., 40.],
            [-20., 40.],
            [-10., 40.],
            [0., 40.],
            [10., 40.],
            [20., 40.],
            [30., 40.],
        ]),
        &[
            [0, 4, 3],
            [0, 1, 4],
            [1, 5, 4],
            [1, 2, 5],
            [2, 6, 5],
            [3, 8, 7],
            [3, 4, 8],
            [4, 9, 8],
            [4, 5, 9],
            [5, 10, 9],
            [5, 11, 10],
            [5, 6, 11],
            [7, 13, 12],
            [7, 8, 13],
            [8, 14, 13],
            [8, 9, 14],
            [9, 15, 14],
            [9, 10, 15],
            [10, 16, 15],
            [10, 11, 16],
            [11, 17, 16],
            [12, 19, 18],
            [12, 13, 19],
            [13, 20, 19],
            [13, 14, 20],
            [14, 21, 20],
            [14, 15, 21],
            [15, 22, 21],
            [15, 23, 22],
            [15, 16, 23],
            [16, 17, 23],
            [17, 24, 23],
        ],
    )
    .unwrap()
}

#[test]
fn test_complex_quad() {
    let mesh = complex_quad();
    let mut blossom = QuadBlossom::try_new(&mesh).unwrap();
    assert_eq!(blossom.pre_make_quads().unwrap(), 16);

    // without splits the 32 triangles pair up as far as the boundary allows
    let options = QuadOptions::default()
        .with_split_boundary_points(false)
        .with_use_angle_cost(true);
    let quads = blossom.make_quads(&options).unwrap();
    assert_eq!(quads.num_points(), 25);
    assert_eq!(quads.num_quads() * 2 + quads.num_triangles(), 32);

    // every split adds one point and one cell
    let options = options.with_split_boundary_points(true);
    let quads = QuadBlossom::try_new(&mesh)
        .unwrap()
        .make_quads(&options)
        .unwrap();
    assert_eq!(quads.num_triangles(), 0);
    assert_eq!(quads.num_points() - 25, quads.num_cells() - 16);
}

#[test]
fn test_pre_make_quads() {
    let mut pts = origins(10);
    pts[2] = Point3::new(0., 0., 0.);
    pts[3] = Point3::new(10., 20., 0.);
    pts[4] = Point3::new(0., 20., 0.);
    pts[6] = Point3::new(0., 10., 0.);
    pts[9] = Point3::new(10., 10., 0.);
    let mesh = Mesh::try_from_triangles(pts, &[[2, 9, 6], [9, 4, 6], [9, 3, 4]]).unwrap();

    let mut blossom = QuadBlossom::try_new(&mesh).unwrap();
    assert_eq!(blossom.pre_make_quads().unwrap(), 5);
    let graph = blossom.graph().unwrap();
    assert_eq!(graph.splits.len(), 1);
    assert_eq!(graph.splits[0].weight, -1000);

    let quads = blossom.make_quads(&QuadOptions::default()).unwrap();
    assert_eq!(
        quads.cells(),
        &[Cell::Triangle([2, 9, 6]), Cell::Quad([4, 6, 9, 3])]
    );
    assert_eq!(quads.num_points(), 10);
}

#[test]
fn test_single_triangle_passes_through() {
    let mesh = Mesh::try_from_triangles(
        points(&[[0., 0.], [10., 10.], [0., 10.]]),
        &[[0, 1, 2]],
    )
    .unwrap();
    let mut blossom = QuadBlossom::try_new(&mesh).unwrap();
    assert_eq!(blossom.pre_make_quads().unwrap(), 3);
    let quads = blossom.make_quads(&QuadOptions::default()).unwrap();
    assert_eq!(quads, mesh);
}

#[test]
fn test_rejects_quads() {
    let mesh = Mesh::try_new(
        points(&[[0., 0.], [1., 0.], [1., 1.], [0., 1.]]),
        vec![Cell::Quad([0, 1, 2, 3])],
    )
    .unwrap();
    let err = QuadBlossom::try_new(&mesh).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MeshingError>(),
        Some(MeshingError::InvalidInput(_))
    ));
}

#[test]
fn test_make_quads_cancelled() {
    let mesh = simple_quad();
    let mut blossom = QuadBlossom::try_new(&mesh)
        .unwrap()
        .with_progress(Progress::cancel_after(0));
    let err = blossom.make_quads(&QuadOptions::default()).unwrap_err();
    assert!(is_cancelled(&err));
}

#[test]
fn test_estimated_run_time() {
    let cases = [
        (500, 0.0085),
        (1000, 0.068),
        (5000, 8.5),
        (10000, 68.),
        (100000, 68000.),
    ];
    for (n, minutes) in cases {
        assert_relative_eq!(
            QuadBlossom::<f64>::estimated_run_time_in_minutes(n),
            minutes,
            epsilon = 1e-3
        );
    }
}

/// mixed triangles and quads split into quads around edge midpoints and centroids
#[test]
fn test_split_to_quads() {
    let mesh = Mesh::try_new(
        grid_points(4, 3, 10.),
        vec![
            Cell::Triangle([0, 5, 4]),
            Cell::Triangle([0, 1, 5]),
            Cell::Triangle([1, 2, 5]),
            Cell::Triangle([2, 6, 5]),
            Cell::Quad([2, 3, 7, 6]),
            Cell::Triangle([4, 5, 8]),
            Cell::Triangle([5, 9, 8]),
            Cell::Quad([5, 6, 10, 9]),
            Cell::Quad([6, 7, 11, 10]),
        ],
    )
    .unwrap();
    let quads = split_to_quads(&mesh);

    let mut expected_points = vec![
        [0., 0.],
        [10., 0.],
        [20., 0.],
        [30., 0.],
        [0., 10.],
        [10., 10.],
        [20., 10.],
        [30., 10.],
        [0., 20.],
        [10., 20.],
        [20., 20.],
        [30., 20.],
    ];
    expected_points.extend([
        [5., 0.],
        [0., 5.],
        [5., 5.],
        [15., 0.],
        [10., 5.],
        [25., 0.],
        [15., 5.],
        [20., 5.],
        [30., 5.],
        [5., 10.],
        [0., 15.],
        [15., 10.],
        [5., 15.],
        [10., 15.],
        [25., 10.],
        [20., 15.],
        [30., 15.],
        [5., 20.],
        [15., 20.],
        [25., 20.],
    ]);
    expected_points.extend([
        [10. / 3., 20. / 3.],
        [20. / 3., 10. / 3.],
        [40. / 3., 10. / 3.],
        [50. / 3., 20. / 3.],
        [25., 5.],
        [10. / 3., 40. / 3.],
        [20. / 3., 50. / 3.],
        [15., 15.],
        [25., 15.],
    ]);
    assert_points(quads.points(), &expected_points, 1e-9);

    let expected_cells = [
        [0, 14, 32, 13],
        [5, 21, 32, 14],
        [4, 13, 32, 21],
        [0, 12, 33, 14],
        [1, 16, 33, 12],
        [5, 14, 33, 16],
        [1, 15, 34, 16],
        [2, 18, 34, 15],
        [5, 16, 34, 18],
        [2, 19, 35, 18],
        [6, 23, 35, 19],
        [5, 18, 35, 23],
        [2, 17, 36, 19],
        [3, 20, 36, 17],
        [7, 26, 36, 20],
        [6, 19, 36, 26],
        [4, 21, 37, 22],
        [5, 24, 37, 21],
        [8, 22, 37, 24],
        [5, 25, 38, 24],
        [9, 29, 38, 25],
        [8, 24, 38, 29],
        [5, 23, 39, 25],
        [6, 27, 39, 23],
        [10, 30, 39, 27],
        [9, 25, 39, 30],
        [6, 26, 40, 27],
        [7, 28, 40, 26],
        [11, 31, 40, 28],
        [10, 27, 40, 31],
    ]
    .map(Cell::Quad);
    assert_eq!(quads.cells(), &expected_cells);
}
