//! 3-D convex hull volume via QuickHull
//!
//! Only the enclosed volume is needed, so faces are kept as oriented
//! triangles and the result is read off with the divergence theorem.
//! Degenerate input (fewer than 4 points, collinear or coplanar clouds)
//! returns 0 rather than failing.

type Vec3 = [f64; 3];

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

struct Face {
    verts: [usize; 3],
    normal: Vec3,
    offset: f64,
    outside: Vec<usize>,
    alive: bool,
}

impl Face {
    /// Triangle oriented so the normal points away from `interior`.
    fn new(points: &[Vec3], mut verts: [usize; 3], interior: Vec3) -> Self {
        let [a, b, c] = verts.map(|i| points[i]);
        let mut normal = cross(sub(b, a), sub(c, a));
        let len = norm(normal);
        if len > 0.0 {
            normal = [normal[0] / len, normal[1] / len, normal[2] / len];
        }
        let mut offset = dot(normal, a);
        if dot(normal, interior) - offset > 0.0 {
            verts.swap(1, 2);
            normal = [-normal[0], -normal[1], -normal[2]];
            offset = -offset;
        }
        Face {
            verts,
            normal,
            offset,
            outside: Vec::new(),
            alive: true,
        }
    }

    fn dist(&self, p: Vec3) -> f64 {
        dot(self.normal, p) - self.offset
    }
}

/// Pick the four vertices of the starting simplex: the farthest-apart pair
/// of axis extremes, the point farthest from their line, and the point
/// farthest from the resulting plane. Returns `None` when every candidate
/// collapses (degenerate cloud).
fn initial_simplex(points: &[Vec3], eps: f64) -> Option<[usize; 4]> {
    let mut extremes = [0usize; 6];
    for (i, p) in points.iter().enumerate() {
        for axis in 0..3 {
            if p[axis] < points[extremes[axis * 2]][axis] {
                extremes[axis * 2] = i;
            }
            if p[axis] > points[extremes[axis * 2 + 1]][axis] {
                extremes[axis * 2 + 1] = i;
            }
        }
    }

    let (mut p0, mut p1, mut best) = (0, 0, 0.0);
    for &i in &extremes {
        for &j in &extremes {
            let d = norm(sub(points[i], points[j]));
            if d > best {
                best = d;
                p0 = i;
                p1 = j;
            }
        }
    }
    if best <= eps {
        return None;
    }

    let dir = sub(points[p1], points[p0]);
    let (mut p2, mut best) = (0, 0.0);
    for (i, p) in points.iter().enumerate() {
        let d = norm(cross(dir, sub(*p, points[p0]))) / norm(dir);
        if d > best {
            best = d;
            p2 = i;
        }
    }
    if best <= eps {
        return None;
    }

    let normal = cross(dir, sub(points[p2], points[p0]));
    let len = norm(normal);
    let (mut p3, mut best) = (0, 0.0);
    for (i, p) in points.iter().enumerate() {
        let d = (dot(normal, sub(*p, points[p0])) / len).abs();
        if d > best {
            best = d;
            p3 = i;
        }
    }
    if best <= eps {
        return None;
    }

    Some([p0, p1, p2, p3])
}

/// Volume of the convex hull of `points`. 0 for degenerate input.
pub fn convex_hull_volume(points: &[Vec3]) -> f64 {
    if points.len() < 4 {
        return 0.0;
    }

    let mut extent = 0.0f64;
    for p in points {
        for axis in 0..3 {
            extent = extent.max(p[axis].abs());
        }
    }
    let eps = 1e-9 * extent.max(1.0);

    let Some(simplex) = initial_simplex(points, eps) else {
        return 0.0;
    };
    let [s0, s1, s2, s3] = simplex;
    let interior = {
        let mut c = [0.0; 3];
        for &i in &simplex {
            for axis in 0..3 {
                c[axis] += points[i][axis] / 4.0;
            }
        }
        c
    };

    let mut faces = vec![
        Face::new(points, [s0, s1, s2], interior),
        Face::new(points, [s0, s1, s3], interior),
        Face::new(points, [s0, s2, s3], interior),
        Face::new(points, [s1, s2, s3], interior),
    ];

    // assign every point to the first face it lies outside of
    for (i, p) in points.iter().enumerate() {
        if simplex.contains(&i) {
            continue;
        }
        for face in faces.iter_mut() {
            if face.dist(*p) > eps {
                face.outside.push(i);
                break;
            }
        }
    }

    loop {
        let Some(fi) = faces
            .iter()
            .position(|f| f.alive && !f.outside.is_empty())
        else {
            break;
        };

        // farthest outside point of that face
        let apex = *faces[fi]
            .outside
            .iter()
            .max_by(|&&a, &&b| {
                faces[fi]
                    .dist(points[a])
                    .total_cmp(&faces[fi].dist(points[b]))
            })
            .expect("non-empty outside set");
        let apex_pos = points[apex];

        // all faces visible from the apex
        let visible: Vec<usize> = faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.alive && f.dist(apex_pos) > eps)
            .map(|(i, _)| i)
            .collect();

        // horizon = directed edges of visible faces whose reverse edge is
        // not itself part of a visible face
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for &vi in &visible {
            let [a, b, c] = faces[vi].verts;
            edges.extend([(a, b), (b, c), (c, a)]);
        }
        let horizon: Vec<(usize, usize)> = edges
            .iter()
            .copied()
            .filter(|&(a, b)| !edges.contains(&(b, a)))
            .collect();

        // orphaned candidate points from the faces being removed
        let mut orphans: Vec<usize> = Vec::new();
        for &vi in &visible {
            faces[vi].alive = false;
            orphans.append(&mut faces[vi].outside);
        }
        orphans.retain(|&i| i != apex);

        let first_new = faces.len();
        for (a, b) in horizon {
            faces.push(Face::new(points, [a, b, apex], interior));
        }
        // each orphan goes to at most one new face, so no point is ever
        // picked as apex twice
        for i in orphans {
            for face in faces[first_new..].iter_mut() {
                if face.dist(points[i]) > eps {
                    face.outside.push(i);
                    break;
                }
            }
        }
    }

    // divergence theorem over the remaining shell, relative to the interior
    // point for numeric headroom
    let mut volume = 0.0;
    for face in faces.iter().filter(|f| f.alive) {
        let [a, b, c] = face.verts.map(|i| sub(points[i], interior));
        volume += dot(a, cross(b, c)) / 6.0;
    }
    volume.abs()
}
