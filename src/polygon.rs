//! Point arithmetic and planar polygon measures.

#[inline]
pub fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
pub fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    norm(sub(a, b))
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
    [
        a[0] + t * (b[0] - a[0]),
        a[1] + t * (b[1] - a[1]),
        a[2] + t * (b[2] - a[2]),
    ]
}

pub fn mean(points: &[[f64; 3]]) -> [f64; 3] {
    if points.is_empty() {
        return [0.0; 3];
    }
    let sum = points.iter().fold([0.0; 3], |acc, &p| add(acc, p));
    scale(sum, 1.0 / points.len() as f64)
}

/// Centre and area vector of a polygon given as an ordered loop of points.
///
/// The polygon is fanned into triangles about its mean point; the centre is the
/// area-weighted mean of the triangle centres and the area vector follows the
/// right-hand rule on the point order. Warped polygons get the area-weighted
/// centre of the fan, which is what finite-volume face measures use.
/// Polygons with fewer than three points, or no area, return their mean point
/// and a zero area.
pub fn centre_and_area(points: &[[f64; 3]]) -> ([f64; 3], [f64; 3]) {
    let n = points.len();
    let apex = mean(points);
    if n < 3 {
        return (apex, [0.0; 3]);
    }
    if n == 3 {
        let area = scale(cross(sub(points[1], points[0]), sub(points[2], points[0])), 0.5);
        return (apex, area);
    }

    let mut sum_n = [0.0; 3];
    let mut triangles = Vec::with_capacity(n);
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let tri_n = cross(sub(q, p), sub(apex, p));
        sum_n = add(sum_n, tri_n);
        triangles.push((add(add(p, q), apex), tri_n));
    }

    let sum_mag = norm(sum_n);
    if sum_mag < f64::MIN_POSITIVE {
        return (apex, [0.0; 3]);
    }
    let unit_n = scale(sum_n, 1.0 / sum_mag);

    let mut sum_a = 0.0;
    let mut sum_ac = [0.0; 3];
    for (c, tri_n) in triangles {
        let a = dot(tri_n, unit_n);
        sum_a += a;
        sum_ac = add(sum_ac, scale(c, a));
    }

    let centre = if sum_a.abs() > f64::MIN_POSITIVE {
        scale(sum_ac, 1.0 / (3.0 * sum_a))
    } else {
        apex
    };
    (centre, scale(sum_n, 0.5))
}
