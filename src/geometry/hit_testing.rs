use super::Point;

/// Whether `point` lies inside the parallelogram spanned from `origin` by the
/// edges to `across` and `down`.
///
/// The point is projected onto both edge vectors; it is inside when each
/// projection falls within `[0, |edge|²]`. Works for any rotation or shear of
/// the underlying rectangle.
pub fn is_point_in_quad(point: Point, origin: Point, across: Point, down: Point) -> bool {
    let v = (point.0 - origin.0, point.1 - origin.1);
    let within = |edge_end: Point| {
        let e = (edge_end.0 - origin.0, edge_end.1 - origin.1);
        let projection = v.0 * e.0 + v.1 * e.1;
        let limit = e.0 * e.0 + e.1 * e.1;
        (0.0..=limit).contains(&projection)
    };
    within(across) && within(down)
}

/// Key of the handle nearest to `point` among those whose radius covers it.
pub fn nearest_handle<K>(
    point: Point,
    handles: impl IntoIterator<Item = (K, Point, f64)>,
) -> Option<K> {
    handles
        .into_iter()
        .filter_map(|(key, center, radius)| {
            let distance = super::distance(point, center);
            (distance <= radius).then_some((key, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key)
}
