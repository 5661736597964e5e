use futures::executor::block_on;
use whiteboard::renderer::DrawCommand;
use whiteboard::{
    BBox, DisplayList, FileImageLoader, NibConfig, Nib, PaintContext, PointerDrag, Selection, Shape,
    ShapeError, ShapeKind, Size, Transform,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn surface() -> DisplayList {
    DisplayList::new(Size::new(100.0, 62.0))
}

fn paint(shape: &mut Shape, list: &mut DisplayList) -> Result<(), ShapeError> {
    let loader = FileImageLoader::new(std::env::temp_dir());
    let nibs = NibConfig::default();
    let ctx = PaintContext::new(&loader, &nibs);
    block_on(shape.draw(list, &ctx))
}

fn placed(sx: f64, sy: f64) -> Transform {
    let mut t = Transform::identity();
    t.translate(0.5, 0.3);
    t.scale(sx, Some(sy));
    t
}

#[test]
fn test_circle_bbox_and_fill() {
    init_logger();
    let mut shape = Shape::circle().with_fill("rgb(0,0,0)");
    let mut list = surface();

    paint(&mut shape, &mut list).unwrap();

    assert_eq!(shape.bbox(), Some(BBox::new(-0.5, -0.5, 1.0, 1.0)));
    assert!(list.commands().iter().any(|c| matches!(c, DrawCommand::Fill(_))));
    // No stroke width, so nothing is stroked.
    assert!(!list.commands().iter().any(|c| matches!(c, DrawCommand::Stroke(_))));
}

#[test]
fn test_paint_is_idempotent() {
    let mut shape = Shape::circle().with_transform(placed(0.2, 0.2));
    shape.set_selection(Selection::Hand);
    let mut list = surface();

    paint(&mut shape, &mut list).unwrap();
    let (bbox, nibs) = (shape.bbox(), shape.nibs().cloned());
    paint(&mut shape, &mut list).unwrap();

    assert_eq!(shape.bbox(), bbox);
    assert_eq!(shape.nibs().cloned(), nibs);
}

#[test]
fn test_stroke_width_is_in_unit_space() {
    let mut shape = Shape::circle()
        .with_transform(placed(0.2, 0.2))
        .with_stroke("#000")
        .with_stroke_width(0.01);
    let mut list = surface();

    paint(&mut shape, &mut list).unwrap();

    // 0.01 of a 100px wide surface, expressed in the 20x scaled shape frame.
    let width = list
        .commands()
        .iter()
        .find_map(|c| match c {
            DrawCommand::Stroke(style) => Some(style.width),
            _ => None,
        })
        .unwrap();
    assert!((width - 0.05).abs() < 1e-12);
}

#[test]
fn test_hit_testing_uses_device_space() {
    let mut shape = Shape::circle().with_transform(placed(0.2, 0.2));
    let mut list = surface();
    assert!(!shape.is_point_in_shape(50.0, 30.0));

    paint(&mut shape, &mut list).unwrap();

    assert!(shape.is_point_in_shape(50.0, 30.0));
    assert!(shape.is_point_in_shape(59.0, 39.0));
    assert!(!shape.is_point_in_shape(65.0, 30.0));
}

#[test]
fn test_rotated_hit_testing() {
    let mut t = Transform::identity();
    t.translate(0.5, 0.3);
    t.rotate(std::f64::consts::FRAC_PI_4);
    t.scale(0.2, Some(0.05));
    let mut shape = Shape::circle().with_transform(t);
    let mut list = surface();
    paint(&mut shape, &mut list).unwrap();

    // Along the rotated long axis.
    assert!(shape.is_point_in_shape(56.0, 36.0));
    // Same distance along the unrotated x axis falls outside the thin box.
    assert!(!shape.is_point_in_shape(58.5, 30.0));
}

#[test]
fn test_nibs_only_when_selected() {
    let mut shape = Shape::circle().with_transform(placed(0.2, 0.2));
    let mut list = surface();

    paint(&mut shape, &mut list).unwrap();
    assert!(shape.nibs().is_none());
    assert_eq!(shape.is_point_in_nib(40.0, 20.0), None);

    shape.set_selection(Selection::Hand);
    paint(&mut shape, &mut list).unwrap();
    assert_eq!(shape.nibs().map(|nibs| nibs.len()), Some(9));
    assert_eq!(shape.is_point_in_nib(41.0, 21.0), Some(Nib::TopLeft));
    assert_eq!(shape.is_point_in_nib(60.0, 30.0), Some(Nib::Right));
}

#[test]
fn test_path_has_no_rotate_nib() {
    let mut shape = Shape::path(vec![0.0, 0.0, 0.5, 0.5, 1.0, 0.0]).with_transform(placed(0.2, 0.2));
    shape.set_selection(Selection::Hand);
    let mut list = surface();

    paint(&mut shape, &mut list).unwrap();

    assert_eq!(shape.bbox(), Some(BBox::new(0.0, 0.0, 1.0, 0.5)));
    let nibs = shape.nibs().unwrap();
    assert!(nibs.get(Nib::Rotate).is_none());
    assert_eq!(nibs.len(), 8);
}

#[test]
fn test_polygon_bbox() {
    let mut square = Shape::polygon(4);
    let mut triangle = Shape::polygon(3);
    let mut list = surface();

    paint(&mut square, &mut list).unwrap();
    paint(&mut triangle, &mut list).unwrap();

    assert_eq!(square.bbox(), Some(BBox::unit_centered()));
    let bbox = triangle.bbox().unwrap();
    assert!((bbox.x + 0.25).abs() < 1e-12);
    assert!((bbox.right() - 0.5).abs() < 1e-12);
    assert!((bbox.h - 3f64.sqrt() / 2.0).abs() < 1e-12);
}

#[test]
fn test_small_polygon_is_line() {
    let shape = Shape::polygon(2);
    assert_eq!(shape.kind(), ShapeKind::Line);

    let record = shape.to_record().unwrap();
    assert_eq!(record.class, "CanvasLineShape");
    assert!(record.sides.is_none());
}

#[test]
fn test_text_bbox_uses_measured_width() {
    let mut shape = Shape::text("abcd", Some("serif".into())).with_fill("#000");
    let mut list = surface();

    paint(&mut shape, &mut list).unwrap();

    // DisplayList measures 0.5 font units per character.
    assert_eq!(shape.bbox(), Some(BBox::new(-1.0, -0.65, 2.0, 1.3)));
    assert!(list.commands().contains(&DrawCommand::SetFont("1px serif".into())));
    assert!(list.commands().iter().any(|c| matches!(c, DrawCommand::FillText { x, .. } if *x == -1.0)));
    assert!(!list.commands().iter().any(|c| matches!(c, DrawCommand::StrokeText { .. })));
}

#[test]
fn test_line_end_nib_and_drag() {
    init_logger();
    let mut t = Transform::identity();
    t.translate(0.125, 0.125);
    t.scale(0.5, None);
    let mut shape = Shape::line().with_transform(t).with_fill("#f00").with_stroke("#000").with_stroke_width(0.01);
    shape.set_selection(Selection::Hand);
    let mut list = surface();

    paint(&mut shape, &mut list).unwrap();

    // Lines are never filled.
    assert!(!list.commands().iter().any(|c| matches!(c, DrawCommand::Fill(color) if color.red() == 255.0)));
    let nibs = shape.nibs().unwrap();
    assert_eq!(nibs.len(), 1);
    let end = nibs.get(Nib::LineEnd).unwrap();
    assert!((end.x - 62.5).abs() < 1e-9 && (end.y - 12.5).abs() < 1e-9);
    assert_eq!(shape.is_point_in_nib(62.0, 13.0), Some(Nib::LineEnd));

    shape
        .modify_named("line", &PointerDrag::between((0.625, 0.125), (0.125, 0.625)))
        .unwrap();
    let (x, y) = shape.transform().apply(1.0, 0.0);
    assert!((x - 0.125).abs() < 1e-12 && (y - 0.625).abs() < 1e-12);
    assert_eq!(shape.transform().decompose_translation(), (0.125, 0.125));
}

#[test]
fn test_corner_resize_keeps_aspect_ratio() {
    let mut shape = Shape::circle().with_transform(placed(0.2, 0.1));
    let mut list = surface();
    paint(&mut shape, &mut list).unwrap();

    for (nib, from, to) in [
        (Nib::BottomRight, (0.6, 0.35), (0.7, 0.37)),
        (Nib::TopLeft, (0.4, 0.25), (0.42, 0.2)),
        (Nib::BottomLeft, (0.4, 0.35), (0.3, 0.36)),
    ] {
        shape.modify(nib, &PointerDrag::between(from, to)).unwrap();
        let (sx, sy) = shape.transform().decompose_scale();
        assert!((sx / sy - 2.0).abs() < 1e-9, "{nib}: {sx} / {sy}");
    }
}

#[test]
fn test_dragged_corner_follows_pointer() {
    let mut corner = Shape::circle().with_transform(placed(0.2, 0.2));
    let mut edge = Shape::circle().with_transform(placed(0.2, 0.2));
    let mut list = surface();
    paint(&mut corner, &mut list).unwrap();
    paint(&mut edge, &mut list).unwrap();

    let drag = PointerDrag::between((0.7, 0.4), (0.7, 0.5));
    corner.modify(Nib::BottomRight, &drag).unwrap();
    edge.modify(Nib::Bottom, &drag).unwrap();

    // Both the corner and the bottom edge end under the pointer.
    let (x, y) = corner.transform().apply(0.5, 0.5);
    assert!((y - 0.5).abs() < 1e-12, "corner at {y}");
    assert!((x - 0.7).abs() < 1e-12, "corner at {x}");
    let (_, edge_y) = edge.transform().apply(0.0, 0.5);
    assert!((edge_y - 0.5).abs() < 1e-12, "edge at {edge_y}");
}

#[test]
fn test_edge_resize_limit_leaves_transform() {
    let mut shape = Shape::circle().with_transform(placed(0.2, 0.1));
    let mut list = surface();
    paint(&mut shape, &mut list).unwrap();
    let before = *shape.transform();

    let result = shape.modify(Nib::Left, &PointerDrag::between((0.4, 0.3), (0.9, 0.3)));

    assert!(matches!(result, Err(ShapeError::TransformLimitReached)));
    assert_eq!(*shape.transform(), before);
}

#[test]
fn test_edge_resize_stretches_one_axis() {
    let mut shape = Shape::circle().with_transform(placed(0.2, 0.1));
    let mut list = surface();
    paint(&mut shape, &mut list).unwrap();

    shape.modify(Nib::Bottom, &PointerDrag::between((0.5, 0.35), (0.5, 0.4))).unwrap();

    let (sx, sy) = shape.transform().decompose_scale();
    assert!((sx - 0.2).abs() < 1e-12);
    assert!((sy - 0.2).abs() < 1e-12);
}

#[test]
fn test_rotate_nib_points_at_pointer() {
    let mut shape = Shape::circle().with_transform(placed(0.2, 0.1));
    let mut list = surface();
    paint(&mut shape, &mut list).unwrap();

    shape.modify_named("rot1", &PointerDrag::between((0.7, 0.3), (0.5, 0.6))).unwrap();

    let t = shape.transform();
    assert!((t.decompose_rotation() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    let (sx, sy) = t.decompose_scale();
    assert!((sx - 0.2).abs() < 1e-12 && (sy - 0.1).abs() < 1e-12);
}

#[test]
fn test_unknown_nib_name() {
    init_logger();
    let mut shape = Shape::circle();
    let result = shape.modify_named("middle", &PointerDrag::default());
    assert!(matches!(result, Err(ShapeError::UnknownNib(name)) if name == "middle"));
}

#[test]
fn test_color_reassignment_invalidates() {
    let mut shape = Shape::circle().with_fill("#ff0000");
    let mut list = surface();
    paint(&mut shape, &mut list).unwrap();

    shape.set_fill(Some("#0000ff".into()));
    list.clear();
    paint(&mut shape, &mut list).unwrap();

    let fill = list
        .commands()
        .iter()
        .find_map(|c| match c {
            DrawCommand::Fill(color) => Some(*color),
            _ => None,
        })
        .unwrap();
    assert_eq!((fill.red(), fill.blue()), (0.0, 255.0));
}
