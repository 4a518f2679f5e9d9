use facecrop::crop::{AkamaiCrop, CropOptions};
use facecrop::detection::{face_rect, vision, DetectionResult};
use facecrop::geometry::Point;

const VISION_FIXTURE: &str = include_str!("fixtures/vision_response.json");
const FACE_RECT_FIXTURE: &str = include_str!("fixtures/face_rect_response.json");

#[test]
fn vision_fixture_yields_eight_points_per_face() {
    let raw: serde_json::Value = serde_json::from_str(VISION_FIXTURE).expect("fixture json");
    let points = vision::normalize(&raw).expect("normalize");

    assert_eq!(points.len(), 16);
    // fdBoundingPoly comes first for each face
    assert_eq!(points[0], Point::new(148, 102));
    assert_eq!(points[4], Point::new(118, 32));
    // vertices without an x are at the left edge
    assert_eq!(points[12], Point::new(0, 12));

    let result = DetectionResult::new("gs://bucket/group.jpg", points, raw);
    let url = AkamaiCrop
        .encode(&result, &CropOptions::default())
        .expect("encode");
    assert_eq!(url, "gs://bucket/group.jpg?crop=386:343%3B0,12&resize=*:*");
}

#[test]
fn face_rect_fixture_yields_four_corners_per_face() {
    let raw: serde_json::Value = serde_json::from_str(FACE_RECT_FIXTURE).expect("fixture json");
    let points = face_rect::normalize(&raw).expect("normalize");

    assert_eq!(
        points,
        vec![
            Point::new(394, 54),
            Point::new(394, 132),
            Point::new(472, 132),
            Point::new(472, 54),
            Point::new(172, 131),
            Point::new(172, 196),
            Point::new(237, 196),
            Point::new(237, 131),
        ]
    );

    let result = DetectionResult::new("https://example.com/group.jpg", points, raw);
    let url = AkamaiCrop
        .encode(&result, &CropOptions::default())
        .expect("encode");
    assert_eq!(
        url,
        "https://example.com/group.jpg?crop=300:24%3B172,54&resize=*:*"
    );
}
