//! Crop URLs for the Akamai Image Converter.

use crate::detection::DetectionResult;
use crate::error::FaceCropError;
use crate::geometry::Point;

use super::query::QueryUrl;
use super::{bounding_rect, CropOptions};

/// Registry name of this encoder.
pub const NAME: &str = "akamai";

/// Encodes detections as Akamai `crop`/`resize` (and optionally
/// `composite-to`) query directives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AkamaiCrop;

impl AkamaiCrop {
    /// Returns the crop URL for the region bounding every detected point.
    pub fn encode(
        &self,
        result: &DetectionResult,
        options: &CropOptions,
    ) -> Result<String, FaceCropError> {
        let rect = bounding_rect(result)?;
        Ok(self.build_url(result.source(), rect.min, rect.max, options))
    }

    /// Writes the directives for the rectangle `start`..`end` onto `source`.
    ///
    /// The crop height is `end.y - start.x`. Existing CDN URLs were generated
    /// with this formula, so it is kept as is even though `end.y - start.y`
    /// would be the geometric height.
    pub fn build_url(
        &self,
        source: &str,
        start: Point,
        end: Point,
        options: &CropOptions,
    ) -> String {
        let mut foreground = QueryUrl::parse(source);
        foreground.set(
            "crop",
            format!(
                "{}:{};{},{}",
                end.x.saturating_sub(start.x),
                end.y.saturating_sub(start.x),
                start.x,
                start.y
            ),
        );
        foreground.set("resize", format!("{}:{}", options.width(), options.height()));

        let Some(background_url) = options.background.as_deref() else {
            return foreground.to_string();
        };

        foreground.set("composite-to", options.composite_to());
        let mut background = QueryUrl::parse(background_url);
        background.set(
            "resize",
            format!("{}:{}", options.bg_width(), options.bg_height()),
        );
        format!("{foreground}|{background}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn result(source: &str, points: &[(i64, i64)]) -> DetectionResult {
        DetectionResult::new(
            source,
            points.iter().copied().map(Point::from).collect(),
            Value::Null,
        )
    }

    #[test]
    fn build_url_for_explicit_corners() {
        let url = AkamaiCrop.build_url(
            "https://example.com/test.jpg",
            Point::new(10, 20),
            Point::new(30, 40),
            &CropOptions::default(),
        );
        assert_eq!(url, "https://example.com/test.jpg?crop=20:30%3B10,20&resize=*:*");
    }

    #[test]
    fn encode_bounds_the_detected_points() {
        let detected = result(
            "https://example.com/example.jpg",
            &[(20, 30), (25, 24), (29, 21)],
        );
        let url = AkamaiCrop
            .encode(&detected, &CropOptions::default())
            .expect("encode");
        assert_eq!(url, "https://example.com/example.jpg?crop=9:10%3B20,21&resize=*:*");
    }

    #[test]
    fn encode_without_points_is_an_error() {
        let err = AkamaiCrop
            .encode(&result("https://example.com/a.jpg", &[]), &CropOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            FaceCropError::EmptyPoints { ref locator } if locator == "https://example.com/a.jpg"
        ));
    }

    #[test]
    fn explicit_resize_dimensions() {
        let options = CropOptions {
            width: Some("200".into()),
            height: Some("100".into()),
            ..Default::default()
        };
        let url = AkamaiCrop.build_url("a.jpg", Point::new(0, 0), Point::new(4, 4), &options);
        assert_eq!(url, "a.jpg?crop=4:4%3B0,0&resize=200:100");
    }

    #[test]
    fn negative_offsets_pass_through() {
        let url = AkamaiCrop.build_url(
            "https://x/y.jpg",
            Point::new(-5, -2),
            Point::new(5, 8),
            &CropOptions::default(),
        );
        assert_eq!(url, "https://x/y.jpg?crop=10:13%3B-5,-2&resize=*:*");
    }

    #[test]
    fn composite_onto_background() {
        let options = CropOptions {
            background: Some("https://example.com/bg.jpg".into()),
            bg_width: Some("800".into()),
            ..Default::default()
        };
        let url = AkamaiCrop.build_url(
            "https://example.com/fg.jpg",
            Point::new(10, 20),
            Point::new(30, 40),
            &options,
        );
        assert_eq!(
            url,
            "https://example.com/fg.jpg?crop=20:30%3B10,20&resize=*:*&composite-to=*.*\
             |https://example.com/bg.jpg?resize=800:*"
        );
    }

    #[test]
    fn composite_placement_is_overridable() {
        let options = CropOptions {
            background: Some("bg.png".into()),
            composite_to: Some("0,0".into()),
            ..Default::default()
        };
        let url = AkamaiCrop.build_url("fg.png", Point::new(1, 1), Point::new(2, 2), &options);
        assert_eq!(
            url,
            "fg.png?crop=1:1%3B1,1&resize=*:*&composite-to=0,0|bg.png?resize=*:*"
        );
    }

    #[test]
    fn signed_source_params_are_left_alone() {
        let url = AkamaiCrop.build_url(
            "https://cdn.example/a.jpg?flag&sig=a%2Fb%3D&resize=9:9",
            Point::new(0, 0),
            Point::new(4, 4),
            &CropOptions::default(),
        );
        assert_eq!(
            url,
            "https://cdn.example/a.jpg?flag&sig=a%2Fb%3D&resize=*:*&crop=4:4%3B0,0"
        );
    }
}
