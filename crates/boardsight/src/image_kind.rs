use std::fmt;

use boardsight_core::{edge_density, mean_saturation, RgbImageView};
use boardsight_fusion::DetectorRole;
use log::debug;
use serde::{Deserialize, Serialize};

/// Visual domain of a board image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    /// Flat rendered diagram: few edges or saturated colors.
    #[serde(rename = "diagram_2d")]
    Diagram2d,
    /// Photo of a physical board.
    #[serde(rename = "photo_3d")]
    Photo3d,
}

impl ImageKind {
    /// Role best suited to this kind of image.
    pub fn preferred_role(self) -> DetectorRole {
        match self {
            ImageKind::Diagram2d => DetectorRole::Specialist,
            ImageKind::Photo3d => DetectorRole::Generalist,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageKind::Diagram2d => "2d diagram",
            ImageKind::Photo3d => "3d photo",
        })
    }
}

fn default_edge_density_max() -> f32 {
    0.15
}

fn default_saturation_min() -> f32 {
    100.0
}

fn default_edge_magnitude() -> f32 {
    150.0
}

/// Thresholds of the diagram/photo heuristic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageKindParams {
    /// Below this fraction of edge pixels the image is a diagram.
    #[serde(default = "default_edge_density_max")]
    pub edge_density_max: f32,
    /// Above this mean HSV saturation (0..255) the image is a diagram.
    #[serde(default = "default_saturation_min")]
    pub saturation_min: f32,
    /// Gradient magnitude that counts as an edge.
    #[serde(default = "default_edge_magnitude")]
    pub edge_magnitude: f32,
}

impl Default for ImageKindParams {
    fn default() -> Self {
        Self {
            edge_density_max: default_edge_density_max(),
            saturation_min: default_saturation_min(),
            edge_magnitude: default_edge_magnitude(),
        }
    }
}

/// Classify an image as a 2D diagram or a 3D photo.
pub fn classify_image(image: &RgbImageView<'_>, params: &ImageKindParams) -> ImageKind {
    let density = edge_density(image, params.edge_magnitude);
    let saturation = mean_saturation(image);
    let kind = if density < params.edge_density_max || saturation > params.saturation_min {
        ImageKind::Diagram2d
    } else {
        ImageKind::Photo3d
    };
    debug!("edge density {density:.3}, mean saturation {saturation:.1}: {kind}");
    kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardsight_core::RgbImage;

    fn image_from(width: usize, height: usize, px: impl Fn(usize, usize) -> [u8; 3]) -> RgbImage {
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&px(x, y));
            }
        }
        RgbImage::new(width, height, data).expect("image")
    }

    #[test]
    fn flat_image_is_a_diagram() {
        let img = image_from(32, 32, |_, _| [128, 128, 128]);
        assert_eq!(
            classify_image(&img.view(), &ImageKindParams::default()),
            ImageKind::Diagram2d
        );
    }

    #[test]
    fn busy_grey_image_is_a_photo() {
        let img = image_from(32, 32, |x, _| if x % 4 < 2 { [0, 0, 0] } else { [255, 255, 255] });
        assert_eq!(
            classify_image(&img.view(), &ImageKindParams::default()),
            ImageKind::Photo3d
        );
    }

    #[test]
    fn saturated_busy_image_is_a_diagram() {
        let img = image_from(32, 32, |x, _| if x % 4 < 2 { [255, 0, 0] } else { [0, 0, 255] });
        let params = ImageKindParams {
            edge_magnitude: 1.0,
            ..ImageKindParams::default()
        };
        assert_eq!(classify_image(&img.view(), &params), ImageKind::Diagram2d);
    }

    #[test]
    fn preferred_roles() {
        assert_eq!(ImageKind::Diagram2d.preferred_role(), DetectorRole::Specialist);
        assert_eq!(ImageKind::Photo3d.preferred_role(), DetectorRole::Generalist);
        let json = serde_json::to_string(&ImageKind::Photo3d).expect("json");
        assert_eq!(json, "\"photo_3d\"");
    }
}
