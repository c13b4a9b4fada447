//! Image loader collaborator.
//!
//! The engine only needs the natural pixel size of a picture's image. An
//! [`ImageProbe`] reports it for a [`PictureSource`]; decoding and fetching
//! stay with the embedding application. `ImageFileProbe` reads local files
//! via the `image` crate and is available with the `image-io` feature.

use crate::geometry::NaturalSize;
use crate::item::PictureSource;
use crate::util::NorthFitResult;

/// Reports the natural pixel size of an image source.
pub trait ImageProbe {
    fn natural_size(&self, source: &PictureSource) -> NorthFitResult<NaturalSize>;
}

/// Reads dimensions of local image files from their headers.
///
/// Remote sources are rejected; fetching them is left to the caller.
#[cfg(feature = "image-io")]
#[derive(Copy, Clone, Debug, Default)]
pub struct ImageFileProbe;

#[cfg(feature = "image-io")]
impl ImageProbe for ImageFileProbe {
    fn natural_size(&self, source: &PictureSource) -> NorthFitResult<NaturalSize> {
        use crate::util::NorthFitError;

        match source {
            PictureSource::Local(path) => {
                let (width, height) =
                    image::image_dimensions(path).map_err(|err| NorthFitError::ImageIo {
                        reason: err.to_string(),
                    })?;
                Ok(NaturalSize::new(width, height))
            }
            PictureSource::Remote(uri) => Err(NorthFitError::ImageIo {
                reason: format!("remote source {uri} must be fetched by the caller"),
            }),
        }
    }
}

#[cfg(all(test, feature = "image-io"))]
mod tests {
    use super::*;
    use crate::util::NorthFitError;

    #[test]
    fn reads_png_header() {
        let path = std::env::temp_dir().join(format!("northfit-probe-{}.png", std::process::id()));
        image::GrayImage::new(7, 3).save(&path).unwrap();
        let size = ImageFileProbe
            .natural_size(&PictureSource::Local(path.clone()))
            .unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(size, NaturalSize::new(7, 3));
    }

    #[test]
    fn remote_and_missing_sources_fail() {
        let remote = PictureSource::Remote("https://example.org/a.png".into());
        assert!(matches!(
            ImageFileProbe.natural_size(&remote),
            Err(NorthFitError::ImageIo { .. })
        ));
        let missing = PictureSource::Local("/nonexistent/northfit.png".into());
        assert!(ImageFileProbe.natural_size(&missing).is_err());
    }
}
