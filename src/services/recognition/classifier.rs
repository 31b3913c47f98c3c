use crate::error::ClassifierError;
use crate::models::recognition::Recognition;
use crate::models::region::Region;
use image::RgbaImage;

/// Classification backend for board region crops
///
/// The scanner is generic over this trait; production wires in
/// `HttpClassifier` against the local model server, tests substitute
/// scripted stubs.
#[allow(async_fn_in_trait)]
pub trait AbilityClassifier: Send + Sync {
    /// Classify one region crop from the frame
    async fn recognize(
        &self,
        frame: &RgbaImage,
        region: &Region,
    ) -> Result<Recognition, ClassifierError>;

    /// Classify many regions; the default runs them one by one
    ///
    /// Backends with a batch endpoint should override this, one round
    /// trip beats a request per slot.
    async fn recognize_batch(
        &self,
        frame: &RgbaImage,
        regions: &[Region],
    ) -> Result<Vec<Recognition>, ClassifierError> {
        let mut results = Vec::with_capacity(regions.len());
        for region in regions {
            results.push(self.recognize(frame, region).await?);
        }
        Ok(results)
    }

    /// Cheap readiness probe
    async fn health_check(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::region::{Rect, RegionOwner, SlotKind};
    use image::Rgba;

    /// Labels regions by their slot index
    struct SlotEcho;

    impl AbilityClassifier for SlotEcho {
        async fn recognize(
            &self,
            _frame: &RgbaImage,
            region: &Region,
        ) -> Result<Recognition, ClassifierError> {
            Ok(Recognition::confident(format!("slot_{}", region.slot), 0.9))
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    fn region(slot: u8) -> Region {
        Region {
            rect: Rect::new(0, 0, 8, 8),
            owner: RegionOwner::Pool { hero: 0 },
            slot,
            kind: SlotKind::Standard,
        }
    }

    #[test]
    fn test_default_batch_preserves_order() {
        let frame = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
        let regions = vec![region(2), region(0), region(1)];

        let results =
            tokio_test::block_on(SlotEcho.recognize_batch(&frame, &regions)).unwrap();

        let labels: Vec<_> = results.iter().map(|r| r.label.clone().unwrap()).collect();
        assert_eq!(labels, vec!["slot_2", "slot_0", "slot_1"]);
    }

    #[test]
    fn test_default_batch_empty_input() {
        let frame = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
        let results = tokio_test::block_on(SlotEcho.recognize_batch(&frame, &[])).unwrap();
        assert!(results.is_empty());
    }
}
