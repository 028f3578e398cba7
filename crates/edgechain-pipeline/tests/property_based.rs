#![allow(clippy::unwrap_used)]

use edgechain_pipeline::blur::{gaussian_filter_chained, gaussian_filter_flat};
use edgechain_pipeline::edge::{sobel_filter_chained, sobel_filter_flat};
use edgechain_pipeline::window::is_border;
use edgechain_pipeline::{
    ChainedImage, Dimensions, EdgeConfig, FlatImage, GRAYSCALE_BLACK, GRAYSCALE_WHITE, Kernel3x3,
    edge_detection_chained, edge_detection_flat,
};
use proptest::prelude::*;

/// Random image of 1..=24 by 1..=24 pixels with the given component count.
fn image_strategy(components: usize) -> impl Strategy<Value = FlatImage> {
    (1usize..=24, 1usize..=24).prop_flat_map(move |(w, h)| {
        proptest::collection::vec(any::<u8>(), w * h * components).prop_map(move |data| {
            FlatImage::from_raw(Dimensions::new(w, h), components, data).unwrap()
        })
    })
}

fn blur_both(input: &FlatImage) -> (FlatImage, FlatImage) {
    let mut flat = FlatImage::new(input.dimensions(), 1).unwrap();
    gaussian_filter_flat(input, &mut flat, &Kernel3x3::GAUSSIAN);
    let mut chained = ChainedImage::new(input.dimensions(), 1).unwrap();
    gaussian_filter_chained(&ChainedImage::from_flat(input), &mut chained, &Kernel3x3::GAUSSIAN);
    (flat, chained.to_flat())
}

fn sobel_both(input: &FlatImage) -> (FlatImage, FlatImage) {
    let threshold = EdgeConfig::DEFAULT_THRESHOLD;
    let mut flat = FlatImage::new(input.dimensions(), 1).unwrap();
    sobel_filter_flat(
        input,
        &mut flat,
        &Kernel3x3::SOBEL_VERTICAL,
        &Kernel3x3::SOBEL_HORIZONTAL,
        threshold,
    );
    let mut chained = ChainedImage::new(input.dimensions(), 1).unwrap();
    sobel_filter_chained(
        &ChainedImage::from_flat(input),
        &mut chained,
        &Kernel3x3::SOBEL_VERTICAL,
        &Kernel3x3::SOBEL_HORIZONTAL,
        threshold,
    );
    (flat, chained.to_flat())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_blur_forms_agree_and_keep_border(input in image_strategy(1)) {
        let (flat, chained) = blur_both(&input);
        prop_assert_eq!(&flat, &chained);
        let dims = input.dimensions();
        for i in (0..dims.pixel_count()).filter(|&i| is_border(i, dims)) {
            prop_assert_eq!(flat.data()[i], input.data()[i]);
        }
    }

    #[test]
    fn prop_sobel_forms_agree_keep_border_and_binarize(input in image_strategy(1)) {
        let (flat, chained) = sobel_both(&input);
        prop_assert_eq!(&flat, &chained);
        let dims = input.dimensions();
        for i in 0..dims.pixel_count() {
            let v = flat.data()[i];
            if is_border(i, dims) {
                prop_assert_eq!(v, input.data()[i]);
            } else {
                prop_assert!(v == GRAYSCALE_WHITE || v == GRAYSCALE_BLACK);
            }
        }
    }

    #[test]
    fn prop_full_pipelines_agree(input in image_strategy(3)) {
        let config = EdgeConfig::default();
        let flat = edge_detection_flat(&input, &config).unwrap();
        let chained = edge_detection_chained(&ChainedImage::from_flat(&input), &config).unwrap();
        prop_assert_eq!(chained.node_count(), input.dimensions().pixel_count());
        prop_assert_eq!(chained.to_flat(), flat);
    }

    #[test]
    fn prop_flat_field_blur_noop_sobel_black(
        w in 1usize..=20,
        h in 1usize..=20,
        value in any::<u8>(),
    ) {
        let input = FlatImage::from_raw(Dimensions::new(w, h), 1, vec![value; w * h]).unwrap();
        let (blurred, _) = blur_both(&input);
        prop_assert_eq!(&blurred, &input);

        let (edges, _) = sobel_both(&input);
        let dims = input.dimensions();
        for i in (0..w * h).filter(|&i| !is_border(i, dims)) {
            prop_assert_eq!(edges.data()[i], GRAYSCALE_BLACK);
        }
    }

    #[test]
    fn prop_chain_round_trip(input in image_strategy(3)) {
        let chained = ChainedImage::from_flat(&input);
        prop_assert_eq!(chained.node_count(), input.dimensions().pixel_count());
        prop_assert_eq!(chained.to_flat(), input);
    }
}
