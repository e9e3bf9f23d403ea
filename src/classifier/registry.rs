use std::collections::HashMap;
use once_cell::sync::Lazy;

use super::types::{ClassifierDescription, ClassifierError};

// 1001 entries, `background` first
const IMAGENET_LABELS: &str = "ImageNetLabels.txt";

// Models are referred to by name so users do not have to pass paths and
// graph node names around.
static KNOWN_CLASSIFIERS: Lazy<HashMap<&'static str, ClassifierDescription>> = Lazy::new(|| {
    let descriptions = [
        ClassifierDescription {
            name: "VGG19",
            model_file: "frozen_vgg_19.pb",
            input_tag: "input",
            output_tag: "vgg_19/fc8/squeezed",
            label_file: IMAGENET_LABELS,
            skip_labels: 1,
            num_labels: 1000,
        },
        ClassifierDescription {
            name: "resnet_v2_152",
            model_file: "frozen_resnet_v2_152.pb",
            input_tag: "input",
            output_tag: "resnet_v2_152/predictions/Reshape_1",
            label_file: IMAGENET_LABELS,
            skip_labels: 0,
            num_labels: 1001,
        },
    ];

    descriptions.into_iter().map(|d| (d.name, d)).collect()
});

/// Looks up a registered classifier by name.
pub fn lookup(name: &str) -> Result<&'static ClassifierDescription, ClassifierError> {
    KNOWN_CLASSIFIERS
        .get(name)
        .ok_or_else(|| ClassifierError::UnknownClassifier(name.to_string()))
}

/// Names of all registered classifiers, sorted.
pub fn known_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = KNOWN_CLASSIFIERS.keys().copied().collect();
    names.sort_unstable();
    names
}
