use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, debug};

use crate::classifier::{Classifier, ClassifierDescription};
use crate::embedding::{convex_combination, embed_label, WordEmbedding};
use crate::knn::{knn_search, EmbeddedLabel};
use crate::labels::LabelTable;
use crate::report::report_batch;
use crate::store::{is_synset_id, SynsetMap};
use super::types::{TaggedImage, TaggerError, TaggerOptions};

/// Zero-shot image tagger.
///
/// Classifies an image, embeds the top predictions in word vector space and
/// returns the registered labels closest to that point. Registered labels
/// may be words the classifier was never trained on.
pub struct Tagger {
    classifier: Box<dyn Classifier>,
    description: Option<&'static ClassifierDescription>,
    labels: Arc<LabelTable>,
    embedding: Option<Box<dyn WordEmbedding>>,
    synsets: Option<SynsetMap>,
    options: TaggerOptions,
}

impl Tagger {
    pub fn new(
        classifier: Box<dyn Classifier>,
        labels: Arc<LabelTable>,
        options: TaggerOptions,
    ) -> Self {
        Self {
            classifier,
            description: None,
            labels,
            embedding: None,
            synsets: None,
            options,
        }
    }

    /// Validates classifier output against a registered model description.
    pub fn with_description(mut self, description: &'static ClassifierDescription) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_embedding(mut self, embedding: Box<dyn WordEmbedding>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Lets registered synset ids be embedded through their lemmas.
    pub fn with_synsets(mut self, synsets: SynsetMap) -> Self {
        self.synsets = Some(synsets);
        self
    }

    /// Places the registered labels in vector space.
    ///
    /// This happens per run rather than at registration time so the word
    /// vector model can change without re-registering labels.
    pub fn embed_known_labels(&self, registered: &[String]) -> Result<Vec<EmbeddedLabel>, TaggerError> {
        let embedding = self.embedding.as_deref().ok_or(TaggerError::NoWordVectors)?;

        let embedded: Vec<EmbeddedLabel> = registered
            .iter()
            .filter_map(|label| {
                let words = self.resolve(label)?;
                match embed_label(embedding, words) {
                    Some(vector) => Some(EmbeddedLabel::new(label.clone(), vector)),
                    None => {
                        warn!("Label {} is not known to the word vector model", label);
                        None
                    }
                }
            })
            .collect();

        if embedded.is_empty() {
            return Err(TaggerError::NoLabels);
        }
        Ok(embedded)
    }

    /// The words a registered label stands for; synset ids map to lemmas.
    fn resolve<'a>(&'a self, label: &'a str) -> Option<&'a str> {
        if !is_synset_id(label) {
            return Some(label);
        }
        let lemmas = self.synsets.as_ref().and_then(|s| s.lemmas(label));
        if lemmas.is_none() {
            warn!("Synset {} cannot be resolved without a matching synset mapping", label);
        }
        lemmas
    }

    /// Tags a single image or every file in a directory.
    ///
    /// # Arguments
    ///
    /// * `input` - Image file or directory of images
    /// * `registered` - Labels the user registered for zero-shot tagging
    pub fn tag(&self, input: &Path, registered: &[String]) -> Result<Vec<TaggedImage>, TaggerError> {
        if let Some(description) = self.description {
            description.check_labels(&self.labels)?;
        }
        let images = collect_inputs(input)?;

        let space = if self.options.raw_classifier_results {
            Vec::new()
        } else {
            self.embed_known_labels(registered)?
        };

        images
            .into_iter()
            .map(|image| self.tag_one(image, &space))
            .collect()
    }

    fn tag_one(&self, image: PathBuf, space: &[EmbeddedLabel]) -> Result<TaggedImage, TaggerError> {
        info!("Tagging {}", image.display());

        let predictions = self.classifier.predict(&image)?;
        if let Some(description) = self.description {
            description.check_output(&predictions)?;
        }
        let predictions = match self.options.confidence {
            Some(confidence) => {
                let mut all = report_batch(predictions.view(), &self.labels, predictions.ncols())?;
                all.retain(|p| p.score > confidence);
                all
            }
            None => report_batch(predictions.view(), &self.labels, self.options.top_k)?,
        };
        debug!("Top prediction: {:?}", predictions.first());

        if self.options.raw_classifier_results {
            return Ok(TaggedImage { filename: image, predictions, tags: Vec::new() });
        }
        if predictions.is_empty() {
            warn!("No prediction for {} is above the confidence threshold", image.display());
            return Ok(TaggedImage { filename: image, predictions, tags: Vec::new() });
        }

        let embedding = self.embedding.as_deref().ok_or(TaggerError::NoWordVectors)?;
        let vector = convex_combination(&predictions, embedding)?;
        let tags = knn_search(space, &[vector], self.options.neighbours, self.options.distance)
            .into_iter()
            .next()
            .unwrap_or_default();

        Ok(TaggedImage { filename: image, predictions, tags })
    }
}

/// Expands the input into a sorted list of files.
fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>, TaggerError> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(TaggerError::InvalidInput(input.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && !path
                    .file_name()
                    .map_or(true, |name| name.to_string_lossy().starts_with('.'))
        })
        .collect();
    files.sort();

    info!("Found {} files in {}", files.len(), input.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use crate::classifier::{registry, ClassifierError};
    use crate::embedding::InMemoryEmbedding;
    use crate::knn::distance::cosine;

    struct FixedClassifier(Array2<f32>);

    impl Classifier for FixedClassifier {
        fn predict(&self, _input: &Path) -> Result<Array2<f32>, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    fn options(raw: bool) -> TaggerOptions {
        TaggerOptions {
            top_k: 2,
            neighbours: 1,
            raw_classifier_results: raw,
            confidence: None,
            distance: cosine,
        }
    }

    fn labels() -> Arc<LabelTable> {
        Arc::new(LabelTable::new(vec!["tabby".into(), "beagle".into(), "goldfish".into()]))
    }

    fn embedding() -> Box<dyn WordEmbedding> {
        let mut e = InMemoryEmbedding::new(2);
        e.insert("tabby", vec![1.0, 0.1]).unwrap();
        e.insert("beagle", vec![0.1, 1.0]).unwrap();
        e.insert("cat", vec![1.0, 0.0]).unwrap();
        e.insert("dog", vec![0.0, 1.0]).unwrap();
        Box::new(e)
    }

    fn image() -> tempfile::NamedTempFile {
        tempfile::NamedTempFile::new().unwrap()
    }

    #[test]
    fn test_zero_shot_tags() {
        let tagger = Tagger::new(
            Box::new(FixedClassifier(array![[0.1, 0.8, 0.1]])),
            labels(),
            options(false),
        )
        .with_embedding(embedding());

        let file = image();
        let result = tagger.tag(file.path(), &["cat".into(), "dog".into()]).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].predictions[0].label, "beagle");
        assert_eq!(result[0].tags[0].label, "dog");
    }

    #[test]
    fn test_raw_mode_skips_embedding() {
        let tagger = Tagger::new(
            Box::new(FixedClassifier(array![[0.7, 0.2, 0.1]])),
            labels(),
            options(true),
        );

        let file = image();
        let result = tagger.tag(file.path(), &[]).unwrap();
        assert_eq!(result[0].predictions.len(), 2);
        assert_eq!(result[0].predictions[0].label, "tabby");
        assert!(result[0].tags.is_empty());
    }

    #[test]
    fn test_missing_word_vectors() {
        let tagger = Tagger::new(
            Box::new(FixedClassifier(array![[0.7, 0.2, 0.1]])),
            labels(),
            options(false),
        );
        let file = image();
        assert!(matches!(
            tagger.tag(file.path(), &["cat".into()]),
            Err(TaggerError::NoWordVectors)
        ));
    }

    #[test]
    fn test_no_embeddable_labels() {
        let tagger = Tagger::new(
            Box::new(FixedClassifier(array![[0.7, 0.2, 0.1]])),
            labels(),
            options(false),
        )
        .with_embedding(embedding());
        let file = image();
        assert!(matches!(
            tagger.tag(file.path(), &["unicorn".into()]),
            Err(TaggerError::NoLabels)
        ));
    }

    #[test]
    fn test_description_rejects_wrong_width() {
        let labels: Vec<String> = (0..1000).map(|i| format!("class_{}", i)).collect();
        let tagger = Tagger::new(
            Box::new(FixedClassifier(array![[0.7, 0.2, 0.1]])),
            Arc::new(LabelTable::new(labels)),
            options(true),
        )
        .with_description(registry::lookup("VGG19").unwrap());
        let file = image();
        assert!(matches!(
            tagger.tag(file.path(), &[]),
            Err(TaggerError::Classifier(ClassifierError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn test_description_rejects_shifted_label_table() {
        // ImageNetLabels.txt layout: `background` first, 1001 entries
        let mut names = vec!["background".to_string(), "tench".to_string()];
        names.extend((2..1001).map(|i| format!("class_{}", i)));
        let mut output = Array2::<f32>::zeros((1, 1000));
        output[[0, 0]] = 0.9;

        let vgg = registry::lookup("VGG19").unwrap();
        let file = image();

        let shifted = Tagger::new(
            Box::new(FixedClassifier(output.clone())),
            Arc::new(LabelTable::new(names.clone())),
            options(true),
        )
        .with_description(vgg);
        assert!(matches!(
            shifted.tag(file.path(), &[]),
            Err(TaggerError::Classifier(ClassifierError::LabelMismatch { expected: 1000, actual: 1001 }))
        ));

        let aligned = vgg.align_labels(LabelTable::new(names)).unwrap();
        let tagger = Tagger::new(Box::new(FixedClassifier(output)), Arc::new(aligned), options(true))
            .with_description(vgg);
        let result = tagger.tag(file.path(), &[]).unwrap();
        assert_eq!(result[0].predictions[0].label, "tench");
    }

    #[test]
    fn test_confidence_overrides_top_k() {
        let mut opts = options(true);
        opts.confidence = Some(0.05);
        let tagger = Tagger::new(
            Box::new(FixedClassifier(array![[0.6, 0.3, 0.1]])),
            labels(),
            opts,
        );
        let file = image();
        let result = tagger.tag(file.path(), &[]).unwrap();
        let kept: Vec<&str> = result[0].predictions.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(kept, vec!["tabby", "beagle", "goldfish"]);

        let mut opts = options(true);
        opts.confidence = Some(0.5);
        let tagger = Tagger::new(
            Box::new(FixedClassifier(array![[0.6, 0.3, 0.1]])),
            labels(),
            opts,
        );
        let result = tagger.tag(file.path(), &[]).unwrap();
        assert_eq!(result[0].predictions.len(), 1);
        assert_eq!(result[0].predictions[0].label, "tabby");
    }

    #[test]
    fn test_confidence_filters_before_embedding() {
        let mut opts = options(false);
        opts.confidence = Some(0.5);
        let tagger = Tagger::new(
            Box::new(FixedClassifier(array![[0.3, 0.6, 0.1]])),
            labels(),
            opts,
        )
        .with_embedding(embedding());
        let file = image();
        let result = tagger.tag(file.path(), &["cat".into(), "dog".into()]).unwrap();
        assert_eq!(result[0].predictions.len(), 1);
        assert_eq!(result[0].tags[0].label, "dog");

        let mut opts = options(false);
        opts.confidence = Some(0.95);
        let tagger = Tagger::new(
            Box::new(FixedClassifier(array![[0.3, 0.6, 0.1]])),
            labels(),
            opts,
        )
        .with_embedding(embedding());
        let result = tagger.tag(file.path(), &["cat".into(), "dog".into()]).unwrap();
        assert!(result[0].predictions.is_empty());
        assert!(result[0].tags.is_empty());
    }

    #[test]
    fn test_synset_ids_embedded_through_lemmas() {
        let synsets = SynsetMap::parse("n02084071 dog, domestic dog\nn02121808 domestic cat, cat").unwrap();
        let tagger = Tagger::new(
            Box::new(FixedClassifier(array![[0.1, 0.8, 0.1]])),
            labels(),
            options(false),
        )
        .with_embedding(embedding())
        .with_synsets(synsets);

        let file = image();
        let registered = vec!["n02121808".to_string(), "n02084071".to_string(), "n01440764".to_string()];
        assert_eq!(tagger.embed_known_labels(&registered).unwrap().len(), 2);

        let result = tagger.tag(file.path(), &registered).unwrap();
        assert_eq!(result[0].tags[0].label, "n02084071");
    }

    #[test]
    fn test_synset_ids_without_mapping_not_embedded() {
        let tagger = Tagger::new(
            Box::new(FixedClassifier(array![[0.1, 0.8, 0.1]])),
            labels(),
            options(false),
        )
        .with_embedding(embedding());
        assert!(matches!(
            tagger.embed_known_labels(&["n02084071".to_string()]),
            Err(TaggerError::NoLabels)
        ));
    }

    #[test]
    fn test_directory_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.jpg"), b"").unwrap();
        fs::write(dir.path().join("a.jpg"), b"").unwrap();
        fs::write(dir.path().join(".hidden"), b"").unwrap();

        let tagger = Tagger::new(
            Box::new(FixedClassifier(array![[0.7, 0.2, 0.1]])),
            labels(),
            options(true),
        );
        let result = tagger.tag(dir.path(), &[]).unwrap();
        let names: Vec<_> = result
            .iter()
            .map(|r| r.filename.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_invalid_input() {
        let tagger = Tagger::new(
            Box::new(FixedClassifier(array![[1.0]])),
            labels(),
            options(true),
        );
        assert!(matches!(
            tagger.tag(Path::new("/no/such/image.jpg"), &[]),
            Err(TaggerError::InvalidInput(_))
        ));
    }
}
