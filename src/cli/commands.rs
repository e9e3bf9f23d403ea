use std::fs;
use std::path::Path;
use std::sync::Arc;
use anyhow::{anyhow, bail, Context, Result};
use colored::*;
use reqwest::Client;
use tracing::info;

use imtag::classifier::{registry, Classifier, PrecomputedClassifier};
use imtag::config::{validate_confidence, Settings};
use imtag::embedding::{find_label, SkipGramModel};
use imtag::knn::distance;
use imtag::labels::{CachedLabelSource, FileLabelSource, LabelTable};
use imtag::report::report_batch;
use imtag::server::ApiServer;
use imtag::store::{is_synset_id, LabelStore, SynsetMap};
use imtag::tagger::{Tagger, TaggerOptions};

use super::args::Command;
use super::display;

/// Loads the label table, downloading and caching it first when no local
/// file is configured.
pub async fn load_labels(settings: &Settings) -> Result<LabelTable> {
    load_label_file(settings, &settings.labels.file_name).await
}

/// Like `load_labels`, caching the download under `file_name`.
async fn load_label_file(settings: &Settings, file_name: &str) -> Result<LabelTable> {
    let table = match &settings.labels.file {
        Some(path) => LabelTable::load(&FileLabelSource::new(path))
            .with_context(|| format!("Failed to read labels from {}", path.display()))?,
        None => {
            let source = CachedLabelSource::new(
                settings.labels.url.clone(),
                &settings.labels.cache_dir,
                file_name,
            );
            source.download(&Client::new()).await?;
            LabelTable::load(&source)?
        }
    };
    info!("Label table holds {} labels", table.len());
    Ok(table)
}

pub async fn run(command: Command, mut settings: Settings) -> Result<()> {
    match command {
        Command::Serve { host, port, k } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            let k = k.unwrap_or(settings.reporter.top_k);
            if k == 0 {
                bail!("k must be greater than 0");
            }

            let labels = Arc::new(load_labels(&settings).await?);
            println!("{}", settings.server.welcome_message().bright_cyan());
            let server = ApiServer::new(settings.server.clone(), labels, k);
            server.start().await.map_err(|e| anyhow!("Server error: {}", e))?;
        }
        Command::Report { predictions, k, logits } => {
            let labels = load_labels(&settings).await?;
            let k = k.unwrap_or(settings.reporter.top_k);

            let batch = PrecomputedClassifier::new(logits).predict(&predictions)?;
            let result = report_batch(batch.view(), &labels, k)?;
            display::print_report(&result);
        }
        Command::Tag { input, k, classifier, raw, logits, confidence } => {
            tag(&settings, &input, k, classifier, raw, logits, confidence).await?;
        }
        Command::AddLabel { labels, file } => {
            add_labels(&settings, labels, file.as_deref())?;
        }
        Command::SearchLabel { label } => {
            search_label(&settings, &label)?;
        }
        Command::RemoveLabel { label } => {
            let mut store = LabelStore::open(&settings.tagger.label_store)?;
            if store.remove(&label) {
                store.save()?;
                println!("{}", format!("Removed label {}", label).bright_green());
            } else {
                println!("{}", format!("Label {} is not registered", label).yellow());
            }
        }
        Command::Labels => {
            let store = LabelStore::open(&settings.tagger.label_store)?;
            display::display_stored_labels(store.labels());
        }
        Command::Classifiers => {
            let descriptions = registry::known_names()
                .into_iter()
                .map(registry::lookup)
                .collect::<Result<Vec<_>, _>>()?;
            display::display_classifiers(&descriptions);
        }
    }
    Ok(())
}

async fn tag(
    settings: &Settings,
    input: &Path,
    k: Option<usize>,
    classifier: Option<String>,
    raw: bool,
    logits: bool,
    confidence: Option<f32>,
) -> Result<()> {
    let classifier = classifier.unwrap_or_else(|| settings.tagger.classifier.clone());
    let description = registry::lookup(&classifier)?;
    let raw = raw || settings.tagger.raw_classifier_results;
    let distance = distance::by_name(&settings.tagger.distance)
        .ok_or_else(|| anyhow!("Unknown distance {}", settings.tagger.distance))?;
    let confidence = confidence.or(settings.tagger.confidence);
    if let Some(confidence) = confidence {
        validate_confidence(confidence)?;
    }

    let labels = load_label_file(settings, description.label_file).await?;
    let labels = Arc::new(description.align_labels(labels)?);
    let options = TaggerOptions {
        top_k: k.unwrap_or(settings.reporter.top_k),
        neighbours: settings.tagger.neighbours,
        raw_classifier_results: raw,
        confidence,
        distance,
    };

    let mut tagger = Tagger::new(Box::new(PrecomputedClassifier::new(logits)), labels, options)
        .with_description(description);

    let registered: Vec<String> = if raw {
        Vec::new()
    } else {
        let model = SkipGramModel::load(&settings.tagger.word_vectors).with_context(|| {
            format!("Failed to load word vectors from {}", settings.tagger.word_vectors.display())
        })?;
        tagger = tagger.with_embedding(Box::new(model));
        if let Some(synsets) = load_synsets(settings)? {
            tagger = tagger.with_synsets(synsets);
        }

        let store = LabelStore::open(&settings.tagger.label_store)?;
        if store.is_empty() {
            bail!("No labels registered, use `imtag add-label` first");
        }
        store.labels().iter().map(|l| l.label.clone()).collect()
    };

    let images = tagger.tag(input, &registered)?;
    display::display_tagged_images(&images);
    Ok(())
}

fn add_labels(settings: &Settings, mut labels: Vec<String>, file: Option<&Path>) -> Result<()> {
    if let Some(file) = file {
        let content = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        labels.extend(LabelTable::parse(&content).into_iter().filter(|l| !l.trim().is_empty()));
    }
    if labels.is_empty() {
        bail!("label must not be empty");
    }

    let synsets = load_synsets(settings)?;
    let mut store = LabelStore::open(&settings.tagger.label_store)?;
    let mut added = 0;
    for label in &labels {
        if store.register(label, synsets.as_ref())? {
            added += 1;
        } else {
            println!("{}", format!("Label {} is already registered", label.trim()).yellow());
        }
    }
    store.save()?;

    println!("{}", format!("Registered {} new label{}", added, if added == 1 { "" } else { "s" }).bright_green());
    Ok(())
}

fn load_synsets(settings: &Settings) -> Result<Option<SynsetMap>> {
    settings
        .tagger
        .synsets
        .as_deref()
        .map(|path| {
            SynsetMap::load(path)
                .with_context(|| format!("Failed to read synset mapping from {}", path.display()))
        })
        .transpose()
}

fn search_label(settings: &Settings, label: &str) -> Result<()> {
    let label = label.trim();
    let words = if is_synset_id(label) {
        let synsets = load_synsets(settings)?
            .ok_or_else(|| anyhow!("Set tagger.synsets to look up synset ids"))?;
        match synsets.lemmas(label) {
            Some(lemmas) => {
                println!("{}", format!("Synset {} is {}", label, lemmas).bright_cyan());
                lemmas.to_string()
            }
            None => {
                println!("{}", format!("Synset {} is not in the synset mapping", label).yellow());
                return Ok(());
            }
        }
    } else {
        label.to_string()
    };

    let model = SkipGramModel::load(&settings.tagger.word_vectors).with_context(|| {
        format!("Failed to load word vectors from {}", settings.tagger.word_vectors.display())
    })?;
    match find_label(&model, &words) {
        Some((word, _)) => println!(
            "{}",
            format!("Label {} found in word vectors as {}", label, word).bright_green()
        ),
        None => println!("{}", format!("Label {} is not known to the word vector model", label).yellow()),
    }
    Ok(())
}
