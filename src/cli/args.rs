use std::path::PathBuf;
use clap::{Parser, Subcommand};

/// Zero-shot image tagger and top-k label reporter
#[derive(Parser, Debug)]
#[command(name = "imtag", version, about)]
pub struct Cli {
    /// Settings file to use instead of config/default.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP classification server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Default number of predictions per request
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Print the top-k labels of exported model output
    Report {
        /// JSON file with a probability vector or batch
        predictions: PathBuf,
        /// Number of labels to print
        #[arg(short, long)]
        k: Option<usize>,
        /// The file holds raw logits; apply softmax first
        #[arg(long)]
        logits: bool,
    },
    /// Tag exported model output with registered labels
    Tag {
        /// Exported prediction file, or a directory of them
        input: PathBuf,
        /// Number of classifier predictions used for the embedding
        #[arg(short, long)]
        k: Option<usize>,
        /// Registered classifier the output came from
        #[arg(short, long)]
        classifier: Option<String>,
        /// Print classifier results without zero-shot tagging
        #[arg(long)]
        raw: bool,
        /// The files hold raw logits; apply softmax first
        #[arg(long)]
        logits: bool,
        /// Use every prediction scoring above this (0 < c < 1) instead of the top k
        #[arg(short = 'a', long)]
        confidence: Option<f32>,
    },
    /// Register labels for zero-shot tagging
    AddLabel {
        /// Labels or WordNet synset ids (n########)
        labels: Vec<String>,
        /// Text file with one label per line
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Check whether a label is known to the word vector model
    SearchLabel {
        /// Label, synonym list or WordNet synset id
        label: String,
    },
    /// Remove a registered label
    RemoveLabel {
        label: String,
    },
    /// List registered labels
    Labels,
    /// List classifiers known by name
    Classifiers,
}
