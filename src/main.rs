//! Segmental K-Means CLI
//!
//! Trains an HMM on a CSV corpus of observation sequences and decodes
//! state paths under a trained model.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use segmental_hmm::{
    data::Corpus,
    learn::SegmentalKMeans,
    models::{viterbi, GaussianFactory, Hmm, MultivariateGaussian},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "segmental-hmm")]
#[command(about = "Segmental K-Means initialization for hidden Markov models")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an HMM on a corpus of observation sequences
    Train {
        /// Input corpus CSV (sequence,x0,...,xD columns)
        #[arg(short, long)]
        input: String,

        /// Number of hidden states
        #[arg(short = 'n', long, default_value = "3")]
        states: usize,

        /// Iteration cap (default: run to the fixed point)
        #[arg(long)]
        max_iter: Option<usize>,

        /// Seed for the initial partition (default: random)
        #[arg(long)]
        seed: Option<u64>,

        /// Where to write the trained model as JSON
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print Viterbi state paths for a corpus under a trained model
    Decode {
        /// Input corpus CSV
        #[arg(short, long)]
        input: String,

        /// Trained model JSON
        #[arg(short, long)]
        model: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("segmental_hmm=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            input,
            states,
            max_iter,
            seed,
            output,
        } => train(&input, states, max_iter, seed, output.as_deref()),
        Commands::Decode { input, model } => decode(&input, &model),
    }
}

fn train(
    input: &str,
    states: usize,
    max_iter: Option<usize>,
    seed: Option<u64>,
    output: Option<&str>,
) -> Result<()> {
    println!("{}", "Loading corpus...".cyan());
    let corpus = Corpus::from_csv(input)?;
    if corpus.is_empty() {
        anyhow::bail!("corpus {} holds no sequences", input);
    }
    println!(
        "Loaded {} sequences ({} observations)",
        corpus.n_sequences(),
        corpus.n_observations()
    );

    let dim = corpus.observation(0).len();
    let factory = GaussianFactory::new(dim);

    let mut learner = match seed {
        Some(seed) => SegmentalKMeans::seeded(states, factory, &corpus, seed)?,
        None => SegmentalKMeans::new(states, factory, &corpus)?,
    };
    if let Some(cap) = max_iter {
        learner = learner.with_max_iterations(cap);
    }

    println!("{}", format!("Training {}-state HMM...", states).cyan());
    let hmm = learner.learn();

    if learner.is_terminated() {
        println!(
            "{}",
            format!("Reached a fixed point after {} iterations", learner.iterations()).green()
        );
    } else {
        println!(
            "{}",
            format!("Stopped at the iteration cap ({} iterations)", learner.iterations())
                .yellow()
        );
    }

    print_model(&hmm);

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&hmm)?)?;
        println!("{}", format!("Saved model to {}", path).green());
    }

    Ok(())
}

fn print_model(hmm: &Hmm<MultivariateGaussian>) {
    println!("\nInitial distribution:");
    print!(" ");
    for i in 0..hmm.n_states() {
        print!(" {:.3}", hmm.pi(i));
    }
    println!();

    println!("\nTransition matrix:");
    for i in 0..hmm.n_states() {
        print!("  State {}: ", i);
        for j in 0..hmm.n_states() {
            print!("{:.3}  ", hmm.aij(i, j));
        }
        println!();
    }

    println!("\nState means:");
    for i in 0..hmm.n_states() {
        println!("  State {}: {:.4}", i, hmm.opdf(i).mean);
    }
}

fn decode(input: &str, model_path: &str) -> Result<()> {
    let corpus = Corpus::from_csv(input)?;
    let hmm: Hmm<MultivariateGaussian> =
        serde_json::from_str(&std::fs::read_to_string(model_path)?)?;

    for (s, sequence) in corpus.sequences().enumerate() {
        let (path, log_prob) = viterbi(sequence, &hmm);
        let states: Vec<String> = path.iter().map(|state| state.to_string()).collect();
        println!("seq {:>3} (logp {:>10.3}): {}", s, log_prob, states.join(" "));
    }

    Ok(())
}
