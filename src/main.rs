//! voynich-remap CLI: clean, map, transliterate and analyse a v101 transcription.

use clap::{Args, Parser, Subcommand};
use rust_voynich_remap::{
    Delimiters, OutputFormat, PipelineConfig, RemapError, ResolutionPolicy, TierSelector,
    TranslitConfig, analyze_file, clean_file_to_file, generate_identity_rules, read_file, run,
    write_file,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "voynich-remap")]
#[command(about = "Context-sensitive remapping of the v101 Voynich transcription")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StreamArgs {
    /// Input word delimiter
    #[arg(long, default_value = ".")]
    delimiter: char,

    /// Input uncertain-space delimiter
    #[arg(long, default_value = ",")]
    uncertain: char,

    /// Symbol echoed for the word delimiter
    #[arg(long, default_value = "_")]
    delimiter_out: String,

    /// Symbol echoed for the uncertain-space delimiter
    #[arg(long, default_value = "-")]
    uncertain_out: String,

    /// Terminator written after each code in the code stream
    #[arg(long, default_value = ".")]
    code_terminator: String,

    /// Tier order for input token -> code, comma separated
    #[arg(long, value_delimiter = ',')]
    encode_order: Option<Vec<TierSelector>>,

    /// Tier order for code -> output token, comma separated
    #[arg(long, value_delimiter = ',')]
    decode_order: Option<Vec<TierSelector>>,
}

impl StreamArgs {
    fn config(self) -> TranslitConfig {
        let defaults = ResolutionPolicy::default();
        TranslitConfig {
            delimiters: Delimiters {
                primary: self.delimiter,
                secondary: self.uncertain,
            },
            format: OutputFormat {
                primary: self.delimiter_out,
                secondary: self.uncertain_out,
                code_terminator: self.code_terminator,
            },
            policy: ResolutionPolicy {
                encode: self.encode_order.unwrap_or(defaults.encode),
                decode: self.decode_order.unwrap_or(defaults.decode),
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Strip annotations and line-end markers from a raw transcription
    Clean {
        /// Raw transcription (e.g. v101.txt)
        input: PathBuf,
        /// Cleaned output (e.g. v101_cleaned.txt)
        output: PathBuf,
    },

    /// Write an identity mapping file covering every character of the input
    Generate {
        /// Cleaned transcription
        input: PathBuf,

        /// Mapping file to create
        #[arg(short, long, default_value = "mapping.txt")]
        output: PathBuf,

        #[command(flatten)]
        stream: StreamArgs,
    },

    /// Transliterate the input through the mapping table and analyse the result
    Run {
        /// Mapping rule file
        #[arg(short, long, default_value = "mapping.txt")]
        mapping: PathBuf,

        /// Transcription to transliterate
        #[arg(short, long, default_value = "v101_cleaned.txt")]
        input: PathBuf,

        /// Transliterated text output
        #[arg(short, long, default_value = "output.txt")]
        output: PathBuf,

        /// Numeric code stream output
        #[arg(long, default_value = "output_numbers.txt")]
        codes: PathBuf,

        /// Analysis report output
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Folder of reference texts for corpus discovery
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Folder of Hunspell .aff/.dic dictionaries
        #[arg(long)]
        dictionaries: Option<PathBuf>,

        /// Clean the input before transliterating
        #[arg(long)]
        clean: bool,

        /// Entries per report table
        #[arg(long, default_value = "50")]
        top: usize,

        #[command(flatten)]
        stream: StreamArgs,
    },

    /// Analyse an already transliterated text
    Analyze {
        /// Transliterated text
        input: PathBuf,

        /// Report output (stdout when omitted)
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Entries per report table
        #[arg(long, default_value = "50")]
        top: usize,

        #[command(flatten)]
        stream: StreamArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Clean { input, output } => cmd_clean(&input, &output),
        Commands::Generate {
            input,
            output,
            stream,
        } => cmd_generate(&input, &output, &stream.config()),
        Commands::Run {
            mapping,
            input,
            output,
            codes,
            report,
            corpus,
            dictionaries,
            clean,
            top,
            stream,
        } => cmd_run(PipelineConfig {
            mapping,
            input,
            output,
            codes,
            report,
            corpus,
            dictionaries,
            clean,
            top,
            translit: stream.config(),
        }),
        Commands::Analyze {
            input,
            report,
            top,
            stream,
        } => cmd_analyze(&input, report.as_deref(), top, &stream.config()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_clean(input: &Path, output: &Path) -> Result<(), RemapError> {
    let (removed, bytes) = clean_file_to_file(input, output)?;
    println!("Cleaned {} ({bytes} bytes, {removed} removals)", input.display());
    println!("Output: {}", output.display());
    Ok(())
}

fn cmd_generate(input: &Path, output: &Path, config: &TranslitConfig) -> Result<(), RemapError> {
    let text = read_file(input)?;
    let (rules, skipped) = generate_identity_rules(&text, &config.delimiters);
    if !skipped.is_empty() {
        let list: Vec<String> = skipped.iter().map(|c| format!("{c:?}")).collect();
        eprintln!(
            "No identity rule for {} (rule syntax characters); they will drop out",
            list.join(", ")
        );
    }
    write_file(output, &rules)?;
    println!("Wrote {} rules to {}", rules.lines().count(), output.display());
    Ok(())
}

fn cmd_run(config: PipelineConfig) -> Result<(), RemapError> {
    let summary = run(&config)?;

    println!("Transliteration");
    println!("===============");
    println!("Rules:        {} ({} warnings)", summary.rules, summary.warnings);
    println!("Tokens:       {} ({} unmapped)", summary.tokens, summary.misses);
    println!("Words:        {}", summary.words);
    println!("Entropy:      {:.4} bits", summary.entropy);
    if config.corpus.is_some() {
        println!(
            "Corpus:       {} exact, {} fuzzy matches",
            summary.exact_matches, summary.fuzzy_matches
        );
    }
    Ok(())
}

fn cmd_analyze(
    input: &Path,
    report: Option<&Path>,
    top: usize,
    config: &TranslitConfig,
) -> Result<(), RemapError> {
    let text = analyze_file(input, config, top)?;
    match report {
        Some(path) => {
            write_file(path, &text)?;
            println!("Report: {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
