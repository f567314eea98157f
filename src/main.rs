//! docweave - compile and post-process a documentation tree

use std::process::ExitCode;

use clap::Parser;

use docweave::{BootstrapTransformer, ImageEmbedTransformer, ProjectGenerator};

#[derive(Parser)]
#[command(name = "docweave")]
#[command(version, about = "Compile a documentation tree into embeddable pages", long_about = None)]
#[command(after_help = "EXAMPLES:
    docweave docs/ -c config/        Compile docs/ and list the pages
    docweave docs/ -c config/ --json Dump the full project as JSON")]
struct Cli {
    /// Documentation source directory
    #[arg(value_name = "SOURCE")]
    source: String,

    /// Compiler config directory
    #[arg(short, long, value_name = "DIR")]
    config: String,

    /// Documentation compiler executable
    #[arg(long, default_value = "sphinx-build")]
    compiler: String,

    /// Print the generated project as JSON
    #[arg(long)]
    json: bool,

    /// Suppress the page summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), docweave::Error> {
    let mut generator = ProjectGenerator::new(&cli.compiler, &cli.config)?;
    generator.add_transformer(Box::new(BootstrapTransformer::new()));
    generator.add_transformer(Box::new(ImageEmbedTransformer::new()));

    let project = generator.generate(&cli.source)?;

    if cli.json {
        let rendered = serde_json::to_string_pretty(&project)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        println!("{rendered}");
    } else if !cli.quiet {
        for page in &project {
            println!("{:40} {}", page.path(), page.title());
        }
        println!("{} pages", project.len());
    }

    Ok(())
}
