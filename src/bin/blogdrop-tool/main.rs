use clap::Parser;

use crate::preview::preview_cmd;
use crate::sample_config::sample_config_cmd;

mod preview;
mod sample_config;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
enum Args {
    /// Write a sample blogdrop.toml
    SampleConfig(SampleConfigArgs),
    /// Render a post page locally, without publishing it
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct SampleConfigArgs {
    /// Where to write the configuration. Defaults to stdout
    #[arg(short, long)]
    out_file: Option<String>,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct PreviewArgs {
    /// Title of the post
    #[arg(short, long)]
    title: String,

    /// File with the HTML content of the post
    #[arg(short, long)]
    content_file: String,

    /// Publication date, as YYYY-MM-DD. Defaults to today
    #[arg(short, long)]
    date: Option<String>,

    /// Where to write the page. Defaults to stdout
    #[arg(short, long)]
    out_file: Option<String>,
}

fn main() {
    let args = Args::parse();

    let res = match args {
        Args::SampleConfig(args) => sample_config_cmd(args),
        Args::Preview(args) => preview_cmd(args),
    };

    if let Err(e) = res {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
