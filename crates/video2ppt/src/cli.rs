use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use video2ppt_core::Locale;

#[derive(Parser, Debug)]
#[command(
    name = "video2ppt",
    version,
    about = "Convert video files to PowerPoint presentations",
    after_help = concat!(
        "Examples:\n",
        "  video2ppt input_video.mp4\n",
        "  video2ppt input_video.mp4 -o output.pptx\n",
        "  video2ppt input_video.mp4 -i 2  (extract one frame every 2 seconds)",
    )
)]
pub struct Cli {
    /// Path to the input video file.
    pub video: PathBuf,

    /// Path to the output deck (default: <video name>_output.pptx).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Frame extraction interval in seconds.
    #[arg(
        short,
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub interval: u32,

    /// Directory in which to create the temporary frame directory.
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Language of the title slide labels and progress messages.
    #[arg(long, value_enum, default_value_t = Lang::En)]
    pub lang: Lang,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Lang {
    En,
    Zh,
}

impl From<Lang> for Locale {
    fn from(lang: Lang) -> Self {
        match lang {
            Lang::En => Locale::En,
            Lang::Zh => Locale::Zh,
        }
    }
}
