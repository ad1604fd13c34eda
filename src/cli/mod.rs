//! CLI entry point for Acima.

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Acima backend driver
#[derive(Parser, Debug)]
#[command(name = "acima", version, about = "Drive the Acima backend from the terminal")]
pub struct Cli {
    /// Backend address (overrides config file and ACIMA_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for downloaded narration clips
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the backend is up
    Health,
    /// Register (or update) a child
    Register(RegisterArgs),
    /// Ask for a new question
    Question(QuestionArgs),
    /// Answer a question
    Answer(AnswerArgs),
    /// List stored answers of a child
    Responses(EmailArgs),
    /// Fetch the performance report of a child
    Report(EmailArgs),
    /// Play a narration clip through the fallback chain
    Play(PlayArgs),
    /// Scripted session: register, answer right, answer wrong, report
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Child's name
    pub nome: String,
    /// Grade as shown in the UI, e.g. "3º Ano"
    pub grade: String,
    /// Guardian e-mail
    pub email: String,
    /// Wait for the welcome clip before exiting
    #[arg(long)]
    pub wait: bool,
}

#[derive(Args, Debug)]
pub struct QuestionArgs {
    /// Numeric grade
    pub ano: u8,
    /// Guardian e-mail
    pub email: String,
    /// Play the question narration
    #[arg(long)]
    pub narrate: bool,
}

#[derive(Args, Debug)]
pub struct AnswerArgs {
    /// Question id
    pub id: i64,
    /// Selected option letter
    pub resposta: String,
    /// Guardian e-mail
    pub email: String,
    /// Play the narrated feedback
    #[arg(long)]
    pub play_feedback: bool,
}

#[derive(Args, Debug)]
pub struct EmailArgs {
    /// Guardian e-mail
    pub email: String,
}

#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Backend audio path (e.g. audios/questao_12.mp3) or, with --name, a child's name
    pub reference: String,
    /// Treat the reference as a name rather than a path
    #[arg(long)]
    pub name: bool,
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    #[arg(long, default_value = "Maria")]
    pub nome: String,
    #[arg(long, default_value = "3º Ano")]
    pub grade: String,
    #[arg(long, default_value = "maria.teste@exemplo.com")]
    pub email: String,
}
