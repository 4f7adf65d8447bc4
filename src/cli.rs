use clap::builder::{styling::AnsiColor, Styles};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const ABOUT: &str = "SkyCast weather lookup and demo accounts";

const LONG_ABOUT: &str = "
Look up current conditions and a five day outlook from Open-Meteo, either by
city name or for your current position.

SkyCast also keeps a small demo account directory: a baseline users.json merged
with accounts registered locally. Registrations, the signed-in session and the
theme preference live in storage.json next to config.toml.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles = STYLES, about = ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(long, global = true, help = "Directory holding config.toml and storage.json")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Forecast for a city
    Forecast {
        #[arg(required = true, num_args = 1.., help = "City name (e.g. Lisbon, New York)")]
        city: Vec<String>,
    },

    /// Forecast for the current position
    Here {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Register a local account
    Signup(SignupArgs),

    /// Sign in with an existing account
    Login {
        username: String,
        password: String,
    },

    /// Sign out
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Save the merged users.json into a directory
    Export {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Write the merged users.json straight to a file
    Sync {
        #[arg(long, help = "File to overwrite; without it direct file access is unavailable")]
        to: Option<PathBuf>,
    },

    /// Show or change the color theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

#[derive(ClapArgs, Debug)]
pub struct SignupArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub role: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ThemeAction {
    Show,
    Toggle,
    Set {
        #[arg(value_enum)]
        theme: ThemeArg,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ThemeArg {
    Light,
    Dark,
}
