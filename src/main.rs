mod cli;

use anyhow::Result;
use clap::Parser;
use skycast_auth::{download, SignupRequest, Theme};
use skycast_core::{App, AppError, Config};
use skycast_weather::{Status, WeatherFlow};

use cli::{Args, Command, SignupArgs, ThemeAction, ThemeArg};

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    skycast_core::init()?;

    if let Err(err) = run(args).await {
        tracing::debug!("Command failed: {:?}", err);
        eprintln!("{}", err.user_message());
        std::process::exit(err.exit_code());
    }

    Ok(())
}

/// Progress lines go to stderr so forecast output on stdout stays clean.
fn with_progress(flow: WeatherFlow) -> WeatherFlow {
    flow.with_status_listener(|status: &Status| {
        if !status.is_error && !status.message.is_empty() {
            eprintln!("{}", status.message);
        }
    })
}

async fn run(args: Args) -> Result<(), AppError> {
    let (config, _) = Config::load_validated(args.config_dir.as_deref())?;
    let app = App::new(config)?;

    match args.command {
        Command::Forecast { city } => {
            let mut flow = with_progress(app.weather_flow());
            let view = flow.search(&city.join(" ")).await?;
            print!("{}", view);
        }
        Command::Here { lat, lon } => {
            let locator = app.locator(lat.zip(lon));
            let mut flow = with_progress(app.weather_flow());
            let view = flow.search_current_location(&locator).await?;
            print!("{}", view);
        }
        Command::Signup(SignupArgs {
            name,
            username,
            password,
            role,
        }) => {
            let user = app
                .directory()
                .signup(SignupRequest {
                    full_name: name,
                    username,
                    password,
                    role,
                })
                .await?;
            println!("Account for {} saved successfully!", user.name);
        }
        Command::Login { username, password } => {
            let session = app.directory().sign_in(&username, &password).await?;
            println!("Welcome back, {}! You are signed in.", session.name);
        }
        Command::Logout => {
            app.directory().sign_out()?;
            println!("Signed out.");
        }
        Command::Whoami => match app.directory().current_session()? {
            Some(session) => println!(
                "{} ({}), signed in {}",
                session.name,
                session.username,
                session.signed_in_at.format("%Y-%m-%d %H:%M UTC")
            ),
            None => println!("Not signed in."),
        },
        Command::Export { out } => {
            let path = download(app.directory(), &out).await?;
            println!(
                "Saved {}. Replace users.json with the downloaded file.",
                path.display()
            );
        }
        Command::Sync { to } => {
            let exporter = app.exporter(to);
            let path = exporter.sync(app.directory()).await?;
            println!("{} updated successfully!", path.display());
        }
        Command::Theme { action } => {
            let theme = match action.unwrap_or(ThemeAction::Show) {
                ThemeAction::Show => app.theme()?,
                ThemeAction::Toggle => app.toggle_theme()?,
                ThemeAction::Set { theme } => {
                    let theme = Theme::from(theme);
                    app.set_theme(theme)?;
                    theme
                }
            };
            println!("{} {}", theme.icon(), theme);
        }
    }

    Ok(())
}
